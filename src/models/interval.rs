// ============================================================================
// Intervalles, presets de zoom et requêtes de fetch
// ============================================================================
// CONCEPT : Intervalle vs Preset
// - Interval : granularité des barres (5m, 30m, 1d, 3mo, etc.)
// - ZoomPreset : fenêtre nommée (1 Day, 1 Week, ..., MAX)
// - IntervalRequest : ce que le client Yahoo reçoit réellement
//
// Un preset se traduit en (intervalle, nombre de barres, end_fix).
// Le calcul lui-même vit dans engine::range.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::Bar;

/// end_fix = 0 : la fenêtre s'arrête à la barre la plus récente
pub const END_FIX_NOW: i32 = 0;

/// end_fix = -1 : pas de découpage, la plage amont borne déjà les données
pub const END_FIX_NONE: i32 = -1;

/// Granularité des barres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 5 minutes
    #[serde(rename = "5m")]
    M5,
    /// 15 minutes
    #[serde(rename = "15m")]
    M15,
    /// 30 minutes
    #[serde(rename = "30m")]
    M30,
    /// 1 heure
    #[serde(rename = "1h")]
    H1,
    /// 1 jour (daily)
    #[serde(rename = "1d")]
    D1,
    /// 1 semaine (weekly)
    #[serde(rename = "1wk")]
    W1,
    /// 1 mois
    #[serde(rename = "1mo")]
    Mo1,
    /// 3 mois (trimestre)
    #[serde(rename = "3mo")]
    Mo3,
}

impl Interval {
    /// Convertit l'intervalle en string pour l'API Yahoo Finance
    ///
    /// CONCEPT RUST : &'static str
    /// - Retourne une string littérale (dans le binaire)
    /// - Pas d'allocation
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::D1 => "1d",
            Interval::W1 => "1wk",
            Interval::Mo1 => "1mo",
            Interval::Mo3 => "3mo",
        }
    }

    /// Retourne le label court pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            Interval::M5 => "5M",
            Interval::M15 => "15M",
            Interval::M30 => "30M",
            Interval::H1 => "1H",
            Interval::D1 => "1D",
            Interval::W1 => "1W",
            Interval::Mo1 => "1MO",
            Interval::Mo3 => "3MO",
        }
    }

    /// Plage demandée à Yahoo pour cet intervalle (paramètre `range`)
    ///
    /// Limitations Yahoo Finance :
    /// - Intraday (<1d) : max 60 jours
    /// - 5m : 5 jours suffisent pour le preset 1 Day (78 barres)
    /// - 30m : 1 mois couvre le preset 1 Week (65 barres)
    /// - 1d : 2 ans couvrent le preset 1 Year (240 barres)
    pub fn yahoo_range(&self) -> &'static str {
        match self {
            Interval::M5 => "5d",
            Interval::M15 | Interval::M30 => "1mo",
            Interval::H1 => "3mo",
            Interval::D1 => "2y",
            Interval::W1 => "10y",
            Interval::Mo1 => "5y",
            Interval::Mo3 => "max",
        }
    }

    /// Retourne true si l'intervalle est intraday
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Interval::M5 | Interval::M15 | Interval::M30 | Interval::H1
        )
    }

    /// end_fix associé à un choix direct d'intervalle
    ///
    /// - Intraday : pas de découpage (-1)
    /// - 1d et plus : fenêtre jusqu'à la dernière clôture (0)
    pub fn pick_end_fix(&self) -> i32 {
        if self.is_intraday() {
            END_FIX_NONE
        } else {
            END_FIX_NOW
        }
    }

    /// Formate la date d'une barre pour les labels de l'axe X et le tooltip
    ///
    /// CONCEPT : Format adapté à la granularité
    /// - Intraday : heure et minute
    /// - Daily : jour + heure
    /// - Weekly : jour
    /// - Mensuel et plus : mois + année
    pub fn format_bar(&self, bar: &Bar) -> String {
        let Some(datetime) = bar.datetime() else {
            return String::from("?");
        };

        let pattern = match self {
            Interval::M5 | Interval::M15 | Interval::M30 | Interval::H1 => "%H:%M",
            Interval::D1 => "%b %d %Hh",
            Interval::W1 => "%b %d",
            Interval::Mo1 | Interval::Mo3 => "%b %Y",
        };

        datetime.format(pattern).to_string()
    }

    /// Retourne tous les intervalles disponibles (pour la barre de sélection)
    pub fn all() -> Vec<Interval> {
        vec![
            Interval::M5,
            Interval::M15,
            Interval::M30,
            Interval::H1,
            Interval::D1,
            Interval::W1,
            Interval::Mo1,
            Interval::Mo3,
        ]
    }

    /// Retourne l'intervalle suivant (cycle)
    pub fn next(&self) -> Interval {
        match self {
            Interval::M5 => Interval::M15,
            Interval::M15 => Interval::M30,
            Interval::M30 => Interval::H1,
            Interval::H1 => Interval::D1,
            Interval::D1 => Interval::W1,
            Interval::W1 => Interval::Mo1,
            Interval::Mo1 => Interval::Mo3,
            Interval::Mo3 => Interval::M5, // Boucle
        }
    }

    /// Retourne l'intervalle précédent (cycle)
    pub fn previous(&self) -> Interval {
        match self {
            Interval::M5 => Interval::Mo3, // Boucle
            Interval::M15 => Interval::M5,
            Interval::M30 => Interval::M15,
            Interval::H1 => Interval::M30,
            Interval::D1 => Interval::H1,
            Interval::W1 => Interval::D1,
            Interval::Mo1 => Interval::W1,
            Interval::Mo3 => Interval::Mo1,
        }
    }
}

/// Fenêtre de zoom nommée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ZoomPreset {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    OneYear,
    FiveYears,
    /// Preset par défaut : tout l'historique en barres trimestrielles
    #[default]
    Max,
}

impl ZoomPreset {
    /// Retourne le label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            ZoomPreset::OneDay => "1 Jour",
            ZoomPreset::OneWeek => "1 Semaine",
            ZoomPreset::OneMonth => "1 Mois",
            ZoomPreset::ThreeMonths => "3 Mois",
            ZoomPreset::OneYear => "1 An",
            ZoomPreset::FiveYears => "5 Ans",
            ZoomPreset::Max => "MAX",
        }
    }

    /// Tous les presets, dans l'ordre des boutons
    pub fn all() -> [ZoomPreset; 7] {
        [
            ZoomPreset::OneDay,
            ZoomPreset::OneWeek,
            ZoomPreset::OneMonth,
            ZoomPreset::ThreeMonths,
            ZoomPreset::OneYear,
            ZoomPreset::FiveYears,
            ZoomPreset::Max,
        ]
    }
}

/// Requête concrète envoyée au client Yahoo
///
/// - scale : granularité des barres
/// - start : nombre de barres à remonter (0 = pas de découpage au début)
/// - end_fix : décalage de fin (0 = jusqu'à maintenant, -1 = pas de découpage)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalRequest {
    pub scale: Interval,
    pub start: u32,
    pub end_fix: i32,
}

impl IntervalRequest {
    pub fn new(scale: Interval, start: u32, end_fix: i32) -> Self {
        Self {
            scale,
            start,
            end_fix,
        }
    }

    /// Applique la fenêtre de la requête à des barres triées
    ///
    /// Algorithme :
    /// - end_fix < 0 : aucune coupe, la plage Yahoo borne déjà les données
    /// - end_fix >= 0 : retire les `end_fix` barres les plus récentes,
    ///   puis garde les `start` dernières (start = 0 garde tout)
    ///
    /// CONCEPT RUST : saturating_sub
    /// - Une série plus courte que la fenêtre est renvoyée telle quelle
    pub fn window<'a>(&self, bars: &'a [Bar]) -> &'a [Bar] {
        if self.end_fix < 0 {
            return bars;
        }

        let end = bars.len().saturating_sub(self.end_fix as usize);
        let trimmed = &bars[..end];

        if self.start == 0 {
            return trimmed;
        }

        let begin = trimmed.len().saturating_sub(self.start as usize);
        &trimmed[begin..]
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(n: i64) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar::new(i, 1.0 + i as f64, 1.0, 1.0, 1.0 + i as f64, 0))
            .collect()
    }

    #[test]
    fn test_interval_yahoo_string() {
        assert_eq!(Interval::M30.to_yahoo_string(), "30m");
        assert_eq!(Interval::H1.to_yahoo_string(), "1h");
        assert_eq!(Interval::W1.to_yahoo_string(), "1wk");
        assert_eq!(Interval::Mo3.to_yahoo_string(), "3mo");
    }

    #[test]
    fn test_interval_serde_uses_yahoo_names() {
        let json = serde_json::to_string(&Interval::Mo1).unwrap();
        assert_eq!(json, "\"1mo\"");
        let back: Interval = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(back, Interval::M15);
    }

    #[test]
    fn test_interval_cycle() {
        assert_eq!(Interval::M5.next(), Interval::M15);
        assert_eq!(Interval::M5.previous(), Interval::Mo3);
        assert_eq!(Interval::Mo3.next(), Interval::M5); // Boucle
        for interval in Interval::all() {
            assert_eq!(interval.next().previous(), interval);
        }
    }

    #[test]
    fn test_pick_end_fix() {
        assert_eq!(Interval::H1.pick_end_fix(), END_FIX_NONE);
        assert_eq!(Interval::D1.pick_end_fix(), END_FIX_NOW);
        assert_eq!(Interval::Mo3.pick_end_fix(), END_FIX_NOW);
    }

    #[test]
    fn test_format_bar() {
        // 2023-11-14 22:13:20 UTC
        let bar = Bar::new(1_700_000_000, 1.0, 1.0, 1.0, 1.0, 0);
        assert_eq!(Interval::M5.format_bar(&bar), "22:13");
        assert_eq!(Interval::W1.format_bar(&bar), "Nov 14");
        assert_eq!(Interval::Mo1.format_bar(&bar), "Nov 2023");
    }

    #[test]
    fn test_format_bar_out_of_range() {
        let bar = Bar::new(i64::MAX, 1.0, 1.0, 1.0, 1.0, 0);
        assert_eq!(Interval::D1.format_bar(&bar), "?");
    }

    #[test]
    fn test_default_preset_is_max() {
        assert_eq!(ZoomPreset::default(), ZoomPreset::Max);
    }

    #[test]
    fn test_window_keeps_last_start_bars() {
        let data = bars(10);
        let request = IntervalRequest::new(Interval::D1, 4, END_FIX_NOW);
        let window = request.window(&data);
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].timestamp, 6);
        assert_eq!(window[3].timestamp, 9);
    }

    #[test]
    fn test_window_with_end_offset() {
        let data = bars(10);
        let request = IntervalRequest::new(Interval::D1, 3, 2);
        let window = request.window(&data);
        let ts: Vec<i64> = window.iter().map(|b| b.timestamp).collect();
        assert_eq!(ts, vec![5, 6, 7]);
    }

    #[test]
    fn test_window_untrimmed_and_short_series() {
        let data = bars(5);
        assert_eq!(IntervalRequest::new(Interval::Mo3, 42, END_FIX_NONE).window(&data).len(), 5);
        assert_eq!(IntervalRequest::new(Interval::D1, 240, END_FIX_NOW).window(&data).len(), 5);
        assert_eq!(IntervalRequest::new(Interval::D1, 0, END_FIX_NOW).window(&data).len(), 5);
        assert!(IntervalRequest::new(Interval::D1, 3, 9).window(&data).is_empty());
    }
}
