// ============================================================================
// Analytics : métriques de performance et tendance
// ============================================================================
// Calculées sur la même série normalisée que le graphique.
//
// CONCEPT : Données insuffisantes
// - < 2 barres : pas de snapshot du tout (None)
// - < 10 barres : snapshot sans tendance (trend = None)
// - Aucun cas n'est une erreur : l'appelant affiche "pas assez de données"
//
// Les formules de volatilité (RMS des rendements, plafonnée à 100) et de
// force de tendance (|pente| * 1000, plafonnée à 100) sont des heuristiques
// d'affichage, pas des mesures statistiques calibrées.
// ============================================================================

use serde::Serialize;

use crate::models::Series;

/// Nombre minimum de barres pour les métriques de performance
pub const MIN_BARS_PERFORMANCE: usize = 2;

/// Nombre minimum de barres pour l'analyse de tendance
pub const MIN_BARS_TREND: usize = 10;

/// Fenêtre du momentum, en barres
pub const MOMENTUM_WINDOW: usize = 10;

/// Seuil de pente pour sortir de "neutral"
const SLOPE_THRESHOLD: f64 = 0.001;

/// Rendements sur les fenêtres glissantes de 7, 30, 90 et 365 barres
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodReturns {
    pub week: f64,
    pub month: f64,
    pub quarter: f64,
    pub year: f64,
}

/// Plage de prix de la série
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub high: f64,
    pub low: f64,
    pub current: f64,
}

/// Sens de la tendance (régression linéaire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Bullish => "Haussière",
            TrendDirection::Bearish => "Baissière",
            TrendDirection::Neutral => "Neutre",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Bullish => "▲",
            TrendDirection::Bearish => "▼",
            TrendDirection::Neutral => "►",
        }
    }
}

/// Analyse de tendance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// min(|pente| * 1000, 100)
    pub strength: f64,
    /// Variation en % sur les 10 dernières clôtures
    pub momentum: f64,
    /// Pente des moindres carrés (prix par barre)
    pub slope: f64,
}

/// Niveau de volatilité pour le badge d'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

impl VolatilityLevel {
    /// < 10 : Low, < 25 : Medium, sinon High
    pub fn classify(volatility: f64) -> Self {
        if volatility < 10.0 {
            VolatilityLevel::Low
        } else if volatility < 25.0 {
            VolatilityLevel::Medium
        } else {
            VolatilityLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VolatilityLevel::Low => "Faible",
            VolatilityLevel::Medium => "Moyenne",
            VolatilityLevel::High => "Élevée",
        }
    }
}

/// Snapshot complet des analytics d'une série
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    /// (dernière - première) / première * 100
    pub total_return: f64,
    /// RMS des rendements simples * 100, plafonnée à 100
    pub volatility: f64,
    /// Plus forte baisse depuis un plus haut, en %
    pub max_drawdown: f64,
    pub support_level: f64,
    pub resistance_level: f64,
    pub average_volume: f64,
    pub period_returns: PeriodReturns,
    pub current_price: f64,
    pub price_range: PriceRange,
    /// None sous 10 barres
    pub trend: Option<TrendAnalysis>,
}

impl AnalyticsSnapshot {
    /// Calcule le snapshot (None sous 2 barres)
    pub fn compute(series: &Series) -> Option<Self> {
        if series.len() < MIN_BARS_PERFORMANCE {
            return None;
        }

        let closes: Vec<f64> = series.closes().collect();
        let first = closes[0];
        let current = closes[closes.len() - 1];

        let support = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let resistance = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let total_volume: f64 = series.bars().iter().map(|bar| bar.volume as f64).sum();

        Some(Self {
            total_return: (current - first) / first * 100.0,
            volatility: volatility(&closes),
            max_drawdown: max_drawdown(&closes),
            support_level: support,
            resistance_level: resistance,
            average_volume: total_volume / series.len() as f64,
            period_returns: PeriodReturns {
                week: period_return(&closes, 7),
                month: period_return(&closes, 30),
                quarter: period_return(&closes, 90),
                year: period_return(&closes, 365),
            },
            current_price: current,
            price_range: PriceRange {
                high: resistance,
                low: support,
                current,
            },
            trend: trend_analysis(&closes),
        })
    }

    pub fn volatility_level(&self) -> VolatilityLevel {
        VolatilityLevel::classify(self.volatility)
    }
}

/// Volatilité : RMS des rendements simples, en %, plafonnée à 100
///
/// r[i] = (c[i] - c[i-1]) / c[i-1], volatilité = sqrt(moyenne(r²)) * 100
pub fn volatility(closes: &[f64]) -> f64 {
    let returns: Vec<f64> = closes
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();

    if returns.is_empty() {
        return 0.0;
    }

    let mean_square = returns.iter().map(|r| r * r).sum::<f64>() / returns.len() as f64;
    (mean_square.sqrt() * 100.0).min(100.0)
}

/// Drawdown maximum (algorithme du plus haut courant)
///
/// Toujours >= 0 : au pire le prix ne baisse jamais et le résultat vaut 0.
pub fn max_drawdown(closes: &[f64]) -> f64 {
    let Some(&first) = closes.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_drawdown = 0.0_f64;

    for &price in closes {
        if price > peak {
            peak = price;
        }
        let drawdown = (peak - price) / peak * 100.0;
        max_drawdown = max_drawdown.max(drawdown);
    }

    max_drawdown
}

/// Rendement sur les `window` dernières barres
///
/// 0 si la série n'a pas plus de `window` barres (pas d'extrapolation).
/// Le prix de départ est celui d'il y a `window` barres.
pub fn period_return(closes: &[f64], window: usize) -> f64 {
    if closes.len() <= window {
        return 0.0;
    }
    let end = closes[closes.len() - 1];
    let start = closes[closes.len() - window - 1];
    (end - start) / start * 100.0
}

/// Pente des moindres carrés de la clôture en fonction de l'index
pub fn regression_slope(closes: &[f64]) -> f64 {
    let n = closes.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = closes.iter().enumerate().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), (i, &y)| {
            let x = i as f64;
            (sx + x, sy + y, sxy + x * y, sxx + x * x)
        },
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Analyse de tendance (None sous 10 barres)
pub fn trend_analysis(closes: &[f64]) -> Option<TrendAnalysis> {
    if closes.len() < MIN_BARS_TREND {
        return None;
    }

    let slope = regression_slope(closes);
    let direction = if slope > SLOPE_THRESHOLD {
        TrendDirection::Bullish
    } else if slope < -SLOPE_THRESHOLD {
        TrendDirection::Bearish
    } else {
        TrendDirection::Neutral
    };

    let recent = &closes[closes.len() - MOMENTUM_WINDOW..];
    let momentum = (recent[recent.len() - 1] - recent[0]) / recent[0] * 100.0;

    Some(TrendAnalysis {
        direction,
        strength: (slope.abs() * 1000.0).min(100.0),
        momentum,
        slope,
    })
}

/// Formate un grand nombre avec un suffixe (K, M, B)
///
/// Exemples : 1_234 -> "1.23K", 2_500_000 -> "2.50M"
pub fn format_large_number(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bar;

    fn series(closes: &[f64]) -> Series {
        Series::normalize(
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| Bar::new(i as i64, c, c, c, c, 1_000 * (i as u64 + 1))),
        )
    }

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_reference_scenario() {
        let snapshot = AnalyticsSnapshot::compute(&series(&[100.0, 105.0, 95.0, 120.0])).unwrap();

        assert!(approx(snapshot.total_return, 20.0, 1e-9));
        assert_eq!(snapshot.support_level, 95.0);
        assert_eq!(snapshot.resistance_level, 120.0);
        assert!(snapshot.max_drawdown >= 9.52);
        assert!(approx(snapshot.max_drawdown, 10.0 / 105.0 * 100.0, 1e-9));
        assert_eq!(snapshot.current_price, 120.0);
        assert_eq!(snapshot.price_range, PriceRange { high: 120.0, low: 95.0, current: 120.0 });
        assert!(approx(snapshot.average_volume, 2_500.0, 1e-9));
        assert!(snapshot.trend.is_none());
    }

    #[test]
    fn test_short_series_has_performance_but_no_trend() {
        let snapshot = AnalyticsSnapshot::compute(&series(&[10.0, 11.0, 12.0, 11.5, 13.0])).unwrap();
        assert!(snapshot.trend.is_none());
        assert!(approx(snapshot.total_return, 30.0, 1e-9));
        assert!(snapshot.volatility > 0.0);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(AnalyticsSnapshot::compute(&Series::default()).is_none());
        assert!(AnalyticsSnapshot::compute(&series(&[100.0])).is_none());
    }

    #[test]
    fn test_volatility_is_rms_of_returns() {
        // Rendements : +10%, -10%  => RMS = 10%
        let closes = [100.0, 110.0, 99.0];
        assert!(approx(volatility(&closes), 10.0, 1e-9));
    }

    #[test]
    fn test_volatility_is_capped() {
        let closes = [1.0, 10.0, 1.0, 10.0];
        assert_eq!(volatility(&closes), 100.0);
    }

    #[test]
    fn test_max_drawdown_properties() {
        let cases: &[&[f64]] = &[
            &[1.0, 2.0, 3.0, 4.0],
            &[4.0, 3.0, 2.0, 1.0],
            &[10.0, 12.0, 6.0, 11.0, 5.5, 20.0],
            &[50.0],
        ];

        for closes in cases {
            let dd = max_drawdown(closes);
            assert!(dd >= 0.0);
            for pair in closes.windows(2) {
                let step = (pair[0] - pair[1]) / pair[0] * 100.0;
                assert!(dd + 1e-12 >= step, "{closes:?}");
            }
        }

        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert!(approx(max_drawdown(&[10.0, 12.0, 6.0, 11.0]), 50.0, 1e-9));
    }

    #[test]
    fn test_period_returns() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        // week : 139 vs 132
        assert!(approx(period_return(&closes, 7), (139.0 - 132.0) / 132.0 * 100.0, 1e-9));
        // month : 139 vs 109
        assert!(approx(period_return(&closes, 30), (139.0 - 109.0) / 109.0 * 100.0, 1e-9));
        assert_eq!(period_return(&closes, 90), 0.0);
        assert_eq!(period_return(&closes[..7], 7), 0.0);
    }

    #[test]
    fn test_regression_slope() {
        let closes: Vec<f64> = (0..12).map(|i| 5.0 + 2.0 * i as f64).collect();
        assert!(approx(regression_slope(&closes), 2.0, 1e-9));
        assert_eq!(regression_slope(&[3.0]), 0.0);
    }

    #[test]
    fn test_trend_classification() {
        let up: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        let trend = trend_analysis(&up).unwrap();
        assert_eq!(trend.direction, TrendDirection::Bullish);
        assert_eq!(trend.strength, 100.0);
        // Momentum : 111 vs 102 (10 dernières clôtures)
        assert!(approx(trend.momentum, (111.0 - 102.0) / 102.0 * 100.0, 1e-9));

        let down: Vec<f64> = up.iter().rev().copied().collect();
        assert_eq!(trend_analysis(&down).unwrap().direction, TrendDirection::Bearish);

        let flat = vec![50.0; 10];
        let trend = trend_analysis(&flat).unwrap();
        assert_eq!(trend.direction, TrendDirection::Neutral);
        assert_eq!(trend.strength, 0.0);
        assert_eq!(trend.momentum, 0.0);
    }

    #[test]
    fn test_small_slope_strength() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + 0.0005 * i as f64).collect();
        let trend = trend_analysis(&closes).unwrap();
        assert_eq!(trend.direction, TrendDirection::Neutral);
        assert!(approx(trend.strength, 0.5, 1e-6));
    }

    #[test]
    fn test_volatility_level() {
        assert_eq!(VolatilityLevel::classify(5.0), VolatilityLevel::Low);
        assert_eq!(VolatilityLevel::classify(10.0), VolatilityLevel::Medium);
        assert_eq!(VolatilityLevel::classify(30.0), VolatilityLevel::High);
    }

    #[test]
    fn test_format_large_number() {
        assert_eq!(format_large_number(999.0), "999.00");
        assert_eq!(format_large_number(1_234.0), "1.23K");
        assert_eq!(format_large_number(2_500_000.0), "2.50M");
        assert_eq!(format_large_number(7_100_000_000.0), "7.10B");
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = AnalyticsSnapshot::compute(&series(&[1.0, 2.0])).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("totalReturn").is_some());
        assert!(json.get("periodReturns").is_some());
        assert!(json["trend"].is_null());
    }
}
