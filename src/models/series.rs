// ============================================================================
// Structure : Series
// ============================================================================
// Séquence ordonnée de barres valides pour un instrument et un intervalle
//
// CONCEPTS RUST :
// 1. Champ privé + constructeur unique : l'invariant (trié, valide) ne peut
//    pas être cassé depuis l'extérieur du module
// 2. IntoIterator : accepte un Vec, un slice copié, un itérateur...
// 3. Slices (&[Bar]) : accès en lecture sans copie
// ============================================================================

use serde::Serialize;

use crate::models::Bar;

/// Série normalisée : barres valides, triées par timestamp croissant
///
/// La série est reconstruite entièrement à chaque changement de symbole ou
/// d'intervalle. Pas de patch incrémental.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Normalise des barres brutes : placeholders retirés, tri stable par date
    ///
    /// Algorithme :
    /// 1. Retire les barres invalides (open == 0 ou close == 0)
    /// 2. Trie par timestamp croissant
    ///
    /// CONCEPT RUST : sort_by_key est stable
    /// - Deux barres au même timestamp gardent leur ordre d'arrivée
    /// - Normaliser une série déjà normalisée ne change rien (idempotence)
    ///
    /// Une série vide n'est pas une erreur : c'est "pas de données".
    pub fn normalize<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = Bar>,
    {
        let mut bars: Vec<Bar> = raw.into_iter().filter(Bar::is_valid).collect();
        bars.sort_by_key(|bar| bar.timestamp);
        Self { bars }
    }

    /// Retourne les barres sous forme de slice
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Retourne le nombre de barres
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Vérifie si la série est vide
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Itère sur les prix de clôture
    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|bar| bar.close)
    }

    /// Plus petit prix de clôture (None si la série est vide)
    ///
    /// CONCEPT RUST : fold au lieu de min_by + unwrap
    /// - f64 n'implémente pas Ord (à cause de NaN)
    /// - Les barres valides sont finies, f64::min suffit
    pub fn min_close(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.closes().fold(f64::INFINITY, f64::min))
    }

    /// Plus grand prix de clôture (None si la série est vide)
    pub fn max_close(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.closes().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Variation entre la première et la dernière clôture
    ///
    /// Alimente le header du graphique (montant, pourcentage, sens).
    pub fn change(&self) -> Option<PriceChange> {
        let first = self.first()?.close;
        let last = self.last()?.close;
        let amount = last - first;
        Some(PriceChange {
            amount,
            percent: amount / first * 100.0,
            is_positive: amount >= 0.0,
        })
    }
}

/// Variation de prix sur toute la série
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChange {
    pub amount: f64,
    pub percent: f64,
    pub is_positive: bool,
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close, close, close, 100)
    }

    #[test]
    fn test_normalize_filters_and_sorts() {
        let raw = vec![
            bar(30, 103.0),
            Bar::new(20, 0.0, 0.0, 0.0, 0.0, 0),
            bar(10, 101.0),
            Bar::new(25, 102.0, 102.0, 102.0, 0.0, 5),
        ];

        let series = Series::normalize(raw);
        let timestamps: Vec<i64> = series.bars().iter().map(|b| b.timestamp).collect();
        assert_eq!(timestamps, vec![10, 30]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = vec![bar(3, 3.0), bar(1, 1.0), Bar::new(2, 0.0, 1.0, 1.0, 1.0, 1), bar(1, 1.5)];

        let once = Series::normalize(raw);
        let twice = Series::normalize(once.bars().to_vec());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_keeps_arrival_order_for_equal_timestamps() {
        let series = Series::normalize(vec![bar(5, 1.0), bar(5, 2.0)]);
        let closes: Vec<f64> = series.closes().collect();
        assert_eq!(closes, vec![1.0, 2.0]);
    }

    #[test]
    fn test_empty_series_is_not_an_error() {
        let series = Series::normalize(vec![Bar::new(1, 0.0, 0.0, 0.0, 0.0, 0)]);
        assert!(series.is_empty());
        assert_eq!(series.min_close(), None);
        assert_eq!(series.max_close(), None);
        assert!(series.change().is_none());
    }

    #[test]
    fn test_min_max_close() {
        let series = Series::normalize(vec![bar(1, 100.0), bar(2, 95.0), bar(3, 120.0)]);
        assert_eq!(series.min_close(), Some(95.0));
        assert_eq!(series.max_close(), Some(120.0));
    }

    #[test]
    fn test_change() {
        let series = Series::normalize(vec![bar(1, 100.0), bar(2, 90.0)]);
        let change = series.change().unwrap();
        assert_eq!(change.amount, -10.0);
        assert_eq!(change.percent, -10.0);
        assert!(!change.is_positive);
    }
}
