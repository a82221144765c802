// ============================================================================
// Structure : Bar (Open, High, Low, Close, Volume)
// ============================================================================
// Représente une barre OHLCV pour un intervalle de temps fixe
//
// CONCEPTS RUST :
// 1. i64 : timestamp epoch en secondes (tel que fourni par l'API)
// 2. f64 : floating point 64 bits pour les prix
// 3. u64 : unsigned 64 bits pour le volume (toujours positif)
// 4. Copy : la barre est petite, on la copie au lieu de la partager
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Une barre OHLCV
///
/// Une barre n'est jamais modifiée après sa création : les composants du
/// moteur la lisent uniquement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Timestamp de la barre (secondes depuis l'epoch Unix)
    pub timestamp: i64,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Volume échangé
    pub volume: u64,
}

impl Bar {
    /// Constructeur : crée une nouvelle barre
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Vérifie si la barre est exploitable
    ///
    /// CONCEPT : Placeholder de l'API
    /// - L'amont comble les trous avec des barres à zéro
    /// - Une barre avec open == 0 ou close == 0 est un placeholder
    /// - Un prix non fini (NaN, inf) est aussi rejeté : pas d'arithmétique
    ///   sur des valeurs indéfinies plus loin dans le moteur
    pub fn is_valid(&self) -> bool {
        self.open != 0.0
            && self.close != 0.0
            && self.open.is_finite()
            && self.close.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
    }

    /// Convertit le timestamp en DateTime<Utc>
    ///
    /// CONCEPT RUST : Option
    /// - None si le timestamp est hors de la plage supportée par chrono
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_valid() {
        let bar = Bar::new(1_700_000_000, 100.0, 110.0, 95.0, 105.0, 1000);
        assert!(bar.is_valid());
    }

    #[test]
    fn test_zero_placeholders_are_invalid() {
        assert!(!Bar::new(1_700_000_000, 0.0, 110.0, 95.0, 105.0, 1000).is_valid());
        assert!(!Bar::new(1_700_000_000, 100.0, 110.0, 95.0, 0.0, 1000).is_valid());
        assert!(!Bar::new(1_700_000_000, 0.0, 0.0, 0.0, 0.0, 0).is_valid());
    }

    #[test]
    fn test_non_finite_prices_are_invalid() {
        assert!(!Bar::new(1_700_000_000, f64::NAN, 110.0, 95.0, 105.0, 1000).is_valid());
        assert!(!Bar::new(1_700_000_000, 100.0, f64::INFINITY, 95.0, 105.0, 1000).is_valid());
    }

    #[test]
    fn test_datetime_conversion() {
        let bar = Bar::new(0, 1.0, 1.0, 1.0, 1.0, 0);
        assert_eq!(bar.datetime().map(|d| d.timestamp()), Some(0));
    }
}
