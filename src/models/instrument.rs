// ============================================================================
// Structure : InstrumentContext
// ============================================================================
// Représente l'instrument sélectionné (indice, action, crypto) et son
// calendrier de cotation.
//
// CONCEPT : Contexte explicite
// - Le contrôleur de plage reçoit l'instrument en paramètre
// - Pas d'état global "index courant" lu en douce
//
// CONCEPT : Calendrier de cotation
// - Actions US : 6.5 heures/jour, 5 jours/semaine
// - Crypto : 24 heures/jour, 7 jours/semaine
// - Le nombre de barres d'un preset dépend du marché
// ============================================================================

use serde::{Deserialize, Serialize};

/// Calendrier de cotation d'un marché
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradingCalendar {
    /// Heures de cotation par jour (ex: 6.5 pour le NYSE)
    pub hours_per_day: f64,

    /// Jours de cotation par semaine
    pub days_per_week: u32,
}

impl TradingCalendar {
    pub const fn new(hours_per_day: f64, days_per_week: u32) -> Self {
        Self {
            hours_per_day,
            days_per_week,
        }
    }

    /// Marchés actions US (9h30-16h, lundi-vendredi)
    pub const fn us_equities() -> Self {
        Self::new(6.5, 5)
    }

    /// Crypto : 24h/24, 7j/7
    pub const fn crypto() -> Self {
        Self::new(24.0, 7)
    }
}

impl Default for TradingCalendar {
    fn default() -> Self {
        Self::us_equities()
    }
}

/// Instrument sélectionné, passé explicitement au contrôleur de plage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentContext {
    /// Symbole Yahoo (ex: "^GSPC", "BTC-USD")
    pub symbol: String,

    /// Nom complet (ex: "S&P 500")
    pub name: String,

    /// Calendrier de cotation
    pub calendar: TradingCalendar,
}

impl InstrumentContext {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, calendar: TradingCalendar) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            calendar,
        }
    }

    /// Instrument par défaut : S&P 500
    pub fn default_index() -> Self {
        Self::new("^GSPC", "S&P 500", TradingCalendar::us_equities())
    }

    /// Cherche un symbole dans le catalogue
    ///
    /// Un symbole inconnu garde le calendrier actions US.
    pub fn lookup(symbol: &str) -> Self {
        catalog()
            .into_iter()
            .flat_map(|market| market.instruments)
            .find(|instrument| instrument.symbol.eq_ignore_ascii_case(symbol))
            .unwrap_or_else(|| Self::new(symbol, symbol, TradingCalendar::us_equities()))
    }
}

/// Un marché et ses indices
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub name: &'static str,
    pub instruments: Vec<InstrumentContext>,
}

/// Catalogue des indices affichés sur le dashboard, groupés par marché
pub fn catalog() -> Vec<Market> {
    let us = TradingCalendar::us_equities();
    let europe = TradingCalendar::new(8.5, 5);

    vec![
        Market {
            name: "US",
            instruments: vec![
                InstrumentContext::new("^GSPC", "S&P 500", us),
                InstrumentContext::new("^DJI", "Dow Jones", us),
                InstrumentContext::new("^IXIC", "Nasdaq Composite", us),
            ],
        },
        Market {
            name: "Europe",
            instruments: vec![
                InstrumentContext::new("^FTSE", "FTSE 100", europe),
                InstrumentContext::new("^GDAXI", "DAX", europe),
                InstrumentContext::new("^FCHI", "CAC 40", europe),
            ],
        },
        Market {
            name: "Asia",
            instruments: vec![
                InstrumentContext::new("^N225", "Nikkei 225", TradingCalendar::new(5.0, 5)),
                InstrumentContext::new("^HSI", "Hang Seng", TradingCalendar::new(5.5, 5)),
            ],
        },
        Market {
            name: "Crypto",
            instruments: vec![
                InstrumentContext::new("BTC-USD", "Bitcoin USD", TradingCalendar::crypto()),
                InstrumentContext::new("ETH-USD", "Ethereum USD", TradingCalendar::crypto()),
            ],
        },
    ]
}

// ============================================================================
// Tests unitaires
// ============================================================================
