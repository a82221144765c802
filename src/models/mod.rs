// ============================================================================
// Module : models
// ============================================================================
// Ce module contient les structures de données partagées par le moteur,
// le client Yahoo et l'interface
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public
// - Les re-exports permettent `use lazychart::models::Bar;`
// ============================================================================

pub mod bar;        // Barre OHLCV (bar.rs)
pub mod series;     // Série normalisée (series.rs)
pub mod interval;   // Intervalles, presets, requêtes (interval.rs)
pub mod instrument; // Instrument et calendrier de cotation (instrument.rs)

pub use bar::Bar;
pub use series::{PriceChange, Series};
pub use interval::{Interval, IntervalRequest, ZoomPreset, END_FIX_NONE, END_FIX_NOW};
pub use instrument::{catalog, InstrumentContext, Market, TradingCalendar};
