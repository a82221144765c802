// ============================================================================
// Module : engine
// ============================================================================
// Calculs purs et synchrones : série -> échelles, couleur, survol, plage,
// analytics. Aucun I/O ici, aucune erreur : les cas dégénérés renvoient None.
//
// Flux : Series -> ChartFrame { ChartScale, TrendColor, AnalyticsSnapshot }
//        PointerEvent + ChartFrame -> HoverPhase
//        Selection + InstrumentContext -> IntervalRequest
// ============================================================================

pub mod analytics;   // Métriques de performance et tendance (analytics.rs)
pub mod frame;       // Valeurs dérivées d'une série (frame.rs)
pub mod pointer;     // Projection du pointeur, machine de survol (pointer.rs)
pub mod range;       // Presets et intervalles -> requêtes (range.rs)
pub mod scale;       // Échelles linéaires (scale.rs)
pub mod trend_color; // Palette gain / perte (trend_color.rs)

pub use analytics::{format_large_number, AnalyticsSnapshot, TrendAnalysis, TrendDirection, VolatilityLevel};
pub use frame::ChartFrame;
pub use pointer::{HoverPhase, HoverState, HoverTracker, PointerEvent, TooltipAnchor};
pub use range::{IntervalRangeController, Selection};
pub use scale::{ChartScale, LinearScale, Margins, Viewport};
pub use trend_color::{Palette, Rgb, TrendColor};
