// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Clavier, souris, redimensionnement
pub mod dashboard; // Catalogue des instruments + routing des écrans
pub mod chart;     // Graphique braille, survol, analytics

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use dashboard::render;
