// ============================================================================
// Module : api
// ============================================================================
// Client HTTP : transforme une IntervalRequest en Series
// depuis une source de données de marché (Yahoo Finance)
// ============================================================================

pub mod yahoo;  // Client chart Yahoo Finance

// Re-export des fonctions principales
pub use yahoo::{build_client, fetch_series};
