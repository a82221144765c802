// ============================================================================
// LazyChart - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;       // Client Yahoo Finance
pub mod config;    // Configuration (fichier JSON + défauts)
pub mod engine;    // Moteur de visualisation et d'analytics
pub mod models;    // Structures de données
pub mod app;       // État de l'application
pub mod ui;        // Interface utilisateur
