// ============================================================================
// Configuration
// ============================================================================
// Ordre de résolution :
// 1. Fichier pointé par la variable d'environnement LAZYCHART_CONFIG
// 2. lazychart.json dans le répertoire courant
// 3. Valeurs par défaut
//
// Un fichier absent n'est pas une erreur. Un fichier illisible ou mal formé
// en est une (avec le chemin dans le contexte).
//
// CONCEPT RUST : #[serde(default)]
// - Les champs absents du JSON prennent la valeur de Default::default()
// - Un fichier {"default_symbol": "^FCHI"} suffit
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::Margins;

/// Variable d'environnement qui pointe vers le fichier de config
pub const CONFIG_ENV_VAR: &str = "LAZYCHART_CONFIG";

/// Nom du fichier cherché dans le répertoire courant
pub const CONFIG_FILE_NAME: &str = "lazychart.json";

/// User-Agent envoyé à Yahoo (sans lui, Yahoo refuse souvent la requête)
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Filtre de logs par défaut : debug pour nous, info pour les dépendances
pub const DEFAULT_LOG_FILTER: &str = "lazychart=debug,info";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Instrument affiché à l'ouverture du graphique
    pub default_symbol: String,

    /// Marges du graphique, en pixels
    pub margins: Margins,

    /// Répertoire des logs (None : répertoire de données de l'OS)
    pub log_dir: Option<PathBuf>,

    /// Filtre tracing, écrasé par RUST_LOG si défini
    pub log_filter: String,

    /// User-Agent des requêtes HTTP
    pub user_agent: String,

    /// Axe X compact (moins de labels, pour les terminaux étroits)
    pub compact_axis: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_symbol: "^GSPC".to_string(),
            margins: Margins::default(),
            log_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            compact_axis: false,
        }
    }
}

impl Config {
    /// Charge la configuration (env var, fichier local, défauts)
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            // Chemin explicite : il doit exister
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.exists() {
                    Self::from_file(local)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Charge un fichier de config JSON
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire la config {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("Config invalide : {}", path.display()))?;
        info!(path = %path.display(), symbol = %config.default_symbol, "Config loaded");
        Ok(config)
    }

    /// Parse une config depuis une chaîne JSON
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Échec du parsing JSON de la config")
    }

    /// Répertoire des logs effectif
    ///
    /// Linux : ~/.local/share/lazychart/logs, repli sur ./logs
    pub fn resolved_log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .map(|dir| dir.join("lazychart").join("logs"))
            .unwrap_or_else(|| PathBuf::from("./logs"))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
