//! Configuration : config/default.toml puis variables d’environnement `CALC__*`
//!
//! Ordre : fichier par défaut (s’il existe) -> fichier explicite -> environnement
//! (double underscore = imbrication, ex. `CALC__SERVICE__URL=http://localhost:8000`).
//! En wasm32 on garde les valeurs compilées (`AppConfig::default()`).

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use tracing::{debug, info, warn};

use crate::noyau::client::URL_PAR_DEFAUT;
use crate::noyau::historique::CLE_HISTORIQUE;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSection,
    pub stockage: StockageSection,
}

/// [service] : solveur distant
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_url")]
    pub url: String,
    /// Absent = aucun délai (une requête bloquée bloque la soumission).
    #[serde(default)]
    pub delai_secs: Option<u64>,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            delai_secs: None,
        }
    }
}

impl ServiceSection {
    pub fn delai(&self) -> Option<Duration> {
        self.delai_secs.map(Duration::from_secs)
    }
}

fn default_url() -> String {
    URL_PAR_DEFAUT.to_string()
}

/// [stockage] : case unique de l’historique
#[derive(Debug, Clone, Deserialize)]
pub struct StockageSection {
    /// Natif seulement ; par défaut <data_dir>/calculatrice-trace
    pub dossier: Option<PathBuf>,
    #[serde(default = "default_cle")]
    pub cle: String,
}

impl Default for StockageSection {
    fn default() -> Self {
        Self {
            dossier: None,
            cle: default_cle(),
        }
    }
}

fn default_cle() -> String {
    CLE_HISTORIQUE.to_string()
}

#[cfg(not(target_arch = "wasm32"))]
impl StockageSection {
    pub fn dossier_effectif(&self) -> PathBuf {
        self.dossier.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("calculatrice-trace")
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    // Binaire lancé depuis la racine du dépôt ou depuis target/
    let defauts = ["config/default", "../config/default"];
    match defauts
        .into_iter()
        .find(|nom| std::path::Path::new(&format!("{nom}.toml")).exists())
    {
        Some(nom) => {
            debug!(fichier = %format!("{nom}.toml"), "configuration par défaut");
            builder = builder.add_source(config::File::with_name(nom).required(false));
        }
        None => debug!("pas de config/default.toml, valeurs compilées"),
    }

    if let Some(chemin) = config_path {
        if chemin.exists() {
            info!(fichier = %chemin.display(), "configuration explicite");
            builder = builder.add_source(config::File::from(chemin));
        } else {
            warn!(fichier = %chemin.display(), "configuration explicite introuvable, ignorée");
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CALC")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
