//! Client du service de calcul distant (Taylor / Euler / Runge).
//!
//! Une requête par appel : `POST <url>` avec `{ "expr": ... }`, réponse `{ result, message? }`.
//! Pas de nouvelle tentative. Pas de délai par défaut : une requête bloquée bloque la
//! soumission (limite connue) ; si `delai` est fixé, son dépassement devient
//! `ErreurCommunication::DelaiDepasse`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::erreurs::ErreurCommunication;
use super::resultat::Resultat;

/// URL du service d’origine.
pub const URL_PAR_DEFAUT: &str = "https://eduar.free.beeceptor.com";

/// Frontière vers le solveur distant (substituable en test).
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ClientCalcul {
    async fn calculer(&self, expression: &str) -> Result<Resultat, ErreurCommunication>;
}

#[derive(Serialize)]
struct Requete<'a> {
    expr: &'a str,
}

#[derive(Clone, Debug)]
pub struct ClientHttp {
    http: reqwest::Client,
    url: String,
    delai: Option<Duration>,
}

impl ClientHttp {
    pub fn new(url: impl Into<String>, delai: Option<Duration>) -> Result<Self, ErreurCommunication> {
        #[allow(unused_mut)]
        let mut builder = reqwest::Client::builder();

        // fetch (wasm) n’expose pas de délai
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(d) = delai {
                builder = builder.timeout(d);
            }
        }

        let http = builder
            .build()
            .map_err(|e| ErreurCommunication::Transport(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
            delai,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn erreur_transport(&self, e: reqwest::Error) -> ErreurCommunication {
        match self.delai {
            Some(d) if e.is_timeout() => ErreurCommunication::DelaiDepasse(d.as_secs()),
            _ => ErreurCommunication::Transport(e.to_string()),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ClientCalcul for ClientHttp {
    async fn calculer(&self, expression: &str) -> Result<Resultat, ErreurCommunication> {
        debug!(url = %self.url, expression, "requête de calcul");

        let reponse = self
            .http
            .post(&self.url)
            .json(&Requete { expr: expression })
            .send()
            .await
            .map_err(|e| self.erreur_transport(e))?;

        let statut = reponse.status().as_u16();
        let corps = reponse.text().await.map_err(|e| self.erreur_transport(e))?;

        decoder_reponse(statut, &corps).inspect_err(|e| {
            warn!(url = %self.url, statut, erreur = %e, "réponse rejetée");
        })
    }
}

/// Statut + corps brut => résultat normalisé (toute la logique testable hors réseau).
pub fn decoder_reponse(statut: u16, corps: &str) -> Result<Resultat, ErreurCommunication> {
    if !(200..300).contains(&statut) {
        return Err(ErreurCommunication::Statut {
            statut,
            corps: corps.chars().take(200).collect(),
        });
    }

    let valeur: Value = serde_json::from_str(corps)
        .map_err(|e| ErreurCommunication::CorpsIllisible(e.to_string()))?;

    Resultat::depuis_reponse(&valeur)
}
