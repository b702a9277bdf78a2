//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : porter la session du noyau + la requête en vol, et traduire les actions
//! “boutons” en transitions du contrôleur. Aucune logique de forme ni de persistance ici.
//!
//! Contrats :
//! - Toute mutation passe par `Session` (jamais d’accès direct au tampon/historique).
//! - Une seule requête en vol : la réponse est déposée dans une case partagée par la tâche
//!   réseau, puis relevée par `verifier_reponse()` à chaque frame.
//! - Une erreur (réseau ou stockage) est affichée, jamais avalée ; le succès suivant l’efface.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, error};

use crate::config::AppConfig;
use crate::noyau::{
    ClientCalcul, ClientHttp, Demande, EntreeHistorique, ErreurCommunication, ErreurSession,
    MagasinHistorique, Resultat, Session,
};

#[cfg(not(target_arch = "wasm32"))]
pub type StockageApp = crate::noyau::stockage::StockageFichiers;

#[cfg(target_arch = "wasm32")]
pub type StockageApp = crate::noyau::stockage::StockageLocal;

type Case = Arc<Mutex<Option<Result<Resultat, ErreurCommunication>>>>;

struct EnAttente {
    demande: Demande,
    reponse: Case,
}

#[derive(Error, Debug)]
pub enum ErreurInit {
    #[error("client HTTP : {0}")]
    Client(#[from] ErreurCommunication),

    #[error("runtime : {0}")]
    Runtime(#[from] std::io::Error),
}

pub struct AppCalc {
    pub session: Session<StockageApp>,
    client: ClientHttp,
    en_attente: Option<EnAttente>,

    // --- sorties ---
    pub erreur: String, // dernier échec (réseau / stockage), vide sinon

    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Runtime,
}

impl AppCalc {
    pub fn new(config: &AppConfig) -> Result<Self, ErreurInit> {
        let client = ClientHttp::new(config.service.url.clone(), config.service.delai())?;
        debug!(url = %client.url(), delai = ?config.service.delai(), "client prêt");

        #[cfg(not(target_arch = "wasm32"))]
        let stockage = StockageApp::new(config.stockage.dossier_effectif());
        #[cfg(target_arch = "wasm32")]
        let stockage = StockageApp::default();

        let session = Session::new(MagasinHistorique::avec_cle(
            stockage,
            config.stockage.cle.clone(),
        ));

        Self::avec(session, client)
    }

    /// Assemble l’état à partir d’une session déjà chargée.
    pub fn avec(session: Session<StockageApp>, client: ClientHttp) -> Result<Self, ErreurInit> {
        Ok(Self {
            session,
            client,
            en_attente: None,
            erreur: String::new(),
            #[cfg(not(target_arch = "wasm32"))]
            runtime: tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()?,
        })
    }

    /* ------------------------ Actions “boutons” ------------------------ */

    pub fn ajouter(&mut self, jeton: &str) {
        self.session.ajouter(jeton);
    }

    /// DEL : retire le dernier caractère.
    pub fn effacer_dernier(&mut self) {
        self.session.effacer_dernier();
    }

    /// C : efface seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.session.vider_expression();
    }

    /// = : lance le calcul distant (ignoré si vide ; refusé si déjà en vol).
    pub fn calculer(&mut self) {
        let demande = match self.session.commencer() {
            Ok(Some(d)) => d,
            Ok(None) => return,
            Err(e) => {
                self.set_erreur(e);
                return;
            }
        };

        let reponse: Case = Arc::new(Mutex::new(None));
        self.lancer(demande.expression().to_string(), Arc::clone(&reponse));
        self.en_attente = Some(EnAttente { demande, reponse });
    }

    pub fn selectionner(&mut self, entree: &Arc<EntreeHistorique>) {
        if let Err(e) = self.session.selectionner(entree) {
            self.set_erreur(e);
        }
    }

    pub fn fermer_detail(&mut self) {
        self.session.fermer_detail();
    }

    pub fn effacer_historique(&mut self) {
        if let Err(e) = self.session.effacer_historique() {
            self.set_erreur(e);
        }
    }

    pub fn en_cours(&self) -> bool {
        self.session.en_cours()
    }

    /* ------------------------ Requête en vol ------------------------ */

    fn lancer(&self, expression: String, case: Case) {
        let client = self.client.clone();
        let tache = async move {
            let res = client.calculer(&expression).await;
            if let Ok(mut g) = case.lock() {
                *g = Some(res);
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.runtime.spawn(tache);
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(tache);
        }
    }

    /// Relève la réponse si elle est arrivée (à appeler à chaque frame).
    pub fn verifier_reponse(&mut self) {
        let arrivee = self
            .en_attente
            .as_ref()
            .and_then(|p| p.reponse.try_lock().ok())
            .and_then(|mut g| g.take());

        let Some(reponse) = arrivee else {
            return;
        };
        let Some(EnAttente { demande, .. }) = self.en_attente.take() else {
            return;
        };

        match self.session.terminer(demande, reponse) {
            Ok(entree) => {
                debug!(expression = %entree.expression(), "détail ouvert");
                self.erreur.clear();
            }
            Err(e) => self.set_erreur(e),
        }
    }

    fn set_erreur(&mut self, e: ErreurSession) {
        error!(erreur = %e, "action refusée");
        self.erreur = e.to_string();
    }
}
