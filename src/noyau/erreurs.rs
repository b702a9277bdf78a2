//! Taxonomie d’erreurs du noyau.
//!
//! - `ErreurCommunication` : réseau, statut HTTP, corps illisible ou sans `result`.
//! - `ErreurStockage` : le collaborateur clé/valeur a échoué (lecture, écriture, suppression).
//! - `ErreurSession` : ce que voit l’appelant du contrôleur (transition refusée ou erreur enveloppée).
//!
//! Une entrée vide n’est PAS une erreur (`Session::commencer` rend `Ok(None)`), et un historique
//! corrompu est absorbé par le magasin (jamais remonté).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErreurCommunication {
    #[error("échec de transport : {0}")]
    Transport(String),

    #[error("délai dépassé après {0} s")]
    DelaiDepasse(u64),

    #[error("statut HTTP {statut} : {corps}")]
    Statut { statut: u16, corps: String },

    #[error("réponse illisible : {0}")]
    CorpsIllisible(String),

    #[error("réponse sans champ `result`")]
    ResultatAbsent,
}

#[derive(Error, Debug)]
pub enum ErreurStockage {
    #[error("E/S : {0}")]
    Io(#[from] std::io::Error),

    #[error("sérialisation : {0}")]
    Serialisation(#[from] serde_json::Error),

    /// localStorage indisponible ou quota dépassé.
    #[cfg(target_arch = "wasm32")]
    #[error("stockage navigateur : {0}")]
    Navigateur(String),
}

#[derive(Error, Debug)]
pub enum ErreurSession {
    /// Une soumission est déjà en vol : on ne relance pas.
    #[error("une soumission est déjà en cours")]
    SoumissionEnCours,

    /// Transition disponible seulement au repos (sélection, effacement historique).
    #[error("action indisponible pendant une soumission")]
    Occupee,

    /// L’entrée à afficher n’appartient pas (ou plus) à l’historique.
    #[error("entrée absente de l’historique")]
    EntreeInconnue,

    #[error(transparent)]
    Communication(#[from] ErreurCommunication),

    #[error("historique non enregistré : {0}")]
    Stockage(#[from] ErreurStockage),
}
