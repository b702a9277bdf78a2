//! Noyau : expression, calcul distant, résultat, historique
//!
//! Organisation interne :
//! - tampon.rs     : expression en cours (ajout / retrait par la fin)
//! - resultat.rs   : Message | Trace (Taylor, Euler, Runge) | Scalaire + résolution de forme
//! - client.rs     : appel au service distant (POST { expr })
//! - stockage.rs   : collaborateur clé/valeur (mémoire, fichiers, localStorage)
//! - historique.rs : historique ordonné + persistance
//! - session.rs    : contrôleur (machine d’état, une soumission en vol)
//! - erreurs.rs    : taxonomie d’erreurs

pub mod client;
pub mod erreurs;
pub mod historique;
pub mod resultat;
pub mod session;
pub mod stockage;
pub mod tampon;

#[cfg(test)]
mod tests_session;

// Ce que l’app consomme
pub use client::{ClientCalcul, ClientHttp};
pub use erreurs::{ErreurCommunication, ErreurSession};
pub use historique::{EntreeHistorique, MagasinHistorique};
pub use resultat::{Methode, Resultat};
pub use session::{Demande, Session};
