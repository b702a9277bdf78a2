//! Collaborateur durable clé/valeur (get / set / remove).
//!
//! Backends :
//! - `StockageMemoire`  : double de test (cfg(test) seulement)
//! - `StockageFichiers` : natif, un fichier `<dossier>/<clé>.json` par clé
//! - `StockageLocal`    : wasm32, `window.localStorage`
//!
//! Sémantique : dernier écrivain gagne, aucun verrou (un seul écrivain, le contrôleur).

use super::erreurs::ErreurStockage;

pub trait Stockage {
    fn lire(&self, cle: &str) -> Result<Option<String>, ErreurStockage>;
    fn ecrire(&mut self, cle: &str, valeur: &str) -> Result<(), ErreurStockage>;
    /// Supprime la clé elle-même (pas d’écriture d’une valeur vide).
    fn supprimer(&mut self, cle: &str) -> Result<(), ErreurStockage>;
}

/* ------------------------ Mémoire (tests) ------------------------ */

#[cfg(test)]
pub use memoire::StockageMemoire;


/* ------------------------ Fichiers (natif) ------------------------ */

#[cfg(not(target_arch = "wasm32"))]
pub use fichiers::StockageFichiers;

#[cfg(not(target_arch = "wasm32"))]
mod fichiers {
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::{ErreurStockage, Stockage};

    #[derive(Clone, Debug)]
    pub struct StockageFichiers {
        dossier: PathBuf,
    }

    impl StockageFichiers {
        pub fn new(dossier: impl AsRef<Path>) -> Self {
            Self {
                dossier: dossier.as_ref().to_path_buf(),
            }
        }

        pub fn chemin(&self, cle: &str) -> PathBuf {
            self.dossier.join(format!("{cle}.json"))
        }
    }

    impl Stockage for StockageFichiers {
        fn lire(&self, cle: &str) -> Result<Option<String>, ErreurStockage> {
            match std::fs::read_to_string(self.chemin(cle)) {
                Ok(s) => Ok(Some(s)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        /// Écriture complète dans un fichier voisin puis rename : jamais de fichier à moitié écrit.
        fn ecrire(&mut self, cle: &str, valeur: &str) -> Result<(), ErreurStockage> {
            std::fs::create_dir_all(&self.dossier)?;
            let cible = self.chemin(cle);
            let tmp = cible.with_extension("json.tmp");
            std::fs::write(&tmp, valeur)?;
            std::fs::rename(&tmp, &cible)?;
            Ok(())
        }

        fn supprimer(&mut self, cle: &str) -> Result<(), ErreurStockage> {
            match std::fs::remove_file(self.chemin(cle)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }
}

/* ------------------------ localStorage (wasm32) ------------------------ */

#[cfg(target_arch = "wasm32")]
pub use local::StockageLocal;

#[cfg(target_arch = "wasm32")]
mod local {
    use super::{ErreurStockage, Stockage};

    #[derive(Clone, Debug, Default)]
    pub struct StockageLocal;

    fn stockage() -> Result<web_sys::Storage, ErreurStockage> {
        web_sys::window()
            .ok_or_else(|| ErreurStockage::Navigateur("window() indisponible".into()))?
            .local_storage()
            .map_err(|e| ErreurStockage::Navigateur(format!("{e:?}")))?
            .ok_or_else(|| ErreurStockage::Navigateur("localStorage indisponible".into()))
    }

    impl Stockage for StockageLocal {
        fn lire(&self, cle: &str) -> Result<Option<String>, ErreurStockage> {
            stockage()?
                .get_item(cle)
                .map_err(|e| ErreurStockage::Navigateur(format!("{e:?}")))
        }

        fn ecrire(&mut self, cle: &str, valeur: &str) -> Result<(), ErreurStockage> {
            stockage()?
                .set_item(cle, valeur)
                .map_err(|e| ErreurStockage::Navigateur(format!("{e:?}")))
        }

        fn supprimer(&mut self, cle: &str) -> Result<(), ErreurStockage> {
            stockage()?
                .remove_item(cle)
                .map_err(|e| ErreurStockage::Navigateur(format!("{e:?}")))
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn memoire_get_set_remove() {
        let mut s = StockageMemoire::new();
        assert_eq!(s.lire("history").unwrap(), None);

        s.ecrire("history", "[]").unwrap();
        assert_eq!(s.lire("history").unwrap().as_deref(), Some("[]"));

        s.ecrire("history", "[1]").unwrap();
        assert_eq!(s.lire("history").unwrap().as_deref(), Some("[1]"));

        s.supprimer("history").unwrap();
        assert!(!s.contient("history"));
        assert_eq!(s.lire("history").unwrap(), None);
    }

    #[test]
    fn fichiers_get_set_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = StockageFichiers::new(dir.path().join("sous/dossier"));

        assert_eq!(s.lire("history").unwrap(), None);

        s.ecrire("history", r#"[{"expr":"1"}]"#).unwrap();
        assert_eq!(
            s.lire("history").unwrap().as_deref(),
            Some(r#"[{"expr":"1"}]"#)
        );
        assert!(s.chemin("history").exists());
        assert!(!s.chemin("history").with_extension("json.tmp").exists());

        s.supprimer("history").unwrap();
        assert!(!s.chemin("history").exists());
        assert_eq!(s.lire("history").unwrap(), None);
    }

    #[test]
    fn fichiers_supprimer_absent_est_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = StockageFichiers::new(dir.path());
        s.supprimer("jamais_ecrit").unwrap();
    }
}
