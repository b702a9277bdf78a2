//! Tests de session (scénarios) : machine d’état + historique persistant.
//!
//! Client distant simulé (compte les appels) + stockage mémoire.
//! Invariants vérifiés :
//! - entrée vide => zéro appel réseau, zéro changement
//! - succès => nouvelle tête, longueur +1, tampon vide, sélection = tête, détail ouvert
//! - échec => rien ne bouge (ni tampon, ni historique, ni disque)
//! - une seule soumission en vol

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use super::client::ClientCalcul;
use super::erreurs::{ErreurCommunication, ErreurSession, ErreurStockage};
use super::historique::{MagasinHistorique, CLE_HISTORIQUE};
use super::resultat::{Resultat, Scalaire};
use super::session::{Session, Soumission};
use super::stockage::{Stockage, StockageMemoire};

/* ------------------------ Doubles ------------------------ */

type Reponse = Box<dyn Fn(&str) -> Result<Resultat, ErreurCommunication> + Send + Sync>;

struct ClientSimule {
    reponse: Reponse,
    appels: AtomicUsize,
    recus: Mutex<Vec<String>>,
}

impl ClientSimule {
    fn new<F>(reponse: F) -> Self
    where
        F: Fn(&str) -> Result<Resultat, ErreurCommunication> + Send + Sync + 'static,
    {
        Self {
            reponse: Box::new(reponse),
            appels: AtomicUsize::new(0),
            recus: Mutex::new(Vec::new()),
        }
    }

    fn scalaire(n: f64) -> Self {
        Self::new(move |_| Ok(Resultat::Scalaire(Scalaire::Nombre(n))))
    }

    fn en_panne() -> Self {
        Self::new(|_| Err(ErreurCommunication::Transport("connexion refusée".into())))
    }

    fn appels(&self) -> usize {
        self.appels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientCalcul for ClientSimule {
    async fn calculer(&self, expression: &str) -> Result<Resultat, ErreurCommunication> {
        self.appels.fetch_add(1, Ordering::SeqCst);
        self.recus.lock().unwrap().push(expression.to_string());
        (self.reponse)(expression)
    }
}

/// Lecture/suppression normales, écriture refusée à la demande.
#[derive(Default)]
struct StockageFragile {
    interne: StockageMemoire,
    refuse_ecriture: bool,
}

impl Stockage for StockageFragile {
    fn lire(&self, cle: &str) -> Result<Option<String>, ErreurStockage> {
        self.interne.lire(cle)
    }
    fn ecrire(&mut self, cle: &str, valeur: &str) -> Result<(), ErreurStockage> {
        if self.refuse_ecriture {
            return Err(ErreurStockage::Io(std::io::Error::other("disque plein")));
        }
        self.interne.ecrire(cle, valeur)
    }
    fn supprimer(&mut self, cle: &str) -> Result<(), ErreurStockage> {
        self.interne.supprimer(cle)
    }
}

fn session() -> Session<StockageMemoire> {
    Session::new(MagasinHistorique::new(StockageMemoire::new()))
}

fn taper(s: &mut Session<impl Stockage>, jetons: &[&str]) {
    for j in jetons {
        s.ajouter(j);
    }
}

/* ------------------------ Entrée vide ------------------------ */

#[tokio::test]
async fn entree_vide_ou_blanche_n_appelle_pas_le_service() {
    let client = ClientSimule::scalaire(1.0);
    let mut s = session();

    let r = s.soumettre(&client).await.unwrap();
    assert!(matches!(r, Soumission::Ignoree));

    taper(&mut s, &["   "]);
    let r = s.soumettre(&client).await.unwrap();
    assert!(matches!(r, Soumission::Ignoree));

    assert_eq!(client.appels(), 0);
    assert!(s.historique().is_empty());
    assert_eq!(s.expression(), "   ");
    assert!(!s.en_cours());
    assert!(!s.magasin().stockage().contient(CLE_HISTORIQUE));
}

/* ------------------------ Succès ------------------------ */

#[tokio::test]
async fn scenario_deux_plus_deux() {
    let client = ClientSimule::scalaire(4.0);
    let mut s = session();
    taper(&mut s, &["2", "+", "2"]);

    let r = s.soumettre(&client).await.unwrap();
    let Soumission::Enregistree(entree) = r else {
        panic!("soumission attendue");
    };

    assert_eq!(client.appels(), 1);
    assert_eq!(client.recus.lock().unwrap().as_slice(), ["2+2"]);

    let tete = s.historique().tete().unwrap();
    assert_eq!(tete.expression(), "2+2");
    assert_eq!(tete.resultat(), &Resultat::Scalaire(Scalaire::Nombre(4.0)));
    assert!(Arc::ptr_eq(tete, &entree));

    let sel = s.selection().unwrap();
    assert!(Arc::ptr_eq(&sel, tete));
    assert!(s.detail_ouvert());
    assert_eq!(s.expression(), "");
    assert!(!s.en_cours());
}

#[tokio::test]
async fn chaque_succes_ajoute_une_tete() {
    let client = ClientSimule::new(|e| Ok(Resultat::Scalaire(Scalaire::Texte(format!("={e}")))));
    let mut s = session();

    for (i, expr) in ["1", "x+y", "sin(x)", "2^3"].iter().enumerate() {
        let avant = s.historique().len();
        s.ajouter(expr);
        s.soumettre(&client).await.unwrap();

        assert_eq!(s.historique().len(), avant + 1);
        assert_eq!(s.historique().tete().unwrap().expression(), *expr);
        assert_eq!(s.expression(), "");
        assert_eq!(client.appels(), i + 1);
    }

    let ordre: Vec<_> = s.historique().iter().map(|e| e.expression().to_string()).collect();
    assert_eq!(ordre, ["2^3", "sin(x)", "x+y", "1"]);
}

#[tokio::test]
async fn message_et_trace_sont_classes_a_la_frontiere() {
    let client = ClientSimule::new(|e| {
        Ok(if e == "y'" {
            Resultat::depuis_valeur(&json!({
                "metodo_taylor": { "x": [1, 2], "y": [3, 4] },
                "metodo_euler": { "x": [1, 2], "y": [3, 4] },
                "metodo_runge": { "x": [1, 2], "y": [3, 4] },
            }))
        } else {
            Resultat::depuis_valeur(&json!({ "message": "expression incomplète" }))
        })
    });
    let mut s = session();

    s.ajouter("y'");
    s.soumettre(&client).await.unwrap();
    let sel = s.selection().unwrap();
    assert!(sel.resultat().a_une_trace());
    assert_eq!(sel.resultat().taylor().unwrap().x, vec![1.0, 2.0]);

    s.ajouter("sin(");
    s.soumettre(&client).await.unwrap();
    let sel = s.selection().unwrap();
    assert_eq!(sel.resultat().message(), Some("expression incomplète"));
}

/* ------------------------ Échecs ------------------------ */

#[tokio::test]
async fn echec_reseau_ne_touche_a_rien() {
    let mut s = session();
    taper(&mut s, &["1", "+", "1"]);
    s.soumettre(&ClientSimule::scalaire(2.0)).await.unwrap();
    s.fermer_detail();

    taper(&mut s, &["3", "*"]);
    let client = ClientSimule::en_panne();
    let e = s.soumettre(&client).await.unwrap_err();

    assert!(matches!(e, ErreurSession::Communication(ErreurCommunication::Transport(_))));
    assert_eq!(client.appels(), 1);
    assert_eq!(s.expression(), "3*");
    assert_eq!(s.historique().len(), 1);
    assert_eq!(s.historique().tete().unwrap().expression(), "1+1");
    assert!(!s.detail_ouvert());
    assert!(!s.en_cours());

    // Rien d’écrit au-delà de la première entrée.
    let relu = MagasinHistorique::new(s.magasin().stockage().clone()).charger();
    assert_eq!(&relu, s.historique());
}

#[tokio::test]
async fn echec_d_ecriture_ne_touche_a_rien() {
    let magasin = MagasinHistorique::new(StockageFragile {
        refuse_ecriture: true,
        ..Default::default()
    });
    let mut s = Session::new(magasin);
    taper(&mut s, &["4", "/", "2"]);

    let e = s.soumettre(&ClientSimule::scalaire(2.0)).await.unwrap_err();

    assert!(matches!(e, ErreurSession::Stockage(_)));
    assert!(s.historique().is_empty());
    assert_eq!(s.expression(), "4/2");
    assert!(s.selection().is_none());
    assert!(!s.en_cours());
}

/* ------------------------ Ré-entrée ------------------------ */

#[test]
fn une_seule_soumission_en_vol() {
    let mut s = session();
    s.ajouter("1");
    soumettre_sans_runtime(&mut s, Resultat::Scalaire(Scalaire::Nombre(1.0)));

    s.ajouter("7");
    let demande = s.commencer().unwrap().unwrap();
    assert!(s.en_cours());
    assert_eq!(demande.expression(), "7");

    // ré-entrée refusée, transitions de repos refusées
    assert!(matches!(s.commencer(), Err(ErreurSession::SoumissionEnCours)));
    let premiere = Arc::clone(s.historique().tete().unwrap());
    assert!(matches!(s.selectionner(&premiere), Err(ErreurSession::Occupee)));
    assert!(matches!(s.effacer_historique(), Err(ErreurSession::Occupee)));
    assert_eq!(s.historique().len(), 1);

    // l’édition du tampon reste possible ; le succès le vide quand même
    s.ajouter("7");
    s.terminer(demande, Ok(Resultat::Scalaire(Scalaire::Nombre(7.0))))
        .unwrap();
    assert!(!s.en_cours());
    assert_eq!(s.expression(), "");
    assert_eq!(s.historique().tete().unwrap().expression(), "7");
}

#[test]
fn echec_libere_la_soumission() {
    let mut s = session();
    s.ajouter("1");
    let d = s.commencer().unwrap().unwrap();
    assert!(s.terminer(d, Err(ErreurCommunication::ResultatAbsent)).is_err());
    assert!(!s.en_cours());
    assert!(s.commencer().unwrap().is_some());
}

/* ------------------------ Historique / détail ------------------------ */

#[tokio::test]
async fn selection_fermeture_et_effacement() {
    let client = ClientSimule::scalaire(0.0);
    let mut s = session();
    for e in ["a", "b", "c"] {
        s.ajouter(e);
        s.soumettre(&client).await.unwrap();
    }

    let ancienne = Arc::clone(s.historique().get(2).unwrap());
    assert_eq!(ancienne.expression(), "a");
    s.fermer_detail();

    s.selectionner(&ancienne).unwrap();
    assert!(s.detail_ouvert());
    assert!(Arc::ptr_eq(&s.selection().unwrap(), &ancienne));

    s.fermer_detail();
    assert!(!s.detail_ouvert());
    assert!(s.selection().is_some(), "fermer garde la sélection");
    assert_eq!(s.historique().len(), 3);

    s.effacer_historique().unwrap();
    assert!(s.historique().is_empty());
    assert!(s.selection().is_none());
    assert!(!s.magasin().stockage().contient(CLE_HISTORIQUE));
    assert!(MagasinHistorique::new(s.magasin().stockage().clone())
        .charger()
        .is_empty());

    // l’ancienne entrée n’appartient plus à l’historique
    assert!(matches!(s.selectionner(&ancienne), Err(ErreurSession::EntreeInconnue)));
}

#[tokio::test]
async fn redemarrage_reproduit_l_historique() {
    let client = ClientSimule::scalaire(9.0);
    let mut s = session();
    for e in ["3*3", "81^(1/2)"] {
        s.ajouter(e);
        s.soumettre(&client).await.unwrap();
    }

    let stockage = s.magasin().stockage().clone();
    let s2 = Session::new(MagasinHistorique::new(stockage));

    assert_eq!(s2.historique(), s.historique());
    assert!(s2.selection().is_none());
    assert!(!s2.detail_ouvert());
    assert_eq!(s2.expression(), "");
}

#[test]
fn historique_corrompu_au_demarrage_donne_vide() {
    let mut stockage = StockageMemoire::new();
    stockage.ecrire(CLE_HISTORIQUE, "[{\"expr\": 12").unwrap();
    let s = Session::new(MagasinHistorique::new(stockage));
    assert!(s.historique().is_empty());
}

/* ------------------------ Helpers ------------------------ */

/// commencer + terminer, sans runtime async.
fn soumettre_sans_runtime(s: &mut Session<impl Stockage>, resultat: Resultat) {
    let d = s.commencer().unwrap().unwrap();
    s.terminer(d, Ok(resultat)).unwrap();
}
