//! Contrôleur de session : seul propriétaire de l’état (tampon, historique, sélection).
//!
//! Machine d’état :
//!
//!   Repos --commencer--> Soumission --terminer(Ok)--> Repos (+ sélection, détail ouvert)
//!                                   --terminer(Err)-> Repos (état inchangé, erreur remontée)
//!
//! - Une seule requête en vol : `commencer` refuse la ré-entrée (`SoumissionEnCours`).
//! - Entrée vide (après trim) : aucun appel réseau, aucun changement (`Soumission::Ignoree`).
//! - `selectionner` / `effacer_historique` : seulement au repos.
//! - La sélection est une référence faible vers une entrée de l’historique.
//!
//! Deux usages :
//! - `soumettre(client).await` : tout-en-un (scénarios de test)
//! - `commencer` + `terminer` : boucle d’UI qui ne peut pas attendre (egui)

use std::sync::{Arc, Weak};

use tracing::{debug, info, warn};

#[cfg(test)]
use super::client::ClientCalcul;
use super::erreurs::{ErreurCommunication, ErreurSession};
use super::historique::{EntreeHistorique, Historique, MagasinHistorique};
use super::resultat::Resultat;
use super::stockage::Stockage;
use super::tampon::Tampon;

/// Jeton d’une soumission en vol ; rendu à `terminer`.
#[derive(Debug)]
pub struct Demande {
    expression: String,
}

impl Demande {
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

#[cfg(test)]
#[derive(Debug)]
pub enum Soumission {
    /// Entrée vide : rien n’a été envoyé.
    Ignoree,
    Enregistree(Arc<EntreeHistorique>),
}

pub struct Session<S: Stockage> {
    tampon: Tampon,
    historique: Historique,
    magasin: MagasinHistorique<S>,
    selection: Option<Weak<EntreeHistorique>>,
    detail_ouvert: bool,
    en_vol: bool,
}

impl<S: Stockage> Session<S> {
    /// Charge l’historique persisté (vide si absent ou corrompu).
    pub fn new(magasin: MagasinHistorique<S>) -> Self {
        let historique = magasin.charger();
        Self {
            tampon: Tampon::new(),
            historique,
            magasin,
            selection: None,
            detail_ouvert: false,
            en_vol: false,
        }
    }

    /* ------------------------ Vues (lecture seule) ------------------------ */

    pub fn expression(&self) -> &str {
        self.tampon.texte()
    }

    pub fn historique(&self) -> &Historique {
        &self.historique
    }

    pub fn selection(&self) -> Option<Arc<EntreeHistorique>> {
        self.selection.as_ref().and_then(Weak::upgrade)
    }

    pub fn detail_ouvert(&self) -> bool {
        self.detail_ouvert
    }

    pub fn en_cours(&self) -> bool {
        self.en_vol
    }

    #[cfg(test)]
    pub fn magasin(&self) -> &MagasinHistorique<S> {
        &self.magasin
    }

    /* ------------------------ Tampon ------------------------ */

    pub fn ajouter(&mut self, jeton: &str) {
        self.tampon.ajouter(jeton);
    }

    pub fn effacer_dernier(&mut self) {
        self.tampon.effacer_dernier();
    }

    pub fn vider_expression(&mut self) {
        self.tampon.vider();
    }

    /* ------------------------ Soumission ------------------------ */

    /// Repos -> Soumission. `Ok(None)` si l’entrée est vide (rien ne change).
    pub fn commencer(&mut self) -> Result<Option<Demande>, ErreurSession> {
        if self.en_vol {
            warn!("soumission ré-entrante refusée");
            return Err(ErreurSession::SoumissionEnCours);
        }
        if self.tampon.est_vide() {
            debug!("entrée vide, soumission ignorée");
            return Ok(None);
        }

        self.en_vol = true;
        let expression = self.tampon.texte().to_string();
        info!(expression = %expression, "soumission");
        Ok(Some(Demande { expression }))
    }

    /// Soumission -> Repos. En cas d’échec (réseau ou stockage), rien n’est modifié.
    pub fn terminer(
        &mut self,
        demande: Demande,
        reponse: Result<Resultat, ErreurCommunication>,
    ) -> Result<Arc<EntreeHistorique>, ErreurSession> {
        self.en_vol = false;

        let resultat = reponse.inspect_err(|e| {
            warn!(expression = %demande.expression, erreur = %e, "échec du calcul");
        })?;

        let genre = resultat.genre();
        let tete = Arc::new(EntreeHistorique::new(demande.expression, resultat));
        self.historique = self
            .magasin
            .enregistrer(Arc::clone(&tete), &self.historique)
            .inspect_err(|e| warn!(erreur = %e, "échec d’écriture de l’historique"))?;

        self.selection = Some(Arc::downgrade(&tete));
        self.detail_ouvert = true;
        self.tampon.vider();

        info!(
            expression = %tete.expression(),
            genre,
            entrees = self.historique.len(),
            "calcul enregistré"
        );
        Ok(tete)
    }

    /// `commencer` + appel distant + `terminer`.
    #[cfg(test)]
    pub async fn soumettre<C>(&mut self, client: &C) -> Result<Soumission, ErreurSession>
    where
        C: ClientCalcul + ?Sized,
    {
        let Some(demande) = self.commencer()? else {
            return Ok(Soumission::Ignoree);
        };
        let reponse = client.calculer(demande.expression()).await;
        self.terminer(demande, reponse).map(Soumission::Enregistree)
    }

    /* ------------------------ Historique / détail ------------------------ */

    pub fn selectionner(&mut self, entree: &Arc<EntreeHistorique>) -> Result<(), ErreurSession> {
        if self.en_vol {
            return Err(ErreurSession::Occupee);
        }
        if !self.historique.contient(entree) {
            return Err(ErreurSession::EntreeInconnue);
        }
        self.selection = Some(Arc::downgrade(entree));
        self.detail_ouvert = true;
        Ok(())
    }

    /// Ferme le détail sans oublier la sélection.
    pub fn fermer_detail(&mut self) {
        self.detail_ouvert = false;
    }

    pub fn effacer_historique(&mut self) -> Result<(), ErreurSession> {
        if self.en_vol {
            return Err(ErreurSession::Occupee);
        }
        self.magasin.effacer()?;
        self.historique = Historique::new();
        self.selection = None;
        Ok(())
    }
}
