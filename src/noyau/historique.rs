//! Historique des calculs + magasin persistant.
//!
//! Contrats :
//! - Ordre : plus récent en tête ; l’ordre d’insertion fait foi ; pas de plafond.
//! - Une entrée est immuable ; on ne remplace que la séquence entière.
//! - `enregistrer` persiste la NOUVELLE séquence avant de la rendre : le disque n’est
//!   jamais en avance sur la mémoire (si l’écriture échoue, l’appelant garde l’ancienne).
//! - `charger` n’échoue jamais : absent, illisible ou corrompu => historique vide.
//! - `effacer` supprime la clé (état identique à une première installation).
//!
//! Forme persistée : tableau JSON de `{ expr, result, message, time }`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::erreurs::ErreurStockage;
use super::resultat::Resultat;
use super::stockage::Stockage;

/// Clé par défaut de l’unique case persistée.
pub const CLE_HISTORIQUE: &str = "history";

/// Format d’affichage de l’heure de soumission.
pub const FORMAT_HEURE: &str = "%d/%m/%Y %H:%M:%S";

pub fn horodatage_maintenant() -> String {
    chrono::Local::now().format(FORMAT_HEURE).to_string()
}

/* ------------------------ Entrée ------------------------ */

#[derive(Clone, Debug, PartialEq)]
pub struct EntreeHistorique {
    expression: String,
    resultat: Resultat,
    horodatage: String,
}

impl EntreeHistorique {
    /// Entrée horodatée maintenant.
    pub fn new(expression: impl Into<String>, resultat: Resultat) -> Self {
        Self::avec_horodatage(expression, resultat, horodatage_maintenant())
    }

    pub fn avec_horodatage(
        expression: impl Into<String>,
        resultat: Resultat,
        horodatage: impl Into<String>,
    ) -> Self {
        Self {
            expression: expression.into(),
            resultat,
            horodatage: horodatage.into(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn resultat(&self) -> &Resultat {
        &self.resultat
    }

    pub fn horodatage(&self) -> &str {
        &self.horodatage
    }
}

#[derive(Serialize, Deserialize)]
struct Enregistrement {
    expr: String,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    time: String,
}

impl From<&EntreeHistorique> for Enregistrement {
    fn from(e: &EntreeHistorique) -> Self {
        Self {
            expr: e.expression.clone(),
            result: e.resultat.vers_valeur(),
            message: e.resultat.message().map(str::to_string),
            time: e.horodatage.clone(),
        }
    }
}

impl From<Enregistrement> for EntreeHistorique {
    fn from(e: Enregistrement) -> Self {
        let message = e.message.map(Value::String);
        let resultat = Resultat::resoudre(Some(&e.result), message.as_ref())
            .unwrap_or_else(|| Resultat::depuis_valeur(&e.result));
        Self::avec_horodatage(e.expr, resultat, e.time)
    }
}

/* ------------------------ Séquence ------------------------ */

/// Propriétaire unique des entrées ; la sélection n’en garde qu’une référence faible.
#[derive(Clone, Debug, Default)]
pub struct Historique {
    entrees: Vec<Arc<EntreeHistorique>>,
}

impl Historique {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nouvelle séquence avec `entree` en tête ; `self` n’est pas modifié.
    pub fn avec_en_tete(&self, entree: impl Into<Arc<EntreeHistorique>>) -> Self {
        let mut entrees = Vec::with_capacity(self.entrees.len() + 1);
        entrees.push(entree.into());
        entrees.extend(self.entrees.iter().cloned());
        Self { entrees }
    }

    #[cfg(test)]
    pub fn tete(&self) -> Option<&Arc<EntreeHistorique>> {
        self.entrees.first()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&Arc<EntreeHistorique>> {
        self.entrees.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntreeHistorique>> {
        self.entrees.iter()
    }

    pub fn len(&self) -> usize {
        self.entrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrees.is_empty()
    }

    /// Vrai si `entree` appartient à cette séquence (identité, pas égalité).
    pub fn contient(&self, entree: &Arc<EntreeHistorique>) -> bool {
        self.entrees.iter().any(|e| Arc::ptr_eq(e, entree))
    }

    fn vers_json(&self) -> Result<String, ErreurStockage> {
        let brut: Vec<Enregistrement> = self.entrees.iter().map(|e| e.as_ref().into()).collect();
        Ok(serde_json::to_string(&brut)?)
    }

    fn depuis_json(s: &str) -> Result<Self, serde_json::Error> {
        let brut: Vec<Enregistrement> = serde_json::from_str(s)?;
        Ok(Self {
            entrees: brut.into_iter().map(|e| Arc::new(e.into())).collect(),
        })
    }
}

impl PartialEq for Historique {
    fn eq(&self, autre: &Self) -> bool {
        self.entrees.len() == autre.entrees.len()
            && self
                .entrees
                .iter()
                .zip(&autre.entrees)
                .all(|(a, b)| a.as_ref() == b.as_ref())
    }
}

/* ------------------------ Magasin ------------------------ */

pub struct MagasinHistorique<S: Stockage> {
    stockage: S,
    cle: String,
}

impl<S: Stockage> MagasinHistorique<S> {
    pub fn new(stockage: S) -> Self {
        Self::avec_cle(stockage, CLE_HISTORIQUE)
    }

    pub fn avec_cle(stockage: S, cle: impl Into<String>) -> Self {
        Self {
            stockage,
            cle: cle.into(),
        }
    }

    #[cfg(test)]
    pub fn stockage(&self) -> &S {
        &self.stockage
    }

    pub fn charger(&self) -> Historique {
        let brut = match self.stockage.lire(&self.cle) {
            Ok(Some(s)) => s,
            Ok(None) => {
                debug!(cle = %self.cle, "aucun historique persisté");
                return Historique::new();
            }
            Err(e) => {
                warn!(cle = %self.cle, erreur = %e, "historique illisible, départ à vide");
                return Historique::new();
            }
        };

        match Historique::depuis_json(&brut) {
            Ok(h) => {
                info!(cle = %self.cle, entrees = h.len(), "historique chargé");
                h
            }
            Err(e) => {
                warn!(cle = %self.cle, erreur = %e, "historique corrompu, ignoré");
                Historique::new()
            }
        }
    }

    /// Nouvelle séquence = `entree` + `courant`, persistée AVANT d’être rendue.
    pub fn enregistrer(
        &mut self,
        entree: impl Into<Arc<EntreeHistorique>>,
        courant: &Historique,
    ) -> Result<Historique, ErreurStockage> {
        let nouveau = courant.avec_en_tete(entree);
        self.stockage.ecrire(&self.cle, &nouveau.vers_json()?)?;
        debug!(cle = %self.cle, entrees = nouveau.len(), "historique persisté");
        Ok(nouveau)
    }

    pub fn effacer(&mut self) -> Result<(), ErreurStockage> {
        self.stockage.supprimer(&self.cle)?;
        info!(cle = %self.cle, "historique effacé");
        Ok(())
    }
}
