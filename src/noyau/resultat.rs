//! Résultat normalisé d’un calcul distant + résolution de forme.
//!
//! Rôle : décider UNE fois, à la frontière, comment lire une réponse :
//! - `Message`  : le service n’a pas produit de trace (texte informatif)
//! - `Trace`    : trois méthodes (Taylor, Euler, Runge), chacune une série (x, y)
//! - `Scalaire` : tout le reste (nombre, texte, forme inconnue), jamais perdu
//!
//! Contrat : la classification est totale. Priorité : message non vide > trace > scalaire.
//! L’égalité de longueur x/y d’une série est un contrat du service ; on ne la vérifie pas.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::erreurs::ErreurCommunication;

pub const CLE_RESULTAT: &str = "result";
pub const CLE_MESSAGE: &str = "message";

pub const METHODE_TAYLOR: &str = "metodo_taylor";
pub const METHODE_EULER: &str = "metodo_euler";
pub const METHODE_RUNGE: &str = "metodo_runge";

/// Échantillons alignés par index d’une même intégration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerieMethode {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    pub taylor: SerieMethode,
    pub euler: SerieMethode,
    pub runge: SerieMethode,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Scalaire {
    Nombre(f64),
    Texte(String),
}

impl fmt::Display for Scalaire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalaire::Nombre(n) => write!(f, "{n}"),
            Scalaire::Texte(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Resultat {
    Message(String),
    Trace(Trace),
    Scalaire(Scalaire),
}

/// Méthodes exposées par une trace, dans l’ordre d’affichage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Methode {
    Taylor,
    Euler,
    Runge,
}

impl Methode {
    pub const TOUTES: [Methode; 3] = [Methode::Taylor, Methode::Euler, Methode::Runge];

    pub fn titre(self) -> &'static str {
        match self {
            Methode::Taylor => "Méthode Taylor",
            Methode::Euler => "Méthode Euler",
            Methode::Runge => "Méthode Runge",
        }
    }
}

impl Resultat {
    /* ------------------------ Résolution ------------------------ */

    /// Classe une valeur `result` déjà extraite (ou une charge utile fabriquée).
    pub fn depuis_valeur(valeur: &Value) -> Self {
        if let Some(obj) = valeur.as_object() {
            if let Some(msg) = message_non_vide(obj.get(CLE_MESSAGE)) {
                return Resultat::Message(msg.to_string());
            }
            if let Some(trace) = lire_trace(obj) {
                return Resultat::Trace(trace);
            }
        }
        Resultat::Scalaire(lire_scalaire(valeur))
    }

    /// Classe un couple (`result`, `message`) : enveloppe de réponse ou enregistrement persisté.
    /// `None` si ni message ni `result` exploitable.
    pub fn resoudre(result: Option<&Value>, message: Option<&Value>) -> Option<Self> {
        if let Some(msg) = message_non_vide(message) {
            return Some(Resultat::Message(msg.to_string()));
        }
        match result {
            None | Some(Value::Null) => None,
            Some(v) => Some(Self::depuis_valeur(v)),
        }
    }

    /// Corps brut du service : `{ result, message? }`.
    pub fn depuis_reponse(corps: &Value) -> Result<Self, ErreurCommunication> {
        let obj = corps.as_object().ok_or(ErreurCommunication::ResultatAbsent)?;
        Self::resoudre(obj.get(CLE_RESULTAT), obj.get(CLE_MESSAGE))
            .ok_or(ErreurCommunication::ResultatAbsent)
    }

    /* ------------------------ Lecture ------------------------ */

    pub fn a_une_trace(&self) -> bool {
        matches!(self, Resultat::Trace(_))
    }

    pub fn serie(&self, methode: Methode) -> Option<&SerieMethode> {
        match self {
            Resultat::Trace(t) => Some(match methode {
                Methode::Taylor => &t.taylor,
                Methode::Euler => &t.euler,
                Methode::Runge => &t.runge,
            }),
            _ => None,
        }
    }

    pub fn taylor(&self) -> Option<&SerieMethode> {
        self.serie(Methode::Taylor)
    }

    pub fn euler(&self) -> Option<&SerieMethode> {
        self.serie(Methode::Euler)
    }

    pub fn runge(&self) -> Option<&SerieMethode> {
        self.serie(Methode::Runge)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Resultat::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn scalaire(&self) -> Option<&Scalaire> {
        match self {
            Resultat::Scalaire(s) => Some(s),
            _ => None,
        }
    }

    /// Nom court (journalisation).
    pub fn genre(&self) -> &'static str {
        match self {
            Resultat::Message(_) => "message",
            Resultat::Trace(_) => "trace",
            Resultat::Scalaire(_) => "scalaire",
        }
    }

    /* ------------------------ Forme persistée ------------------------ */

    /// Valeur `result` telle qu’écrite dans l’historique (`null` pour un message).
    pub fn vers_valeur(&self) -> Value {
        match self {
            Resultat::Message(_) => Value::Null,
            Resultat::Scalaire(Scalaire::Nombre(n)) => nombre(*n),
            Resultat::Scalaire(Scalaire::Texte(s)) => Value::String(s.clone()),
            Resultat::Trace(t) => {
                let mut obj = Map::new();
                obj.insert(METHODE_TAYLOR.to_string(), serie_vers_valeur(&t.taylor));
                obj.insert(METHODE_EULER.to_string(), serie_vers_valeur(&t.euler));
                obj.insert(METHODE_RUNGE.to_string(), serie_vers_valeur(&t.runge));
                Value::Object(obj)
            }
        }
    }
}

/* ------------------------ Helpers ------------------------ */

fn message_non_vide(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn lire_trace(obj: &Map<String, Value>) -> Option<Trace> {
    Some(Trace {
        taylor: lire_serie(obj.get(METHODE_TAYLOR)?)?,
        euler: lire_serie(obj.get(METHODE_EULER)?)?,
        runge: lire_serie(obj.get(METHODE_RUNGE)?)?,
    })
}

fn lire_serie(v: &Value) -> Option<SerieMethode> {
    let obj = v.as_object()?;
    Some(SerieMethode {
        x: lire_nombres(obj.get("x")?)?,
        y: lire_nombres(obj.get("y")?)?,
    })
}

fn lire_nombres(v: &Value) -> Option<Vec<f64>> {
    v.as_array()?.iter().map(Value::as_f64).collect()
}

fn lire_scalaire(v: &Value) -> Scalaire {
    match v {
        Value::Number(n) => match n.as_f64() {
            Some(f) => Scalaire::Nombre(f),
            None => Scalaire::Texte(n.to_string()),
        },
        Value::String(s) => Scalaire::Texte(s.clone()),
        autre => Scalaire::Texte(autre.to_string()),
    }
}

fn nombre(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn serie_vers_valeur(s: &SerieMethode) -> Value {
    let mut obj = Map::new();
    obj.insert("x".into(), Value::Array(s.x.iter().copied().map(nombre).collect()));
    obj.insert("y".into(), Value::Array(s.y.iter().copied().map(nombre).collect()));
    Value::Object(obj)
}
