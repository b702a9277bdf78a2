// src/noyau/tampon.rs
//
// Tampon d’expression : chaîne opaque, modifiée seulement par la fin.
// Aucune validation syntaxique ici (le service distant s’en charge).

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tampon {
    texte: String,
}

impl Tampon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatène le jeton tel quel (chiffre, opérateur, "sin(", variable...).
    pub fn ajouter(&mut self, jeton: &str) {
        self.texte.push_str(jeton);
    }

    /// Retire exactement un caractère final ; no-op si vide.
    pub fn effacer_dernier(&mut self) {
        self.texte.pop();
    }

    pub fn vider(&mut self) {
        self.texte.clear();
    }

    pub fn texte(&self) -> &str {
        &self.texte
    }

    /// Vrai si l’expression ne contient que des blancs (rien à soumettre).
    pub fn est_vide(&self) -> bool {
        self.texte.trim().is_empty()
    }
}
