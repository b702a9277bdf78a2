// src/app.rs
//
// Calculatrice Trace : module App (racine)
// ----------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter AppCalc (pour main.rs: use crate::app::AppCalc;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Important:
// - La réponse du service arrive hors frame : on la relève au début de chaque update.
// - Tant qu’une requête est en vol, on redemande une frame (sinon egui dort).

pub mod etat;
pub mod vue;

// Ré-export pratique : `use crate::app::AppCalc;`
pub use etat::AppCalc;

use std::time::Duration;

use eframe::egui;

/// Cadence de relève pendant une requête.
const RELEVE_MS: u64 = 100;

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.verifier_reponse();

        self.clavier(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });

        self.ui_detail(ctx);

        if self.en_cours() {
            ctx.request_repaint_after(Duration::from_millis(RELEVE_MS));
        }
    }
}

/// Touches relevées sur une frame.
#[derive(Debug, Default, PartialEq)]
struct Touches {
    texte: String,
    enter: bool,
    backspace: bool,
    esc: bool,
}

impl Touches {
    /// Un widget focalisé (navigation Tab) consomme déjà Espace/Enter :
    /// on ne rejoue ni le texte ni “=”.
    fn sans_focus(self, focus: bool) -> Self {
        if focus {
            Self {
                texte: String::new(),
                enter: false,
                ..self
            }
        } else {
            self
        }
    }
}

impl AppCalc {
    /// Raccourcis clavier (pas de champ éditable : l’entrée ne bouge que par la fin).
    /// - Enter = “=”, Backspace = DEL, Escape = C
    /// - texte tapé = ajout tel quel
    fn clavier(&mut self, ctx: &egui::Context) {
        let touches = ctx.input(|i| Touches {
            texte: i
                .events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Text(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect(),
            enter: i.key_pressed(egui::Key::Enter),
            backspace: i.key_pressed(egui::Key::Backspace),
            esc: i.key_pressed(egui::Key::Escape),
        });
        let focus = ctx.memory(|m| m.focused().is_some());

        self.appliquer(touches.sans_focus(focus));
    }

    fn appliquer(&mut self, touches: Touches) {
        if !touches.texte.is_empty() {
            self.ajouter(&touches.texte);
        }
        if touches.backspace {
            self.effacer_dernier();
        }
        if touches.esc {
            self.clear_entree();
        }
        if touches.enter {
            self.calculer();
        }
    }
}
