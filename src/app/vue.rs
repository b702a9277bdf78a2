// src/app/vue.rs
//
// Vue (UI egui), natif + web
// --------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Affichage lecture seule : l’entrée ne change que par les touches (ajout / DEL / C)
// - Historique cliquable + fenêtre de détail (message, scalaire ou 3 méthodes)
// - “=” désactivé pendant une requête (la session refuse aussi la ré-entrée)

use std::sync::Arc;

use eframe::egui;

use super::etat::AppCalc;
use crate::noyau::{EntreeHistorique, Methode, Resultat};

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        // Densité “calc”
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        ui.heading("Calculatrice Trace");
        ui.add_space(6.0);

        ui.columns(2, |cols| {
            self.ui_calculatrice(&mut cols[0]);
            self.ui_historique(&mut cols[1]);
        });
    }

    fn ui_calculatrice(&mut self, ui: &mut egui::Ui) {
        let entree = self.session.expression();
        if entree.is_empty() {
            Self::champ_monospace(ui, "entree_out", "", 1);
            ui.weak("Entrez l’expression");
        } else {
            Self::champ_monospace(ui, "entree_out", entree, 1);
        }

        ui.add_space(8.0);
        self.ui_pave(ui);

        if self.en_cours() {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Calcul en cours…");
            });
        }

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_pave(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_trace")
            .num_columns(4)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                self.bouton_insert(ui, "1", "1");
                self.bouton_insert(ui, "2", "2");
                self.bouton_insert(ui, "3", "3");
                self.bouton_action(ui, "DEL", "Efface le dernier caractère", Action::Effacer);
                ui.end_row();

                self.bouton_insert(ui, "4", "4");
                self.bouton_insert(ui, "5", "5");
                self.bouton_insert(ui, "6", "6");
                self.bouton_insert(ui, "-", "-");
                ui.end_row();

                self.bouton_insert(ui, "7", "7");
                self.bouton_insert(ui, "8", "8");
                self.bouton_insert(ui, "9", "9");
                self.bouton_insert(ui, "*", "*");
                ui.end_row();

                self.bouton_insert(ui, "0", "0");
                self.bouton_insert(ui, ".", ".");
                self.bouton_insert(ui, "^", "^");
                self.bouton_insert(ui, "+", "+");
                ui.end_row();

                self.bouton_insert(ui, "/", "/");
                self.bouton_insert(ui, "sin", "sin(");
                self.bouton_insert(ui, "cos", "cos(");
                self.bouton_action(ui, "C", "Efface l’entrée", Action::Vider);
                ui.end_row();

                self.bouton_insert(ui, "x", "x");
                self.bouton_insert(ui, "y", "y");
                self.bouton_insert(ui, "(", "(");
                self.bouton_insert(ui, ")", ")");
                ui.end_row();
            });

        ui.add_space(6.0);

        let libre = !self.en_cours();
        let eq = ui.add_enabled_ui(libre, |ui| {
            ui.add_sized([ui.available_width().min(208.0), 32.0], egui::Button::new("="))
        });
        if eq.inner.clicked() {
            eq.inner.surrender_focus();
            self.calculer();
        }
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.strong("Historique");
            let libre = !self.en_cours() && !self.session.historique().is_empty();
            if ui
                .add_enabled(libre, egui::Button::new("Effacer l’historique"))
                .clicked()
            {
                self.effacer_historique();
            }
        });
        ui.separator();

        // Copie des Arc : la boucle peut muter la sélection.
        let lignes: Vec<Arc<EntreeHistorique>> =
            self.session.historique().iter().cloned().collect();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if lignes.is_empty() {
                    ui.weak("Aucun calcul");
                }
                for (i, entree) in lignes.iter().enumerate() {
                    let resp = ui
                        .push_id(i, |ui| Self::ligne_historique(ui, entree))
                        .inner
                        .interact(egui::Sense::click())
                        .on_hover_cursor(egui::CursorIcon::PointingHand);
                    if resp.clicked() && !self.en_cours() {
                        self.selectionner(entree);
                    }
                }
            });
    }

    fn ligne_historique(ui: &mut egui::Ui, entree: &EntreeHistorique) -> egui::Response {
        egui::Frame::group(ui.style())
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(format!("Expression : {}", entree.expression()));
                ui.small(format!("Heure : {}", entree.horodatage()));
            })
            .response
    }

    /// Fenêtre “modale” de détail ; fermée => la sélection reste.
    pub fn ui_detail(&mut self, ctx: &egui::Context) {
        if !self.session.detail_ouvert() {
            return;
        }
        let Some(entree) = self.session.selection() else {
            self.fermer_detail();
            return;
        };

        let mut ouvert = true;
        let mut fermer = false;

        egui::Window::new("Détails")
            .open(&mut ouvert)
            .collapsible(false)
            .resizable(true)
            .default_width(560.0)
            .show(ctx, |ui| {
                ui.heading("Expression");
                Self::champ_monospace(ui, "detail_expr", entree.expression(), 1);
                ui.add_space(6.0);

                let r = entree.resultat();
                if let Some(m) = r.message() {
                    ui.label(m);
                } else if r.a_une_trace() {
                    Self::ui_trace(ui, r);
                } else if let Some(s) = r.scalaire() {
                    ui.heading("Résultat");
                    Self::champ_monospace(ui, "detail_scalaire", &s.to_string(), 1);
                }

                ui.add_space(6.0);
                ui.heading("Heure");
                ui.label(entree.horodatage());

                ui.add_space(6.0);
                if ui.button("Fermer").clicked() {
                    fermer = true;
                }
            });

        if !ouvert || fermer {
            self.fermer_detail();
        }
    }

    fn ui_trace(ui: &mut egui::Ui, r: &Resultat) {
        let series = [r.taylor(), r.euler(), r.runge()];
        ui.columns(3, |cols| {
            for ((col, methode), serie) in cols.iter_mut().zip(Methode::TOUTES).zip(series) {
                col.strong(methode.titre());
                if let Some(serie) = serie {
                    Self::colonne_valeurs(col, (methode.titre(), "x"), "X", &serie.x);
                    Self::colonne_valeurs(col, (methode.titre(), "y"), "Y", &serie.y);
                }
            }
        });
    }

    fn colonne_valeurs(ui: &mut egui::Ui, id: impl std::hash::Hash, titre: &str, valeurs: &[f64]) {
        ui.label(titre);
        ui.push_id(id, |ui| {
            egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                for v in valeurs {
                    ui.monospace(v.to_string());
                }
            });
        });
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Affichage lecture seule “stable”, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([46.0, 28.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            resp.surrender_focus();
            match action {
                Action::Effacer => self.effacer_dernier(),
                Action::Vider => self.clear_entree(),
            }
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, jeton: &str) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if resp.clicked() {
            // sinon Espace/Enter rejouent le bouton en plus du texte tapé
            resp.surrender_focus();
            self.ajouter(jeton);
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Effacer,
    Vider,
}
