//! B.E.E. Hive Manager control panel.
//!
//! Renders the latest `PanelView` published by the worker and forwards operator
//! actions as `PanelIntent`s via `bee_bridge` (tokio mpsc). Draft fields are kept
//! locally and adopted from the worker once, when the first status seeds them.

mod bridge;

pub use bridge::{
    bee_control_panel_channel, bee_view_channel, run_panel_worker, BeeIntentReceiver,
    BeeIntentSender, PanelIntent, PanelView,
};

use bee_core::view as labels;
use bee_core::{ConversationMetaDraft, Drafts, MetaOp, RiskDraft, GOAL_COUNT};
use egui::{Color32, RichText, Ui};
use tokio::sync::watch;

const ACCENT: Color32 = Color32::from_rgb(245, 190, 60);
const MUTED: Color32 = Color32::from_rgb(150, 150, 150);
const ERROR: Color32 = Color32::from_rgb(230, 90, 90);
const OK: Color32 = Color32::from_rgb(110, 200, 120);

pub struct BeeControlPanel {
    view: watch::Receiver<PanelView>,
    sender: BeeIntentSender,
    drafts: Drafts,
    drafts_adopted: bool,
    meta_draft: ConversationMetaDraft,
    meta_revision: u64,
    query: String,
}

impl BeeControlPanel {
    pub fn new(view: watch::Receiver<PanelView>, sender: BeeIntentSender) -> Self {
        Self {
            view,
            sender,
            drafts: Drafts::default(),
            drafts_adopted: false,
            meta_draft: ConversationMetaDraft::default(),
            meta_revision: 0,
            query: String::new(),
        }
    }

    /// Renders the control panel (egui immediate mode). Call each frame.
    pub fn bee_ui(&mut self, ui: &mut Ui) {
        let view = self.view.borrow().clone();
        self.bee_adopt(&view);
        let status = view.status.as_deref();

        ui.horizontal(|ui| {
            ui.heading(RichText::new("B.E.E. Hive Manager").color(ACCENT));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.bee_try_send(PanelIntent::Refresh);
                }
            });
        });
        ui.label(RichText::new("Binary Executive Engine control surface").color(MUTED));
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            self.bee_onboarding(ui);
            self.bee_heartbeat(ui, status, view.heartbeat_pending);
            self.bee_risk(ui);
            self.bee_evermem(ui, status);
            self.bee_goals(ui);

            ui.group(|ui| {
                ui.label(RichText::new("Personality").strong());
                ui.label(labels::personality_label(status));
            });

            self.bee_meta(ui, &view);
            self.bee_search(ui, &view);
        });
    }

    fn bee_adopt(&mut self, view: &PanelView) {
        if !self.drafts_adopted && view.drafts_seeded {
            self.drafts = view.drafts.clone();
            self.drafts_adopted = true;
        }
        if view.meta_revision != self.meta_revision {
            self.meta_draft = view.meta_draft.clone();
            self.meta_revision = view.meta_revision;
        }
    }

    fn bee_onboarding(&self, ui: &mut Ui) {
        ui.collapsing("Onboarding", |ui| {
            ui.label("Set these in the agent's .env before starting it:");
            for (var, purpose) in labels::ONBOARDING_STEPS {
                ui.horizontal(|ui| {
                    ui.monospace(var);
                    ui.label(RichText::new(purpose).color(MUTED));
                });
            }
        });
    }

    fn bee_heartbeat(&self, ui: &mut Ui, status: Option<&bee_core::StatusSnapshot>, pending: bool) {
        ui.group(|ui| {
            ui.label(RichText::new("Heartbeat").strong());
            ui.horizontal(|ui| {
                let state = labels::heartbeat_state_label(status);
                let color = if status.is_some_and(|s| s.heartbeat_running) {
                    OK
                } else {
                    MUTED
                };
                ui.label(RichText::new(state).color(color));
                ui.label(format!("every {}s", labels::interval_label(status)));
            });
            ui.label(format!("Last tick: {}", labels::last_tick_label(status)));

            let verb = labels::heartbeat_verb(status);
            let label = if verb == "Pause" { "Pause" } else { "Start heartbeat" };
            let enabled = status.is_some() && !pending;
            if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                self.bee_try_send(PanelIntent::ToggleHeartbeat);
            }
        });
    }

    fn bee_risk(&mut self, ui: &mut Ui) {
        ui.group(|ui| {
            ui.label(RichText::new("Risk tolerance").strong());
            let mut value = self.drafts.risk.value();
            if ui
                .add(egui::Slider::new(&mut value, RiskDraft::MIN..=RiskDraft::MAX))
                .changed()
            {
                self.drafts.risk.set(i64::from(value));
            }
            if ui.button("Save risk").clicked() {
                self.bee_try_send(PanelIntent::SaveRisk(self.drafts.risk));
            }
        });
    }

    fn bee_evermem(&self, ui: &mut Ui, status: Option<&bee_core::StatusSnapshot>) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("EvermemOS").strong());
                let pill = labels::evermem_label(status);
                let color = if pill == "Connected" { OK } else { MUTED };
                ui.label(RichText::new(pill).color(color));
            });
            ui.label(format!("Endpoint: {}", labels::endpoint_label(status)));
            ui.label(format!("Group: {}", labels::group_label(status)));
        });
    }

    fn bee_goals(&mut self, ui: &mut Ui) {
        ui.group(|ui| {
            ui.label(RichText::new("Directive goals").strong());
            for index in 0..GOAL_COUNT {
                if let Some(goal) = self.drafts.goals.slot_mut(index) {
                    ui.add(
                        egui::TextEdit::singleline(goal)
                            .hint_text(format!("Goal {}", index + 1))
                            .desired_width(f32::INFINITY),
                    );
                }
            }
            if ui.button("Save goals").clicked() {
                self.bee_try_send(PanelIntent::SaveGoals(self.drafts.goals.clone()));
            }
        });
    }

    fn bee_meta(&mut self, ui: &mut Ui, view: &PanelView) {
        ui.collapsing("Conversation meta", |ui| {
            let draft = &mut self.meta_draft;
            egui::Grid::new("bee_meta_grid").num_columns(2).show(ui, |ui| {
                for (label, field) in [
                    ("Group ID", &mut draft.group_id),
                    ("Scene", &mut draft.scene),
                    ("Name", &mut draft.name),
                    ("Description", &mut draft.description),
                    ("Scene description", &mut draft.scene_desc),
                    ("Timezone", &mut draft.timezone),
                    ("Tags (comma separated)", &mut draft.tags),
                ] {
                    ui.label(label);
                    ui.text_edit_singleline(field);
                    ui.end_row();
                }
            });
            ui.label("User details (JSON)");
            ui.add(
                egui::TextEdit::multiline(&mut draft.user_details)
                    .code_editor()
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                for (op, label) in [
                    (MetaOp::Load, "Load"),
                    (MetaOp::Save, "Save"),
                    (MetaOp::Patch, "Update"),
                ] {
                    if ui.button(label).clicked() {
                        self.bee_try_send(PanelIntent::Meta {
                            op,
                            draft: self.meta_draft.clone(),
                        });
                    }
                }
            });
            if let Some(notice) = &view.meta_notice {
                let color = if notice.is_error() { ERROR } else { MUTED };
                ui.label(RichText::new(notice.to_string()).color(color));
            }
        });
    }

    fn bee_search(&mut self, ui: &mut Ui, view: &PanelView) {
        ui.group(|ui| {
            ui.label(RichText::new("Memory search").strong());
            let mut submit = false;
            ui.horizontal(|ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut self.query)
                        .hint_text("Ask EvermemOS...")
                        .desired_width(300.0),
                );
                if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                let loading = view.search.is_loading();
                let button = egui::Button::new(labels::search_button_label(&view.search));
                if ui.add_enabled(!loading, button).clicked() {
                    submit = true;
                }
            });
            if submit {
                self.bee_try_send(PanelIntent::Search(self.query.clone()));
            }

            if let Some(message) = view.search.error() {
                ui.label(RichText::new(message).color(ERROR));
            }
            for (index, result) in view.search.results().iter().enumerate() {
                let (title, content, stamp) = labels::memory_card(index, result);
                ui.group(|ui| {
                    ui.label(RichText::new(title).strong());
                    ui.label(content);
                    if let Some(stamp) = stamp {
                        ui.label(RichText::new(stamp).small().color(MUTED));
                    }
                });
            }
        });
    }

    fn bee_try_send(&self, intent: PanelIntent) {
        if let Err(e) = self.sender.try_send(intent) {
            tracing::warn!(error = %e, "control panel intent dropped");
        }
    }
}
