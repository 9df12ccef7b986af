use egui::{Color32, Context, RichText, Ui};
use vt_core::HistoryEntry;
use crate::events::AppEvent;
use crate::history::display_timestamp;
use crate::ui::{UiComponent, UiContext, UiEvent};

#[derive(Default)]
pub struct HistoryPanel {
    show_panel: bool,
}

impl HistoryPanel {
    fn show_entry_card(&self, ui: &mut Ui, ui_ctx: &UiContext, entry: &HistoryEntry) {
        let current = ui_ctx
            .session
            .controller
            .current
            .as_ref()
            .and_then(|current| current.result_id.as_ref());
        let is_current = current == Some(&entry.result_id);
        let busy = ui_ctx.session.controller.in_flight;

        egui::Frame::new()
            .fill(Color32::from_gray(30))
            .corner_radius(5.0)
            .inner_margin(10.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(60)))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("🖼").size(24.0));
                    ui.add_space(5.0);

                    ui.vertical(|ui| {
                        ui.label(RichText::new(format!("Result #{}", entry.result_id)).strong());

                        let created = entry
                            .created_at
                            .as_deref()
                            .map(display_timestamp)
                            .unwrap_or_else(|| "unknown date".to_string());
                        ui.label(RichText::new(created).small().color(Color32::GRAY));
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_enabled(!busy, egui::Button::new("🗑")).clicked() {
                            ui_ctx.send_event(UiEvent::DeleteHistory(entry.result_id.clone()));
                        }
                        ui.add_space(5.0);

                        if is_current {
                            ui.label(RichText::new("👁 Viewing").color(Color32::LIGHT_BLUE));
                        } else if ui.add_enabled(!busy, egui::Button::new("View")).clicked() {
                            ui_ctx.send_event(UiEvent::ShowHistoryEntry(entry.clone()));
                        }
                    });
                });
            });

        ui.add_space(5.0);
    }
}

impl UiComponent for HistoryPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        let session = &ui_ctx.session;
        if !session.history_available {
            return;
        }

        egui::TopBottomPanel::bottom("history_panel")
            .resizable(true)
            .min_height(40.0)
            .max_height(320.0)
            .default_height(160.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let arrow = if self.show_panel { "⏷" } else { "⏵" };
                    if ui.button(format!("{} 🕘 History", arrow)).clicked() {
                        self.show_panel = !self.show_panel;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("🔄 Refresh").clicked() {
                            ui_ctx.send_event(UiEvent::RefreshHistory);
                        }
                        ui.add_space(10.0);
                        ui.label(
                            RichText::new(format!("{} results", session.history.len()))
                                .color(Color32::GRAY)
                        );
                    });
                });

                if !self.show_panel {
                    return;
                }
                ui.separator();

                egui::ScrollArea::vertical()
                    .id_salt("history")
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        if session.history.is_empty() {
                            ui.centered_and_justified(|ui| {
                                ui.label(
                                    RichText::new("No try-ons yet")
                                        .color(Color32::GRAY)
                                        .size(16.0)
                                );
                            });
                        }

                        for entry in &session.history {
                            self.show_entry_card(ui, ui_ctx, entry);
                        }
                    });
            });
    }

    fn on_app_event(&mut self, event: &AppEvent) {
        // open the list the first time something arrives
        if let AppEvent::HistoryLoaded(entries) = event {
            if !entries.is_empty() {
                self.show_panel = true;
            }
        }
    }
}
