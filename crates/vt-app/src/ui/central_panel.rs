use egui::{Color32, Context, RichText, Ui};
use vt_core::{Section, SectionKind};
use crate::ui::{fit_image, TextureSlot, UiComponent, UiContext, UiEvent};
use crate::view::{AnalysisView, ResultView};

#[derive(Default)]
pub struct CentralPanel {
    result: TextureSlot,
}

impl CentralPanel {
    fn show_result(&mut self, ui: &mut Ui, ctx: &Context, ui_ctx: &UiContext) {
        let controller = &ui_ctx.session.controller;
        ui.heading("Result");
        ui.separator();

        match &controller.result {
            ResultView::Empty => {
                self.result.clear();
                ui.label(RichText::new("Your try-on will appear here").color(Color32::GRAY));
            }
            ResultView::Loading => {
                let label = if controller.generation.is_in_flight() {
                    controller.generation.label()
                } else {
                    "Loading result..."
                };
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(label);
                });
            }
            ResultView::Image { url, image } => {
                let max = ui.available_size();
                if let Some(texture) = self.result.get(ctx, url, || Some(image.clone())) {
                    fit_image(ui, texture, max);
                }
            }
            ResultView::Error(message) => {
                self.result.clear();
                ui.label(RichText::new(format!("⚠ {}", message)).color(Color32::from_rgb(230, 90, 90)));
            }
        }
    }

    fn show_analysis(ui: &mut Ui, ui_ctx: &UiContext) {
        let controller = &ui_ctx.session.controller;

        ui.horizontal(|ui| {
            ui.heading("Fashion feedback");

            let can_regenerate = !controller.in_flight
                && controller
                    .current
                    .as_ref()
                    .is_some_and(|current| current.result_id.is_some());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(can_regenerate, egui::Button::new("🔄 Regenerate"))
                    .clicked()
                {
                    ui_ctx.send_event(UiEvent::RegenerateFeedback);
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("analysis")
            .auto_shrink([false; 2])
            .show(ui, |ui| match &controller.analysis {
                AnalysisView::Empty => {
                    ui.label(RichText::new("Feedback on the outfit shows up after a try-on").color(Color32::GRAY));
                }
                AnalysisView::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Analysing outfit...");
                    });
                }
                AnalysisView::Sections(sections) => {
                    for section in sections {
                        show_section(ui, section);
                        ui.add_space(8.0);
                    }
                }
                AnalysisView::Unavailable(message) => {
                    ui.label(RichText::new(message).italics().color(Color32::YELLOW));
                }
            });
    }
}

fn show_section(ui: &mut Ui, section: &Section) {
    ui.label(RichText::new(&section.title).strong().size(15.0));

    for line in &section.lines {
        match section.kind {
            SectionKind::Score => ui.label(RichText::new(line).size(20.0).color(Color32::GOLD)),
            SectionKind::Diagnostic => ui.label(RichText::new(line).color(Color32::YELLOW)),
            SectionKind::Raw => ui.label(RichText::new(line).monospace()),
            _ => ui.label(line),
        };
    }
}

impl UiComponent for CentralPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.show_result(&mut columns[0], ctx, ui_ctx);
                Self::show_analysis(&mut columns[1], ui_ctx);
            });
        });
    }
}
