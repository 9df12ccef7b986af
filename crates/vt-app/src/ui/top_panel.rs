use egui::{Color32, Context, RichText};
use crate::ui::{status_color, UiComponent, UiContext};

#[derive(Default)]
pub struct TopPanel {}

impl UiComponent for TopPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        let session = &ui_ctx.session;
        let state = session.controller.generation;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("👕 Virtual Try-On");
                ui.separator();
                ui.label(RichText::new("Status:").color(Color32::LIGHT_BLUE));
                ui.label(RichText::new(format!("{} {}", state.icon(), state.label())).color(status_color(state)));

                if session.controller.in_flight {
                    ui.spinner();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format!("Pipeline: {}", session.pipeline.id()))
                            .small()
                            .color(Color32::GRAY)
                    )
                    .on_hover_text(session.pipeline.description());
                });
            });
        });
    }
}
