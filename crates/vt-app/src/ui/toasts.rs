use egui::{Color32, Context, RichText};
use crate::notifier::ToastKind;
use crate::ui::{UiComponent, UiContext};

#[derive(Default)]
pub struct ToastOverlay {}

fn toast_color(kind: ToastKind) -> Color32 {
    match kind {
        ToastKind::Info => Color32::from_rgb(30, 50, 80),
        ToastKind::Success => Color32::from_rgb(30, 70, 40),
        ToastKind::Error => Color32::from_rgb(90, 30, 30),
    }
}

impl UiComponent for ToastOverlay {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        let toasts = &ui_ctx.session.toasts;
        if toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 48.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                for toast in toasts {
                    egui::Frame::new()
                        .fill(toast_color(toast.kind))
                        .corner_radius(5.0)
                        .inner_margin(10.0)
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.label(RichText::new(format!("{} {}", toast.icon(), toast.message)).color(Color32::WHITE));
                        });
                    ui.add_space(6.0);
                }
            });
    }
}
