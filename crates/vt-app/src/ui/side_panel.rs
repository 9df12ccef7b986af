use std::path::PathBuf;
use egui::{Color32, Context, Rect, RichText, Sense, Stroke, Ui};
use log::debug;
use vt_core::ImageRole;
use crate::dropzone::{drop_target, DropZone};
use crate::ui::{fit_image, TextureSlot, UiComponent, UiContext, UiEvent};
use crate::view::DecodedImage;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "bmp"];
const ZONE_HEIGHT: f32 = 200.0;

struct Zone {
    dropzone: DropZone,
    preview: TextureSlot,
    rect: Option<Rect>,
}

impl Zone {
    fn new(role: ImageRole) -> Self {
        Self {
            dropzone: DropZone::new(role),
            preview: TextureSlot::default(),
            rect: None,
        }
    }
}

pub struct SidePanel {
    zones: Vec<Zone>,
}

impl Default for SidePanel {
    fn default() -> Self {
        Self {
            zones: ImageRole::all().into_iter().map(Zone::new).collect(),
        }
    }
}

impl SidePanel {
    fn show_zone(ui: &mut Ui, ctx: &Context, ui_ctx: &UiContext, zone: &mut Zone) {
        let role = zone.dropzone.role();
        let selection = &ui_ctx.session.selection;
        let confirmed = selection.file(role).is_some();

        ui.label(RichText::new(format!("{} {} image", role.icon(), role.name())).strong());

        let (fill, stroke) = if zone.dropzone.is_active() {
            (Color32::from_rgb(30, 50, 80), Stroke::new(2.0, Color32::LIGHT_BLUE))
        } else if confirmed {
            (Color32::from_gray(30), Stroke::new(1.0, Color32::LIGHT_GREEN))
        } else {
            (Color32::from_gray(30), Stroke::new(1.0, Color32::from_gray(60)))
        };

        let frame = egui::Frame::new()
            .fill(fill)
            .corner_radius(6.0)
            .inner_margin(10.0)
            .stroke(stroke)
            .show(ui, |ui| {
                ui.set_min_size(egui::vec2(ui.available_width(), ZONE_HEIGHT));

                ui.vertical_centered(|ui| {
                    let Some(preview) = selection.preview(role) else {
                        zone.preview.clear();
                        ui.add_space(ZONE_HEIGHT / 3.0);
                        ui.label(RichText::new("Drop an image here").color(Color32::GRAY));
                        ui.label(RichText::new("or click to browse").small().color(Color32::GRAY));
                        return;
                    };

                    let key = preview.to_string_lossy();
                    let texture = zone.preview.get(ctx, &key, || {
                        std::fs::read(preview)
                            .ok()
                            .and_then(|bytes| DecodedImage::decode(&bytes).ok())
                    });

                    match texture {
                        Some(texture) => {
                            let max = egui::vec2(ui.available_width(), ZONE_HEIGHT - 30.0);
                            fit_image(ui, texture, max);
                        }
                        None => {
                            ui.label(RichText::new("Preview unavailable").color(Color32::GRAY));
                        }
                    }

                    match selection.file(role) {
                        Some(file) => ui.label(RichText::new(format!("✔ {}", file.file_name)).color(Color32::LIGHT_GREEN)),
                        None => ui.label(
                            RichText::new("Select this image again to generate")
                                .small()
                                .color(Color32::YELLOW)
                        ),
                    };
                });
            });

        let response = frame.response.interact(Sense::click());
        zone.rect = Some(response.rect);

        if response.on_hover_text("Click to choose a file").clicked() {
            let picked = rfd::FileDialog::new()
                .set_title(format!("Choose the {} image", role.slug()))
                .add_filter("Images", &IMAGE_EXTENSIONS)
                .pick_file();

            if let Some(path) = picked {
                ui_ctx.send_event(zone.dropzone.pick(path));
            }
        }
    }

    /// Hover highlighting and routing of files dropped on the window.
    fn handle_drag_and_drop(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        let (hovering, dropped, pointer) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
                i.pointer.hover_pos(),
            )
        });

        let pointer_over = pointer.and_then(|pos| {
            self.zones
                .iter()
                .find(|zone| zone.rect.is_some_and(|rect| rect.contains(pos)))
                .map(|zone| zone.dropzone.role())
        });

        for zone in self.zones.iter_mut() {
            zone.dropzone
                .track_hover(hovering && pointer_over == Some(zone.dropzone.role()));
        }

        if dropped.is_empty() {
            return;
        }
        ctx.input_mut(|i| i.raw.dropped_files.clear());

        let paths: Vec<PathBuf> = dropped.into_iter().filter_map(|file| file.path).collect();
        let selection = &ui_ctx.session.selection;
        let target = drop_target(pointer_over, pointer.is_some(), |role| selection.file(role).is_some());

        for zone in self.zones.iter_mut() {
            if Some(zone.dropzone.role()) == target {
                if let Some(event) = zone.dropzone.drop_files(&paths) {
                    ui_ctx.send_event(event);
                }
            } else {
                zone.dropzone.drag_leave();
            }
        }

        if target.is_none() {
            debug!("Ignoring drop of {} file(s) outside the drop zones", paths.len());
        }
    }
}

impl UiComponent for SidePanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        self.handle_drag_and_drop(ctx, ui_ctx);

        egui::SidePanel::left("side_panel")
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.heading("Your images");
                ui.separator();

                for zone in self.zones.iter_mut() {
                    Self::show_zone(ui, ctx, ui_ctx, zone);
                    ui.add_space(8.0);
                }

                ui.separator();

                let generate_button = ui.add_enabled(
                    ui_ctx.session.can_generate,
                    egui::Button::new(RichText::new("✨ Generate try-on").size(14.0))
                        .min_size(egui::vec2(ui.available_width(), 30.0))
                );

                if generate_button.clicked() {
                    ui_ctx.send_event(UiEvent::Generate);
                }

                if !ui_ctx.session.selection.is_ready() {
                    ui.label(
                        RichText::new("Pick a person photo and a garment to start")
                            .small()
                            .color(Color32::GRAY)
                    );
                }
            });
    }
}
