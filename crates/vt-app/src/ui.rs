mod top_panel;
mod side_panel;
mod central_panel;
mod history_panel;
mod toasts;

pub use top_panel::TopPanel;
pub use side_panel::SidePanel;
pub use central_panel::CentralPanel;
pub use history_panel::HistoryPanel;
pub use toasts::ToastOverlay;

use std::path::PathBuf;
use std::sync::Arc;
use egui::{Color32, ColorImage, Context, TextureHandle, TextureOptions};
use log::warn;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;
use vt_core::{GenerationState, HistoryEntry, ImageRole, RecordId};
use crate::events::{AppEvent, TryOnEvent};
use crate::gfx::GfxState;
use crate::view::DecodedImage;
use crate::workflow::SessionView;

#[derive(Debug, Clone)]
pub enum UiEvent {
    FileSelected {
        role: ImageRole,
        paths: Vec<PathBuf>,
    },
    Generate,
    RegenerateFeedback,

    // History
    RefreshHistory,
    ShowHistoryEntry(HistoryEntry),
    DeleteHistory(RecordId),
}

pub struct UiContext {
    pub session: SessionView,
    pub event_loop_proxy: Arc<EventLoopProxy<TryOnEvent>>,
}

impl UiContext {
    pub fn new(event_loop_proxy: Arc<EventLoopProxy<TryOnEvent>>) -> Self {
        Self {
            session: SessionView::default(),
            event_loop_proxy,
        }
    }

    pub fn send_event(&self, event: UiEvent) {
        if let Err(e) = self.event_loop_proxy.send_event(TryOnEvent::Ui(event)) {
            warn!("Event loop closed, dropping {:?}", e.0);
        }
    }
}

pub struct UiState {
    pub(crate) egui_state: egui_winit::State,
    pub(crate) egui_ctx: egui::Context,
    pub(crate) egui_renderer: egui_wgpu::Renderer,

    components: Vec<Box<dyn UiComponent>>,
    pub(crate) ui_ctx: UiContext,
}

impl UiState {
    pub fn new(gfx: &GfxState, window: Arc<Window>, event_loop_proxy: Arc<EventLoopProxy<TryOnEvent>>) -> Self {
        let egui_ctx = egui::Context::default();
        apply_style(&egui_ctx);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gfx.device, gfx.config.format, egui_wgpu::RendererOptions::default());

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            components: Vec::new(),
            ui_ctx: UiContext::new(event_loop_proxy),
        }
    }

    pub fn draw(&mut self, window: &Window) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(window);

        self.egui_ctx.run(raw_input, |ctx| {
            for component in self.components.iter_mut() {
                component.show(ctx, &self.ui_ctx);
            }
        })
    }

    pub fn add_component(&mut self, component: Box<dyn UiComponent>) {
        self.components.push(component);
    }

    pub fn set_session(&mut self, session: SessionView) {
        self.ui_ctx.session = session;
    }

    pub fn on_app_event(&mut self, event: &AppEvent) {
        for component in self.components.iter_mut() {
            component.on_app_event(event);
        }
    }
}

/// Slightly larger default text; the window is mostly read, not edited.
fn apply_style(ctx: &Context) {
    ctx.style_mut(|style| {
        for font in style.text_styles.values_mut() {
            font.size *= 1.1;
        }
    });
}

pub trait UiComponent {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext);

    fn on_app_event(&mut self, _event: &AppEvent) {}
}

pub fn status_color(state: GenerationState) -> Color32 {
    match state {
        GenerationState::Idle => Color32::GRAY,
        GenerationState::Uploading | GenerationState::Processing | GenerationState::AwaitingFeedback => {
            Color32::LIGHT_BLUE
        }
        GenerationState::Done => Color32::LIGHT_GREEN,
        GenerationState::Failed => Color32::from_rgb(230, 90, 90),
    }
}

/// One egui texture that follows a changing source, reloaded only when its key changes.
#[derive(Default)]
pub struct TextureSlot {
    key: Option<String>,
    texture: Option<TextureHandle>,
}

impl TextureSlot {
    pub fn get(
        &mut self,
        ctx: &Context,
        key: &str,
        load: impl FnOnce() -> Option<DecodedImage>,
    ) -> Option<&TextureHandle> {
        if self.key.as_deref() != Some(key) {
            self.key = Some(key.to_string());
            self.texture = load().map(|image| {
                let pixels = ColorImage::from_rgba_unmultiplied(
                    [image.width as usize, image.height as usize],
                    &image.rgba,
                );
                ctx.load_texture(key, pixels, TextureOptions::LINEAR)
            });
        }
        self.texture.as_ref()
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.texture = None;
    }
}

/// Draws `texture` scaled down to fit `max`, keeping its aspect ratio.
pub fn fit_image(ui: &mut egui::Ui, texture: &TextureHandle, max: egui::Vec2) -> egui::Response {
    let size = texture.size_vec2();
    let scale = (max.x / size.x).min(max.y / size.y).min(1.0);
    ui.add(egui::Image::new((texture.id(), size * scale)))
}
