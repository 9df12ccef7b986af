use std::sync::Arc;
use std::time::{Duration, Instant};
use egui_wgpu::wgpu;
use egui_wgpu::wgpu::StoreOp;
use log::{info, warn};
use tokio::runtime::Handle;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;
use crate::backend::HttpBackend;
use crate::config::AppConfig;
use crate::controller::GenerateController;
use crate::events::{AppEvent, ProxySink, TryOnEvent};
use crate::gfx::GfxState;
use crate::history::HistoryService;
use crate::intake::FileIntake;
use crate::notifier::Notifier;
use crate::storage::LocalStore;
use crate::ui;
use crate::ui::{UiEvent, UiState};
use crate::workflow::Workflow;

/// Redraw cadence while toasts are on screen, so they disappear on time.
const TOAST_TICK: Duration = Duration::from_millis(250);

pub struct AppState {
    pub(crate) window: Arc<Window>,

    pub gfx: GfxState,
    pub ui: UiState,

    workflow: Workflow,
    repaint_delay: Duration,
}

impl AppState {
    pub async fn new(
        window: Arc<Window>,
        event_loop_proxy: Arc<EventLoopProxy<TryOnEvent>>,
        config: &AppConfig,
        runtime: Handle,
    ) -> anyhow::Result<Self> {
        let workflow = build_workflow(config, (*event_loop_proxy).clone(), runtime)?;

        let gfx = GfxState::new(window.clone()).await?;
        let mut ui_state = UiState::new(&gfx, window.clone(), event_loop_proxy);

        // the central panel takes whatever space is left, so it goes last
        ui_state.add_component(Box::new(ui::TopPanel::default()));
        ui_state.add_component(Box::new(ui::SidePanel::default()));
        ui_state.add_component(Box::new(ui::HistoryPanel::default()));
        ui_state.add_component(Box::new(ui::CentralPanel::default()));
        ui_state.add_component(Box::new(ui::ToastOverlay::default()));

        let mut state = Self {
            window,
            gfx,
            ui: ui_state,
            workflow,
            repaint_delay: Duration::ZERO,
        };
        state.workflow.start();

        Ok(state)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gfx.resize(new_size);
    }

    /// How long until the next frame is wanted. `None` means only on input.
    pub fn next_frame_in(&self) -> Option<Duration> {
        let egui_delay = (self.repaint_delay < Duration::MAX).then_some(self.repaint_delay);
        let toast_delay = self.workflow.has_toasts().then_some(TOAST_TICK);

        match (egui_delay, toast_delay) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let output = match self.gfx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gfx.reconfigure();
                self.window.request_redraw();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gfx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder")
        });

        // UI
        self.ui.set_session(self.workflow.view(Instant::now()));
        let full_output = self.ui.draw(&self.window);

        self.repaint_delay = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map(|viewport| viewport.repaint_delay)
            .unwrap_or(Duration::MAX);

        let platform_output = full_output.platform_output.clone();
        self.ui.egui_state.handle_platform_output(&self.window, platform_output);

        let shapes = full_output.shapes.clone();
        let pixels_per_point = full_output.pixels_per_point;
        let paint_jobs = self.ui.egui_ctx.tessellate(shapes, pixels_per_point);

        let screen_desc = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.ui.egui_renderer.update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }

        let user_cmds = self.ui.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            &paint_jobs,
            &screen_desc,
        );

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            self.ui.egui_renderer.render(&mut rpass.forget_lifetime(), &paint_jobs, &screen_desc);
        }

        for id in &full_output.textures_delta.free {
            self.ui.egui_renderer.free_texture(id);
        }

        self.gfx
            .queue
            .submit(user_cmds.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }

    pub fn on_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::FileSelected { role, paths } => {
                self.workflow.select_files(role, &paths);
            }
            UiEvent::Generate => {
                if self.workflow.generate().is_some() {
                    info!("Try-on requested");
                }
            }
            UiEvent::RegenerateFeedback => {
                self.workflow.regenerate_feedback();
            }
            UiEvent::RefreshHistory => {
                self.workflow.refresh_history();
            }
            UiEvent::ShowHistoryEntry(entry) => {
                self.workflow.show_history_entry(entry);
            }
            UiEvent::DeleteHistory(result_id) => {
                self.workflow.delete_history(result_id);
            }
        }

        self.window.request_redraw();
    }

    /// Progress from background tasks
    pub fn on_app_event(&mut self, event: AppEvent) {
        self.workflow.on_app_event(&event);
        self.ui.on_app_event(&event);
        self.window.request_redraw();
    }
}

fn build_workflow(config: &AppConfig, proxy: EventLoopProxy<TryOnEvent>, runtime: Handle) -> anyhow::Result<Workflow> {
    info!(
        "Backend {} ({} pipeline), storage in {}",
        config.api_base_url,
        config.pipeline,
        config.storage_dir.display()
    );
    if config.user_id.is_none() {
        warn!("TRYON_USER_ID is not set, history is disabled");
    }

    let store = Arc::new(LocalStore::open(config.local_storage_path()));
    let backend = Arc::new(HttpBackend::new(config.api_base_url.clone())?);
    let sink = Arc::new(ProxySink::new(proxy));

    let intake = FileIntake::new(store.clone(), config.previews_dir());
    let controller = GenerateController::new(
        backend.clone(),
        sink.clone(),
        store,
        config.pipeline,
        config.user_id,
        runtime.clone(),
    );
    let history = HistoryService::new(backend, sink, config.user_id, runtime);

    Ok(Workflow::new(intake, controller, history, Notifier::new(config.toast_duration)))
}
