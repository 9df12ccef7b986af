use std::sync::Arc;
use std::time::Instant;
use log::error;
use tokio::runtime::Handle;
use winit::{
    event::*,
    event_loop::ActiveEventLoop,
};
use winit::application::ApplicationHandler;
use winit::event_loop::{ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{WindowAttributes, WindowId};
use crate::config::AppConfig;
use crate::events::TryOnEvent;
use crate::state::AppState;

pub struct App {
    event_loop_proxy: Arc<EventLoopProxy<TryOnEvent>>,
    config: AppConfig,
    runtime: Handle,
    state: Option<AppState>,
}

impl App {
    pub fn new(event_loop: &EventLoop<TryOnEvent>, config: AppConfig, runtime: Handle) -> Self {
        let event_loop_proxy = Arc::new(event_loop.create_proxy());

        Self {
            event_loop_proxy,
            config,
            runtime,
            state: None,
        }
    }

    fn init_state(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let window_attributes = WindowAttributes::default()
            .with_title("Virtual Try-On")
            .with_inner_size(winit::dpi::LogicalSize::new(1400.0, 900.0));

        let window = Arc::new(event_loop.create_window(window_attributes)?);

        pollster::block_on(AppState::new(
            window,
            self.event_loop_proxy.clone(),
            &self.config,
            self.runtime.clone(),
        ))
    }
}

impl ApplicationHandler<TryOnEvent> for App {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let (StartCause::ResumeTimeReached { .. }, Some(state)) = (cause, &self.state) {
            state.window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match self.init_state(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                error!("Could not start the UI: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: TryOnEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            TryOnEvent::Ui(e) => state.on_ui_event(e),
            TryOnEvent::App(e) => state.on_app_event(e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        if state.window.id() != window_id {
            return;
        }

        // Let egui handle the event first
        let response = state.ui.egui_state.on_window_event(&state.window, &event);

        if response.repaint {
            state.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                state.resize(physical_size);
                state.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.render() {
                    error!("Render failed: {:#}", e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &self.state else {
            return;
        };

        match state.next_frame_in() {
            Some(delay) if delay.is_zero() => {
                state.window.request_redraw();
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Some(delay) => event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + delay)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
