mod app;
mod state;
mod ui;
mod events;
mod gfx;
mod error;
mod config;
mod storage;
mod intake;
mod dropzone;
mod notifier;
mod view;
mod backend;
mod controller;
mod history;
mod workflow;

use log::info;
use tokio::runtime::Handle;
use winit::event_loop::{ControlFlow, EventLoop};
use crate::config::AppConfig;
use crate::events::TryOnEvent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load()?;
    info!("Starting virtual try-on client");

    let event_loop: EventLoop<TryOnEvent> = EventLoop::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = app::App::new(&event_loop, config, Handle::current());
    event_loop.run_app(&mut app)?;

    Ok(())
}
