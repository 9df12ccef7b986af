use std::sync::{mpsc, Mutex, PoisonError};
use winit::event_loop::EventLoopProxy;
use vt_core::{GenerationState, HistoryEntry, RecordId};
use crate::notifier::Toast;
use crate::ui::UiEvent;

#[derive(Debug, Clone)]
pub enum TryOnEvent {
    Ui(UiEvent),
    App(AppEvent),
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    StateChanged(GenerationState),
    /// Result or analysis pane changed
    ViewsChanged,
    Toast(Toast),
    HistoryLoaded(Vec<HistoryEntry>),
    HistoryDeleted(RecordId),
}

/// Fire-and-forget channel from background tasks to the UI
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AppEvent);
}

impl EventSink for mpsc::Sender<AppEvent> {
    fn emit(&self, event: AppEvent) {
        let _ = self.send(event);
    }
}

/// Wakes the winit event loop with [`TryOnEvent::App`]
pub struct ProxySink {
    proxy: Mutex<EventLoopProxy<TryOnEvent>>,
}

impl ProxySink {
    pub fn new(proxy: EventLoopProxy<TryOnEvent>) -> Self {
        Self { proxy: Mutex::new(proxy) }
    }
}

impl EventSink for ProxySink {
    fn emit(&self, event: AppEvent) {
        let proxy = self.proxy.lock().unwrap_or_else(PoisonError::into_inner);
        // the loop is gone during shutdown
        let _ = proxy.send_event(TryOnEvent::App(event));
    }
}
