use std::path::PathBuf;
use std::time::Instant;
use log::{debug, warn};
use tokio::task::JoinHandle;
use vt_core::{GenerationState, HistoryEntry, ImageRole, PipelineVariant, RecordId};
use crate::controller::{ControllerSnapshot, GenerateController};
use crate::events::AppEvent;
use crate::history::HistoryService;
use crate::intake::{FileIntake, SelectionState};
use crate::notifier::{Notifier, Toast};

pub const MISSING_FILES: &str = "Please select both a person image and a garment image";

/// Everything the panels draw in one frame
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub selection: SelectionState,
    pub can_generate: bool,
    pub controller: ControllerSnapshot,
    pub history: Vec<HistoryEntry>,
    pub history_available: bool,
    pub toasts: Vec<Toast>,
    pub pipeline: PipelineVariant,
}

/// One user session: file intake, the generate controller, history and toasts.
pub struct Workflow {
    intake: FileIntake,
    controller: GenerateController,
    history: HistoryService,
    notifier: Notifier,
    entries: Vec<HistoryEntry>,
}

impl Workflow {
    pub fn new(intake: FileIntake, controller: GenerateController, history: HistoryService, notifier: Notifier) -> Self {
        Self {
            intake,
            controller,
            history,
            notifier,
            entries: Vec::new(),
        }
    }

    /// Restores the last result and fetches the history list.
    pub fn start(&mut self) {
        self.controller.rehydrate();
        if self.history.is_available() {
            self.history.refresh();
        }
    }

    pub fn select_files(&mut self, role: ImageRole, paths: &[PathBuf]) {
        match self.intake.on_file_selected(role, paths) {
            Ok(Some(preview)) => debug!("{} image selected, preview {}", role.name(), preview.display()),
            Ok(None) => {}
            Err(e) => {
                warn!("Could not read {} image: {}", role.slug(), e);
                self.notifier.notify(Toast::error(format!("Could not read {} image: {}", role.slug(), e)));
            }
        }
    }

    pub fn can_generate(&self) -> bool {
        self.intake.selection().is_ready() && !self.controller.is_in_flight()
    }

    /// Starts a run when both files are picked. Requests made while a run is
    /// going are dropped without notice.
    pub fn generate(&mut self) -> Option<JoinHandle<GenerationState>> {
        let Some((person, garment)) = self.intake.selection().ready_files() else {
            self.notifier.notify(Toast::error(MISSING_FILES));
            return None;
        };

        match self.controller.handle_generate(person, garment) {
            Ok(handle) => Some(handle),
            Err(rejected) => {
                debug!("Generate ignored: {}", rejected);
                None
            }
        }
    }

    pub fn show_history_entry(&mut self, entry: HistoryEntry) {
        if let Err(rejected) = self.controller.show_history_entry(entry) {
            debug!("History view ignored: {}", rejected);
        }
    }

    pub fn regenerate_feedback(&mut self) {
        if let Err(rejected) = self.controller.regenerate_feedback() {
            self.notifier.notify(Toast::info(rejected.to_string()));
        }
    }

    pub fn refresh_history(&mut self) {
        self.history.refresh();
    }

    pub fn delete_history(&mut self, result_id: RecordId) {
        self.history.delete(result_id);
    }

    pub fn on_app_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Toast(toast) => self.notifier.notify(toast.clone()),
            AppEvent::HistoryLoaded(entries) => self.entries = entries.clone(),
            AppEvent::HistoryDeleted(result_id) => self.entries.retain(|entry| &entry.result_id != result_id),
            AppEvent::StateChanged(GenerationState::Done) if self.history.is_available() => {
                self.history.refresh();
            }
            AppEvent::StateChanged(_) | AppEvent::ViewsChanged => {}
        }
    }

    pub fn has_toasts(&self) -> bool {
        !self.notifier.is_empty()
    }

    pub fn view(&mut self, now: Instant) -> SessionView {
        SessionView {
            selection: self.intake.selection().clone(),
            can_generate: self.can_generate(),
            controller: self.controller.snapshot(),
            history: self.entries.clone(),
            history_available: self.history.is_available(),
            toasts: self.notifier.active(now),
            pipeline: self.controller.pipeline(),
        }
    }
}
