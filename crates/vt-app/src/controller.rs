use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use log::{debug, info, warn};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use uuid::Uuid;
use vt_core::{
    feedback, GenerationState, HistoryEntry, ImageFile, PipelineVariant, RecordId, Transition, TryOnResult,
};
use crate::backend::TryOnBackend;
use crate::error::AppError;
use crate::events::{AppEvent, EventSink};
use crate::notifier::Toast;
use crate::storage::{LocalStore, LAST_RESULT_URL};
use crate::view::{AnalysisView, DecodedImage, ResultView, FEEDBACK_APOLOGY};

const RUN_INTERRUPTED: &str = "The try-on was interrupted, please try again";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateRejected {
    #[error("A try-on is already running")]
    InFlight,

    #[error("There is no try-on result yet")]
    NoResult,
}

/// What the UI reads each frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerSnapshot {
    pub generation: GenerationState,
    pub in_flight: bool,
    pub result: ResultView,
    pub analysis: AnalysisView,
    pub current: Option<TryOnResult>,
}

#[derive(Debug, Default)]
struct Shared {
    generation: GenerationState,
    in_flight: bool,
    /// Bumped whenever the result pane is claimed by a new request
    epoch: u64,
    result: ResultView,
    analysis: AnalysisView,
    current: Option<TryOnResult>,
}

struct ControllerInner {
    backend: Arc<dyn TryOnBackend>,
    sink: Arc<dyn EventSink>,
    store: Arc<LocalStore>,
    pipeline: PipelineVariant,
    user_id: Option<i64>,
    shared: Mutex<Shared>,
}

impl ControllerInner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` to the panes and tells the UI to repaint.
    fn update(&self, f: impl FnOnce(&mut Shared)) {
        f(&mut self.lock());
        self.sink.emit(AppEvent::ViewsChanged);
    }

    fn advance(&self, via: Transition) -> GenerationState {
        let next = {
            let mut shared = self.lock();
            match shared.generation.next(via) {
                Ok(next) => {
                    shared.generation = next;
                    Some(next)
                }
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            }
        };

        match next {
            Some(next) => {
                debug!("Generation state -> {:?}", next);
                self.sink.emit(AppEvent::StateChanged(next));
                next
            }
            None => self.lock().generation,
        }
    }

    fn toast(&self, toast: Toast) {
        self.sink.emit(AppEvent::Toast(toast));
    }
}

/// Holds the single in-flight slot. Released on drop, whatever way the task ends.
struct InFlightGuard {
    inner: Arc<ControllerInner>,
}

impl InFlightGuard {
    /// Must be called with `shared` locked from `inner`.
    fn acquire(inner: &Arc<ControllerInner>, shared: &mut Shared) -> Result<Self, GenerateRejected> {
        if shared.in_flight || shared.generation.is_in_flight() {
            return Err(GenerateRejected::InFlight);
        }
        shared.in_flight = true;

        Ok(Self { inner: inner.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // a run that never reached a stage outcome (panic, runtime shutdown) is failed here
        let aborted = {
            let mut shared = self.inner.lock();
            shared.in_flight = false;

            match shared.generation.next(Transition::Aborted) {
                Ok(next) => {
                    shared.generation = next;
                    shared.result = ResultView::Error(RUN_INTERRUPTED.to_string());
                    shared.analysis = AnalysisView::Empty;
                    Some(next)
                }
                Err(_) => None,
            }
        };

        if let Some(state) = aborted {
            warn!("Try-on task ended mid-run");
            self.inner.sink.emit(AppEvent::StateChanged(state));
            self.inner.toast(Toast::error(RUN_INTERRUPTED));
        }
        self.inner.sink.emit(AppEvent::ViewsChanged);
    }
}

/// Failure of one pipeline stage, with the transition it causes
struct StageFailure {
    via: Transition,
    error: AppError,
}

impl StageFailure {
    fn upload(error: impl Into<AppError>) -> Self {
        Self { via: Transition::UploadFailed, error: error.into() }
    }

    fn process(error: impl Into<AppError>) -> Self {
        Self { via: Transition::ProcessFailed, error: error.into() }
    }
}

/// Sole owner of the generation state and the result/analysis panes.
///
/// Requests start tokio tasks and return immediately; progress reaches the UI
/// through the [`EventSink`].
#[derive(Clone)]
pub struct GenerateController {
    inner: Arc<ControllerInner>,
    runtime: Handle,
}

impl GenerateController {
    pub fn new(
        backend: Arc<dyn TryOnBackend>,
        sink: Arc<dyn EventSink>,
        store: Arc<LocalStore>,
        pipeline: PipelineVariant,
        user_id: Option<i64>,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                backend,
                sink,
                store,
                pipeline,
                user_id,
                shared: Mutex::new(Shared::default()),
            }),
            runtime,
        }
    }

    pub fn pipeline(&self) -> PipelineVariant {
        self.inner.pipeline
    }

    pub fn is_in_flight(&self) -> bool {
        let shared = self.inner.lock();
        shared.in_flight || shared.generation.is_in_flight()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let shared = self.inner.lock();

        ControllerSnapshot {
            generation: shared.generation,
            in_flight: shared.in_flight,
            result: shared.result.clone(),
            analysis: shared.analysis.clone(),
            current: shared.current.clone(),
        }
    }

    /// Starts a try-on run. Rejected without side effects while another
    /// request holds the in-flight slot.
    pub fn handle_generate(
        &self,
        person: ImageFile,
        garment: ImageFile,
    ) -> Result<JoinHandle<GenerationState>, GenerateRejected> {
        let (guard, epoch) = {
            let mut shared = self.inner.lock();
            let next = shared
                .generation
                .next(Transition::Start)
                .map_err(|_| GenerateRejected::InFlight)?;
            let guard = InFlightGuard::acquire(&self.inner, &mut shared)?;

            shared.generation = next;
            shared.epoch += 1;
            shared.result = ResultView::Loading;
            shared.analysis = AnalysisView::Empty;
            shared.current = None;
            (guard, shared.epoch)
        };

        self.inner.sink.emit(AppEvent::StateChanged(GenerationState::Uploading));
        self.inner.sink.emit(AppEvent::ViewsChanged);

        let run_id = Uuid::new_v4();
        let inner = self.inner.clone();
        Ok(self
            .runtime
            .spawn(run_pipeline(inner, guard, epoch, person, garment, run_id)))
    }

    /// Loads the result stored by a previous session into the result pane.
    pub fn rehydrate(&self) -> Option<JoinHandle<()>> {
        let url = self.inner.store.get(LAST_RESULT_URL)?;
        info!("Restoring last result {}", url);

        let epoch = {
            let mut shared = self.inner.lock();
            shared.epoch += 1;
            shared.result = ResultView::Loading;
            shared.epoch
        };
        self.inner.sink.emit(AppEvent::ViewsChanged);

        Some(self.runtime.spawn(load_result_image(self.inner.clone(), url, epoch)))
    }

    /// Shows a past result and its stored feedback. The generation state is left as is.
    pub fn show_history_entry(&self, entry: HistoryEntry) -> Result<JoinHandle<()>, GenerateRejected> {
        let current = TryOnResult {
            result_id: Some(entry.result_id.clone()),
            result_url: entry.result_url.clone(),
            success: true,
        };

        let (guard, epoch) = {
            let mut shared = self.inner.lock();
            let guard = InFlightGuard::acquire(&self.inner, &mut shared)?;
            shared.epoch += 1;
            shared.result = ResultView::Loading;
            shared.analysis = AnalysisView::Loading;
            shared.current = Some(current);
            (guard, shared.epoch)
        };
        self.inner.sink.emit(AppEvent::ViewsChanged);

        let inner = self.inner.clone();
        Ok(self.runtime.spawn(async move {
            let analysis = load_feedback(&inner, Some(&entry.result_id), false).await;
            inner.update(|shared| shared.analysis = analysis);
            drop(guard);

            load_result_image(inner, entry.result_url, epoch).await;
        }))
    }

    /// Asks the backend for fresh feedback on the result currently shown.
    pub fn regenerate_feedback(&self) -> Result<JoinHandle<()>, GenerateRejected> {
        let (guard, result_id) = {
            let mut shared = self.inner.lock();
            let result_id = shared
                .current
                .as_ref()
                .and_then(|current| current.result_id.clone())
                .ok_or(GenerateRejected::NoResult)?;
            let guard = InFlightGuard::acquire(&self.inner, &mut shared)?;
            shared.analysis = AnalysisView::Loading;
            (guard, result_id)
        };
        self.inner.sink.emit(AppEvent::ViewsChanged);

        let inner = self.inner.clone();
        Ok(self.runtime.spawn(async move {
            let analysis = load_feedback(&inner, Some(&result_id), true).await;
            if matches!(analysis, AnalysisView::Sections(_)) {
                inner.toast(Toast::success("Feedback regenerated"));
            }
            inner.update(|shared| shared.analysis = analysis);
            drop(guard);
        }))
    }
}

#[tracing::instrument(skip_all, fields(run_id = %run_id, pipeline = %inner.pipeline))]
async fn run_pipeline(
    inner: Arc<ControllerInner>,
    guard: InFlightGuard,
    epoch: u64,
    person: ImageFile,
    garment: ImageFile,
    run_id: Uuid,
) -> GenerationState {
    info!(
        "Try-on started: {} ({} bytes) + {} ({} bytes)",
        person.file_name,
        person.len(),
        garment.file_name,
        garment.len()
    );

    let processed = match inner.pipeline {
        PipelineVariant::Stepwise => stepwise_process(&inner, &person, &garment).await,
        PipelineVariant::Full => full_process(&inner, &person, &garment).await,
    };

    let result = match processed {
        Ok(result) => result,
        Err(failure) => return fail(&inner, failure),
    };

    inner.advance(Transition::Processed);
    inner.update(|shared| {
        shared.current = Some(result.clone());
        shared.analysis = AnalysisView::Loading;
    });

    let analysis = load_feedback(&inner, result.result_id.as_ref(), false).await;
    let via = match analysis {
        AnalysisView::Sections(_) => Transition::FeedbackResolved,
        _ => Transition::FeedbackFailed,
    };
    inner.update(|shared| shared.analysis = analysis);

    let state = inner.advance(via);
    inner.store.set(LAST_RESULT_URL, &result.result_url);
    drop(guard);

    info!("Try-on finished: {}", result.result_url);
    inner.toast(Toast::success("Try-on complete"));

    load_result_image(inner, result.result_url, epoch).await;
    state
}

async fn stepwise_process(
    inner: &ControllerInner,
    person: &ImageFile,
    garment: &ImageFile,
) -> Result<TryOnResult, StageFailure> {
    let upload = inner
        .backend
        .upload_images(person, garment, inner.user_id)
        .await
        .map_err(StageFailure::upload)?
        .into_upload_result()
        .map_err(StageFailure::upload)?;
    debug!("Uploaded person={} clothing={}", upload.person_id, upload.clothing_id);
    inner.advance(Transition::Uploaded);

    inner
        .backend
        .process_try_on(&upload, inner.user_id)
        .await
        .map_err(StageFailure::process)?
        .into_try_on_result()
        .map_err(StageFailure::process)
}

async fn full_process(
    inner: &ControllerInner,
    person: &ImageFile,
    garment: &ImageFile,
) -> Result<TryOnResult, StageFailure> {
    let result = inner
        .backend
        .upload_and_process(person, garment, inner.user_id)
        .await
        .map_err(StageFailure::upload)?
        .into_combined_result()
        .map_err(StageFailure::upload)?;
    inner.advance(Transition::Uploaded);

    Ok(result)
}

fn fail(inner: &ControllerInner, failure: StageFailure) -> GenerationState {
    let message = failure.error.to_string();
    warn!("Try-on failed: {}", message);

    let state = inner.advance(failure.via);
    inner.update(|shared| {
        shared.result = ResultView::Error(message.clone());
        shared.analysis = AnalysisView::Empty;
    });
    inner.toast(Toast::error(message));

    state
}

/// Feedback for `result_id`. Any failure ends in the apology, never an error.
async fn load_feedback(inner: &ControllerInner, result_id: Option<&RecordId>, regenerate: bool) -> AnalysisView {
    let Some(result_id) = result_id else {
        warn!("No result id returned, skipping feedback");
        return AnalysisView::Unavailable(FEEDBACK_APOLOGY.to_string());
    };

    let payload = if regenerate {
        inner.backend.regenerate_feedback(result_id).await
    } else {
        inner.backend.fetch_feedback(result_id).await
    };

    match payload {
        Ok(payload) => AnalysisView::Sections(feedback::format(&payload)),
        Err(e) => {
            warn!("Feedback for result {} unavailable: {}", result_id, e);
            if regenerate {
                inner.toast(Toast::error(e.to_string()));
            }
            AnalysisView::Unavailable(FEEDBACK_APOLOGY.to_string())
        }
    }
}

/// Fetches and decodes the result image. Dropped if a newer request owns the pane by then.
async fn load_result_image(inner: Arc<ControllerInner>, url: String, epoch: u64) {
    let loaded = match inner.backend.fetch_image(&url).await {
        Ok(bytes) => match tokio::task::spawn_blocking(move || DecodedImage::decode(&bytes)).await {
            Ok(decoded) => decoded,
            Err(e) => Err(AppError::from(e)),
        },
        Err(e) => Err(e),
    };

    let view = match loaded {
        Ok(image) => ResultView::Image { url: url.clone(), image },
        Err(e) => {
            warn!("Could not load result image {}: {}", url, e);
            ResultView::Error(format!("Could not load the result image: {}", e))
        }
    };

    {
        let mut shared = inner.lock();
        if shared.epoch != epoch {
            debug!("Discarding stale image {}", url);
            return;
        }
        shared.result = view;
    }
    inner.sink.emit(AppEvent::ViewsChanged);
}
