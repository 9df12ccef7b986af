use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use async_trait::async_trait;
use serde_json::json;
use vt_core::schemas::{ProcessResponse, UploadResponse};
use vt_core::{FeedbackPayload, HistoryEntry, ImageFile, RecordId, UploadResult};
use crate::backend::TryOnBackend;
use crate::error::AppError;

/// Scripted in-memory backend that records the calls it receives.
pub struct FakeBackend {
    pub upload: Result<UploadResponse, AppError>,
    pub process: Result<ProcessResponse, AppError>,
    pub combined: Result<ProcessResponse, AppError>,
    /// `None` answers the feedback endpoints with a 404
    pub feedback: Option<FeedbackPayload>,
    /// `None` answers image fetches with a 404
    pub image: Option<Vec<u8>>,
    pub history: Vec<HistoryEntry>,
    /// Makes the next upload call panic instead of answering
    pub panic_on_upload: AtomicBool,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeBackend {
    pub fn happy() -> Self {
        let process = ProcessResponse {
            success: Some(true),
            result_id: Some(RecordId::new("77")),
            result_url: Some("https://cdn.test/result-77.png".to_string()),
            message: None,
        };

        Self {
            upload: Ok(UploadResponse {
                person_id: Some(RecordId::new("1")),
                clothing_id: Some(RecordId::new("2")),
                person_url: None,
                clothing_url: None,
            }),
            process: Ok(process.clone()),
            combined: Ok(process),
            feedback: Some(FeedbackPayload::structured(json!({
                "feedback": "Nice fit",
                "recommendations": ["Try a belt"],
                "overall_score": 8,
            }))),
            image: Some(crate::view::png_bytes(2, 2)),
            history: Vec::new(),
            panic_on_upload: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log().into_iter().map(|(name, _)| name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == name).count()
    }

    /// Arguments of every `name` call, in call order
    pub fn args(&self, name: &str) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|(call, _)| call == name)
            .map(|(_, args)| args)
            .collect()
    }

    fn log(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, name: &str, args: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), args));
    }

    fn not_found(what: &str) -> AppError {
        AppError::Backend {
            status: 404,
            message: format!("{} not found", what),
        }
    }
}

// AppError is not Clone, so scripted failures are rebuilt on every call
fn replay<T: Clone>(scripted: &Result<T, AppError>) -> Result<T, AppError> {
    match scripted {
        Ok(value) => Ok(value.clone()),
        Err(AppError::Backend { status, message }) => Err(AppError::Backend {
            status: *status,
            message: message.clone(),
        }),
        Err(other) => Err(AppError::Config(other.to_string())),
    }
}

fn user(user_id: Option<i64>) -> String {
    user_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

#[async_trait]
impl TryOnBackend for FakeBackend {
    async fn upload_images(
        &self,
        person: &ImageFile,
        garment: &ImageFile,
        user_id: Option<i64>,
    ) -> Result<UploadResponse, AppError> {
        self.record("upload", format!("{} {} user={}", person.file_name, garment.file_name, user(user_id)));
        if self.panic_on_upload.swap(false, Ordering::SeqCst) {
            panic!("upload handler crashed");
        }
        replay(&self.upload)
    }

    async fn process_try_on(&self, upload: &UploadResult, user_id: Option<i64>) -> Result<ProcessResponse, AppError> {
        self.record(
            "process",
            format!("person={} clothing={} user={}", upload.person_id, upload.clothing_id, user(user_id)),
        );
        replay(&self.process)
    }

    async fn upload_and_process(
        &self,
        person: &ImageFile,
        garment: &ImageFile,
        user_id: Option<i64>,
    ) -> Result<ProcessResponse, AppError> {
        self.record("combined", format!("{} {} user={}", person.file_name, garment.file_name, user(user_id)));
        replay(&self.combined)
    }

    async fn fetch_feedback(&self, result_id: &RecordId) -> Result<FeedbackPayload, AppError> {
        self.record("feedback", result_id.to_string());
        self.feedback.clone().ok_or_else(|| Self::not_found("feedback"))
    }

    async fn regenerate_feedback(&self, result_id: &RecordId) -> Result<FeedbackPayload, AppError> {
        self.record("regenerate", result_id.to_string());
        self.feedback.clone().ok_or_else(|| Self::not_found("feedback"))
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, AppError> {
        self.record("image", url.to_string());
        self.image.clone().ok_or_else(|| Self::not_found("image"))
    }

    async fn history(&self, user_id: i64) -> Result<Vec<HistoryEntry>, AppError> {
        self.record("history", user_id.to_string());
        Ok(self.history.clone())
    }

    async fn delete_history(&self, result_id: &RecordId) -> Result<(), AppError> {
        self.record("delete", result_id.to_string());
        Ok(())
    }
}
