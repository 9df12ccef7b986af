mod http;
#[cfg(test)]
pub mod fake;

pub use http::HttpBackend;

use async_trait::async_trait;
use vt_core::schemas::{ProcessResponse, UploadResponse};
use vt_core::{FeedbackPayload, HistoryEntry, ImageFile, RecordId, UploadResult};
use crate::error::AppError;

/// Remote try-on service.
///
/// Methods return the backend's response bodies as received; checking them
/// for required fields is up to the caller.
#[async_trait]
pub trait TryOnBackend: Send + Sync {
    async fn upload_images(
        &self,
        person: &ImageFile,
        garment: &ImageFile,
        user_id: Option<i64>,
    ) -> Result<UploadResponse, AppError>;

    async fn process_try_on(&self, upload: &UploadResult, user_id: Option<i64>) -> Result<ProcessResponse, AppError>;

    /// Single call doing upload and processing
    async fn upload_and_process(
        &self,
        person: &ImageFile,
        garment: &ImageFile,
        user_id: Option<i64>,
    ) -> Result<ProcessResponse, AppError>;

    /// Stored feedback, generated on first request
    async fn fetch_feedback(&self, result_id: &RecordId) -> Result<FeedbackPayload, AppError>;

    /// Fresh feedback even if some is stored already
    async fn regenerate_feedback(&self, result_id: &RecordId) -> Result<FeedbackPayload, AppError>;

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, AppError>;

    async fn history(&self, user_id: i64) -> Result<Vec<HistoryEntry>, AppError>;

    async fn delete_history(&self, result_id: &RecordId) -> Result<(), AppError>;
}
