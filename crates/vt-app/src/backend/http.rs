use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use vt_core::schemas::{ErrorResponse, FeedbackResponse, HistoryResponse, ProcessResponse, UploadResponse};
use vt_core::{CoreError, FeedbackPayload, HistoryEntry, ImageFile, ImageRole, RecordId, UploadResult};
use crate::backend::TryOnBackend;
use crate::error::AppError;

const UPLOAD_PATH: &str = "/api/upload/images";
const PROCESS_PATH: &str = "/api/try-on/process";
const COMBINED_PATH: &str = "/api/try-on";
const FEEDBACK_PATH: &str = "/api/feedback";
const HISTORY_PATH: &str = "/api/history";

/// Client for the try-on REST API. No request timeout is set.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Result URLs are usually absolute CDN links; anything else is relative to the API.
    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }

    fn image_form(person: &ImageFile, garment: &ImageFile, user_id: Option<i64>) -> Result<Form, AppError> {
        let mut form = Form::new()
            .part(ImageRole::Person.form_field().to_string(), Self::image_part(person)?)
            .part(ImageRole::Garment.form_field().to_string(), Self::image_part(garment)?);

        if let Some(user_id) = user_id {
            form = form.text("user_id", user_id.to_string());
        }

        Ok(form)
    }

    fn image_part(file: &ImageFile) -> Result<Part, AppError> {
        Ok(Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(file.mime())?)
    }

    async fn checked(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => error.message(),
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
            Err(_) => body,
        };

        Err(AppError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    /// A 2xx body that does not decode is a bad response, not a transport failure.
    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let body = Self::checked(response).await?.bytes().await?;
        serde_json::from_slice::<T>(&body).map_err(|e| AppError::Response(CoreError::MalformedBody(e.to_string())))
    }
}

#[async_trait]
impl TryOnBackend for HttpBackend {
    async fn upload_images(
        &self,
        person: &ImageFile,
        garment: &ImageFile,
        user_id: Option<i64>,
    ) -> Result<UploadResponse, AppError> {
        let url = self.url(UPLOAD_PATH);
        debug!("POST {} ({} + {} bytes)", url, person.len(), garment.len());

        let form = Self::image_form(person, garment, user_id)?;
        let response = self.client.post(url).multipart(form).send().await?;
        Self::json(response).await
    }

    async fn process_try_on(&self, upload: &UploadResult, user_id: Option<i64>) -> Result<ProcessResponse, AppError> {
        let url = self.url(PROCESS_PATH);
        debug!("POST {} person={} clothing={}", url, upload.person_id, upload.clothing_id);

        let mut fields = vec![
            ("person_id", upload.person_id.to_string()),
            ("clothing_id", upload.clothing_id.to_string()),
        ];
        if let Some(user_id) = user_id {
            fields.push(("user_id", user_id.to_string()));
        }

        let response = self.client.post(url).form(&fields).send().await?;
        Self::json(response).await
    }

    async fn upload_and_process(
        &self,
        person: &ImageFile,
        garment: &ImageFile,
        user_id: Option<i64>,
    ) -> Result<ProcessResponse, AppError> {
        let url = self.url(COMBINED_PATH);
        debug!("POST {} ({} + {} bytes)", url, person.len(), garment.len());

        let form = Self::image_form(person, garment, user_id)?;
        let response = self.client.post(url).multipart(form).send().await?;
        Self::json(response).await
    }

    async fn fetch_feedback(&self, result_id: &RecordId) -> Result<FeedbackPayload, AppError> {
        let url = self.url(&format!("{}/{}", FEEDBACK_PATH, result_id));
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let body: FeedbackResponse = Self::json(response).await?;
        Ok(body.into_payload())
    }

    async fn regenerate_feedback(&self, result_id: &RecordId) -> Result<FeedbackPayload, AppError> {
        let url = self.url(&format!("{}/{}", FEEDBACK_PATH, result_id));
        debug!("POST {}", url);

        let response = self.client.post(url).send().await?;
        let body: FeedbackResponse = Self::json(response).await?;
        Ok(body.into_payload())
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let url = self.resolve(url);
        debug!("GET {}", url);

        let response = Self::checked(self.client.get(url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn history(&self, user_id: i64) -> Result<Vec<HistoryEntry>, AppError> {
        let url = self.url(&format!("{}/{}", HISTORY_PATH, user_id));
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let body: HistoryResponse = Self::json(response).await?;
        Ok(body.results)
    }

    async fn delete_history(&self, result_id: &RecordId) -> Result<(), AppError> {
        let url = self.url(&format!("{}/{}", HISTORY_PATH, result_id));
        debug!("DELETE {}", url);

        Self::checked(self.client.delete(url).send().await?).await?;
        Ok(())
    }
}
