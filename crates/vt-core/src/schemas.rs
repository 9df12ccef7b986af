use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::{CoreError, Result};
use crate::feedback::FeedbackPayload;

/// Backend row identifier.
///
/// The backend hands ids out as integers, SQL decimals (`12.0`) or strings;
/// all of them collapse to one canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct RecordId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<RawId> for RecordId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Float(f) if f.is_finite() && f.fract() == 0.0 => Self(format!("{}", f as i64)),
            RawId::Float(f) => Self(f.to_string()),
            RawId::Str(s) => Self(s.trim().to_string()),
        }
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /api/upload/images`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, alias = "personId")]
    pub person_id: Option<RecordId>,
    #[serde(default, alias = "clothingId")]
    pub clothing_id: Option<RecordId>,
    #[serde(default)]
    pub person_url: Option<String>,
    #[serde(default)]
    pub clothing_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub person_id: RecordId,
    pub clothing_id: RecordId,
}

impl UploadResponse {
    pub fn into_upload_result(self) -> Result<UploadResult> {
        let person_id = self.person_id.ok_or(CoreError::MissingField("person_id"))?;
        let clothing_id = self.clothing_id.ok_or(CoreError::MissingField("clothing_id"))?;

        Ok(UploadResult { person_id, clothing_id })
    }
}

/// Body of `POST /api/try-on/process` and of the combined `POST /api/try-on`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub result_id: Option<RecordId>,
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnResult {
    pub result_id: Option<RecordId>,
    pub result_url: String,
    pub success: bool,
}

impl ProcessResponse {
    /// Stepwise process call: `success` must be present and true.
    pub fn into_try_on_result(self) -> Result<TryOnResult> {
        match self.success {
            Some(true) => {}
            Some(false) => return Err(self.rejection()),
            None => return Err(CoreError::MissingField("success")),
        }
        self.into_result()
    }

    /// Combined call: only `result_url` is required, an explicit `success=false` still fails.
    pub fn into_combined_result(self) -> Result<TryOnResult> {
        if self.success == Some(false) {
            return Err(self.rejection());
        }
        self.into_result()
    }

    fn rejection(&self) -> CoreError {
        CoreError::Rejected(
            self.message
                .clone()
                .unwrap_or_else(|| "success=false".to_string()),
        )
    }

    fn into_result(self) -> Result<TryOnResult> {
        let result_url = self
            .result_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(CoreError::MissingField("result_url"))?;

        Ok(TryOnResult {
            result_id: self.result_id,
            result_url,
            success: true,
        })
    }
}

/// Body of `GET|POST /api/feedback/{result_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<FeedbackData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackData {
    #[serde(default)]
    pub feedback: serde_json::Value,
    #[serde(default, alias = "formattedText")]
    pub formatted_text: Option<String>,
}

impl FeedbackResponse {
    pub fn into_payload(self) -> FeedbackPayload {
        match self.data {
            Some(data) => FeedbackPayload::new(data.formatted_text, data.feedback),
            None => FeedbackPayload::new(None, serde_json::Value::Null),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub result_id: RecordId,
    pub result_url: String,
    #[serde(default)]
    pub person_url: Option<String>,
    #[serde(default)]
    pub clothing_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub person_id: Option<RecordId>,
    #[serde(default)]
    pub clothing_id: Option<RecordId>,
}

/// Body of `GET /api/history/{user_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub results: Vec<HistoryEntry>,
}

/// Error body used by the backend for non-2xx replies
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub detail: serde_json::Value,
}

impl ErrorResponse {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_normalization() {
        let ids: Vec<RecordId> = serde_json::from_value(json!([12, 12.0, "12", 3.5])).unwrap();
        assert_eq!(ids[0].as_str(), "12");
        assert_eq!(ids[1].as_str(), "12");
        assert_eq!(ids[2].as_str(), "12");
        assert_eq!(ids[3].as_str(), "3.5");
        assert_eq!(serde_json::to_value(&ids[0]).unwrap(), json!("12"));
    }

    #[test]
    fn test_upload_ids_and_aliases() {
        let resp: UploadResponse =
            serde_json::from_value(json!({"success": true, "personId": 4, "clothingId": 9})).unwrap();
        let ids = resp.into_upload_result().unwrap();
        assert_eq!(ids.person_id.as_str(), "4");
        assert_eq!(ids.clothing_id.as_str(), "9");
    }

    #[test]
    fn test_upload_missing_clothing_id() {
        let resp: UploadResponse = serde_json::from_value(json!({"person_id": 4})).unwrap();
        assert_eq!(resp.into_upload_result(), Err(CoreError::MissingField("clothing_id")));
    }

    #[test]
    fn test_process_validation() {
        let ok: ProcessResponse = serde_json::from_value(json!({
            "success": true, "result_id": 7, "result_url": "https://cdn/x.png"
        }))
        .unwrap();
        let result = ok.into_try_on_result().unwrap();
        assert_eq!(result.result_id, Some(RecordId::new("7")));
        assert!(result.success);

        let rejected = ProcessResponse { success: Some(false), ..Default::default() };
        assert!(matches!(rejected.into_try_on_result(), Err(CoreError::Rejected(_))));

        let no_url = ProcessResponse { success: Some(true), ..Default::default() };
        assert_eq!(no_url.into_try_on_result(), Err(CoreError::MissingField("result_url")));

        let no_flag = ProcessResponse { result_url: Some("u".into()), ..Default::default() };
        assert_eq!(no_flag.into_try_on_result(), Err(CoreError::MissingField("success")));
    }

    #[test]
    fn test_combined_only_needs_url() {
        let resp = ProcessResponse { result_url: Some("https://cdn/y.png".into()), ..Default::default() };
        assert_eq!(resp.into_combined_result().unwrap().result_url, "https://cdn/y.png");
    }

    #[test]
    fn test_feedback_envelope() {
        let resp: FeedbackResponse = serde_json::from_value(json!({
            "status": "success",
            "data": {"feedback": {"overall_score": 8}, "formatted_text": "A\nb"}
        }))
        .unwrap();
        let payload = resp.into_payload();
        assert_eq!(payload.formatted_text.as_deref(), Some("A\nb"));
        assert_eq!(payload.structured, json!({"overall_score": 8}));
    }

    #[test]
    fn test_error_detail() {
        let err: ErrorResponse = serde_json::from_value(json!({"detail": "Person image not found"})).unwrap();
        assert_eq!(err.message(), "Person image not found");
    }
}
