use std::env;
use std::path::PathBuf;
use std::time::Duration;
use log::debug;
use vt_core::PipelineVariant;
use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_STORAGE_DIR: &str = "outputs";
pub const DEFAULT_TOAST_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub user_id: Option<i64>,
    pub pipeline: PipelineVariant,
    pub storage_dir: PathBuf,
    pub toast_duration: Duration,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env loaded: {}", e);
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = value("TRYON_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let user_id = value("TRYON_USER_ID")
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::Config(format!("TRYON_USER_ID must be a number, got `{}`", raw)))
            })
            .transpose()?;

        let pipeline = match value("TRYON_PIPELINE") {
            Some(raw) => raw
                .parse::<PipelineVariant>()
                .map_err(|e: vt_core::CoreError| AppError::Config(e.to_string()))?,
            None => PipelineVariant::default(),
        };

        let storage_dir = value("TRYON_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let toast_secs = value("TRYON_TOAST_SECS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| AppError::Config(format!("TRYON_TOAST_SECS must be a number, got `{}`", raw)))
            })
            .transpose()?
            .unwrap_or(DEFAULT_TOAST_SECS);

        Ok(Self {
            api_base_url,
            user_id,
            pipeline,
            storage_dir,
            toast_duration: Duration::from_secs(toast_secs),
        })
    }

    pub fn local_storage_path(&self) -> PathBuf {
        self.storage_dir.join("local_storage.json")
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.storage_dir.join("previews")
    }
}
