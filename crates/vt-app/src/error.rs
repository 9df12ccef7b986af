use thiserror::Error;
use vt_core::CoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error from backend (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Could not reach backend: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected backend response: {0}")]
    Response(#[from] CoreError),

    #[error("Could not decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
