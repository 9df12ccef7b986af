use thiserror::Error;
use crate::generation::{GenerationState, Transition};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid transition {via:?} from {from:?}")]
    InvalidTransition {
        from: GenerationState,
        via: Transition,
    },

    #[error("Response is missing `{0}`")]
    MissingField(&'static str),

    #[error("Response body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Try-on was rejected by the backend: {0}")]
    Rejected(String),

    #[error("Unknown pipeline variant `{0}` (expected `stepwise` or `full`)")]
    UnknownPipeline(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
