pub mod error;
pub mod feedback;
pub mod generation;
pub mod schemas;
mod model_types;

pub use error::CoreError;
pub use feedback::{FeedbackPayload, Section, SectionKind};
pub use generation::{GenerationState, Transition};
pub use model_types::{ImageFile, ImageRole, PipelineVariant};
pub use schemas::{HistoryEntry, RecordId, TryOnResult, UploadResult};
