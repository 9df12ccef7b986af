use crate::error::{CoreError, Result};

/// Lifecycle of one try-on generation.
///
/// ```text
/// Idle/Done/Failed --Start--> Uploading --Uploaded--> Processing --Processed--> AwaitingFeedback
/// Uploading --UploadFailed--> Failed      Processing --ProcessFailed--> Failed
/// AwaitingFeedback --FeedbackResolved | FeedbackFailed--> Done
/// Uploading | Processing | AwaitingFeedback --Aborted--> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Uploading,
    Processing,
    AwaitingFeedback,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Uploaded,
    UploadFailed,
    Processed,
    ProcessFailed,
    FeedbackResolved,
    FeedbackFailed,
    /// The run ended without reaching a stage outcome, e.g. its task panicked
    Aborted,
}

impl GenerationState {
    /// A pipeline is running; new generate requests are rejected.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Uploading | Self::Processing | Self::AwaitingFeedback)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn next(self, via: Transition) -> Result<Self> {
        use GenerationState::*;
        use Transition::*;

        let next = match (self, via) {
            (Idle | Done | Failed, Start) => Uploading,
            (Uploading, Uploaded) => Processing,
            (Uploading, UploadFailed) => Failed,
            (Processing, Processed) => AwaitingFeedback,
            (Processing, ProcessFailed) => Failed,
            // feedback failure is not fatal, the try-on image is still shown
            (AwaitingFeedback, FeedbackResolved | FeedbackFailed) => Done,
            (Uploading | Processing | AwaitingFeedback, Aborted) => Failed,
            (from, via) => return Err(CoreError::InvalidTransition { from, via }),
        };

        Ok(next)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "Ready",
            Self::Uploading => "Uploading images...",
            Self::Processing => "Generating try-on...",
            Self::AwaitingFeedback => "Analysing outfit...",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            Self::Idle => "⏳",
            Self::Uploading => "📤",
            Self::Processing => "⚡",
            Self::AwaitingFeedback => "💬",
            Self::Done => "✅",
            Self::Failed => "❌",
        }
    }
}
