use thiserror::Error;

use crate::utils::convert::ConvertError;
use crate::vk::ApiError;

/// Stages of the per-file publish workflow, in the order they run. The two
/// captcha stages only appear when a save is challenged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Converting,
    RequestingUploadUrl,
    Uploading,
    Saving,
    AwaitingCaptcha,
    RetryingSave,
    Sending,
}

impl PublishStage {
    /// Short label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            PublishStage::Converting => "Converting",
            PublishStage::RequestingUploadUrl => "Requesting upload URL",
            PublishStage::Uploading => "Uploading",
            PublishStage::Saving => "Saving",
            PublishStage::AwaitingCaptcha => "Waiting for captcha",
            PublishStage::RetryingSave => "Retrying save",
            PublishStage::Sending => "Sending",
        }
    }
}

/// Worker-to-UI notifications for one batch.
#[derive(Debug)]
pub enum PublishEvent {
    FileStarted { index: usize, name: String },
    StageChanged { stage: PublishStage },
    /// Save was rejected with a challenge. The worker is blocked on the
    /// reply channel until a transcription comes back.
    CaptchaChallenge { image: Vec<u8> },
    FileCompleted { index: usize },
    BatchCompleted,
    BatchAborted { file: String, error: String },
}

/// Failure of one file's workflow.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("captcha prompt closed before an answer was submitted")]
    CaptchaAbandoned,
}
