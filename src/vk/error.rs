use thiserror::Error;

/// Failure of one remote call, tagged by the endpoint family that produced
/// it. Transport problems and unexpected response shapes both end up in the
/// kind of the call that was in flight.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not set up the HTTP client: {0}")]
    Transport(String),
    #[error("identity lookup failed: {0}")]
    Identity(String),
    #[error("upload server request failed: {0}")]
    UploadUrl(String),
    #[error("file upload failed: {0}")]
    Upload(String),
    #[error("document save failed: {0}")]
    Save(String),
    #[error("captcha retry failed: {0}")]
    Captcha(String),
    #[error("message send failed: {0}")]
    Send(String),
}
