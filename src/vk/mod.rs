mod api;
mod error;
mod transport;
mod types;

pub use api::{VkApi, API_VERSION, DOCS_API_VERSION, GRAFFITI_TYPE, NEWEST_API_VERSION};
pub use error::ApiError;
pub use transport::{FilePart, HttpTransport, TransportError, VkTransport};
pub use types::{CaptchaChallenge, GraffitiRef, SaveOutcome, UploadTicket, UserInfo};
