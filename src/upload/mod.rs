mod publisher;
mod types;

pub use publisher::GraffitiPublisher;
pub use types::{PublishError, PublishEvent, PublishStage};
