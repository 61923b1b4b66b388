use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::info;
use serde_json::Value;

use crate::vk::error::ApiError;
use crate::vk::transport::{FilePart, HttpTransport, VkTransport};
use crate::vk::types::{self, GraffitiRef, SaveOutcome, UploadTicket, UserInfo};

const API_BASE: &str = "https://api.vk.com/method";

/// Version sent with the identity lookup.
pub const API_VERSION: &str = "5.84";
/// Version sent with the docs family. The same number as the identity
/// version today, but a separate knob on purpose.
pub const DOCS_API_VERSION: &str = "5.84";
/// Version sent with `messages.send`, newer than the rest.
pub const NEWEST_API_VERSION: &str = "5.126";

/// Upload type tag for graffiti documents.
pub const GRAFFITI_TYPE: &str = "graffiti";

const DOCS_LANG: &str = "ru";
const GRAFFITI_TITLE: &str = "graffiti.png";
const GRAFFITI_TAGS: &str = "граффити";

/// Client for the handful of VK endpoints the publish workflow touches.
/// Cheap to clone; the transport is shared.
#[derive(Clone)]
pub struct VkApi {
    transport: Arc<dyn VkTransport>,
    access_token: String,
}

impl VkApi {
    /// Client over the production HTTP transport.
    pub fn new(access_token: String) -> Result<Self, ApiError> {
        let transport = HttpTransport::new().map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_transport(access_token, Arc::new(transport)))
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(access_token: String, transport: Arc<dyn VkTransport>) -> Self {
        Self { transport, access_token }
    }

    /// `users.get` for the token owner. Called once at startup; the result
    /// doubles as the token validity check.
    pub fn fetch_identity(&self) -> Result<UserInfo, ApiError> {
        let url = format!("{API_BASE}/users.get");
        let query = [
            ("name_case", "nom".to_string()),
            ("access_token", self.access_token.clone()),
            ("v", API_VERSION.to_string()),
            ("lang", "en".to_string()),
        ];
        let body = self
            .transport
            .get_json(&url, &query)
            .map_err(|e| ApiError::Identity(e.to_string()))?;
        types::decode_user(&body).map_err(ApiError::Identity)
    }

    /// `docs.getUploadServer` for the given upload type.
    pub fn get_upload_server(&self, upload_type: &str) -> Result<String, ApiError> {
        let url = format!("{API_BASE}/docs.getUploadServer");
        let fields = [
            ("lang", DOCS_LANG.to_string()),
            ("type", upload_type.to_string()),
            ("access_token", self.access_token.clone()),
            ("v", DOCS_API_VERSION.to_string()),
        ];
        let body = self
            .transport
            .post_form(&url, &fields)
            .map_err(|e| ApiError::UploadUrl(e.to_string()))?;
        types::decode_upload_url(&body).map_err(ApiError::UploadUrl)
    }

    /// Posts the PNG payload to the short-lived upload URL and returns the
    /// opaque file token.
    pub fn upload(&self, upload_url: &str, png: Vec<u8>) -> Result<UploadTicket, ApiError> {
        let part = FilePart {
            field: "file".to_string(),
            file_name: GRAFFITI_TITLE.to_string(),
            mime: "image/png".to_string(),
            headers: vec![("Expires".to_string(), "0".to_string())],
            bytes: png,
        };
        let body = self
            .transport
            .post_multipart(upload_url, part)
            .map_err(|e| ApiError::Upload(e.to_string()))?;
        types::decode_upload_ticket(&body).map_err(ApiError::Upload)
    }

    /// `docs.save`. The response shape decides between a saved document and
    /// a captcha challenge.
    pub fn save(&self, ticket: &UploadTicket) -> Result<SaveOutcome, ApiError> {
        let body = self
            .transport
            .post_form(&save_url(), &self.save_fields(ticket))
            .map_err(|e| ApiError::Save(e.to_string()))?;
        types::decode_save_outcome(&body).map_err(ApiError::Save)
    }

    /// `docs.save` retried once with the challenge answer appended to the
    /// original form.
    pub fn save_with_captcha(
        &self,
        ticket: &UploadTicket,
        captcha_sid: &str,
        captcha_key: &str,
    ) -> Result<GraffitiRef, ApiError> {
        let mut fields = self.save_fields(ticket);
        fields.push(("captcha_sid", captcha_sid.to_string()));
        fields.push(("captcha_key", captcha_key.to_string()));
        let body = self
            .transport
            .post_form(&save_url(), &fields)
            .map_err(|e| ApiError::Captcha(e.to_string()))?;
        types::decode_captcha_retry(&body).map_err(ApiError::Captcha)
    }

    /// Downloads the challenge image for the on-screen preview.
    pub fn fetch_captcha_image(&self, img_url: &str) -> Result<Vec<u8>, ApiError> {
        self.transport
            .get_bytes(img_url)
            .map_err(|e| ApiError::Captcha(e.to_string()))
    }

    /// `messages.send` to the given peer with a graffiti attachment. The
    /// response body is logged and otherwise ignored.
    pub fn send_message(&self, user_id: i64, attachment: &str) -> Result<(), ApiError> {
        let url = format!("{API_BASE}/messages.send");
        let query = [
            ("access_token", self.access_token.clone()),
            ("user_id", user_id.to_string()),
            ("random_id", message_nonce(unix_now()).to_string()),
            ("attachment", attachment.to_string()),
            ("v", NEWEST_API_VERSION.to_string()),
        ];
        let body: Value = self
            .transport
            .get_json(&url, &query)
            .map_err(|e| ApiError::Send(e.to_string()))?;
        info!("messages.send answered {body}");
        Ok(())
    }

    fn save_fields(&self, ticket: &UploadTicket) -> Vec<(&'static str, String)> {
        vec![
            ("title", GRAFFITI_TITLE.to_string()),
            ("tags", GRAFFITI_TAGS.to_string()),
            ("lang", DOCS_LANG.to_string()),
            ("file", ticket.file.clone()),
            ("access_token", self.access_token.clone()),
            ("v", DOCS_API_VERSION.to_string()),
        ]
    }
}

fn save_url() -> String {
    format!("{API_BASE}/docs.save")
}

fn unix_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

/// Message nonce at 10,000 ticks per second of Unix time. Collision
/// avoidance between near-simultaneous sends, not a source of randomness.
fn message_nonce(since_epoch: Duration) -> i64 {
    (since_epoch.as_micros() / 100) as i64
}
