use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use thiserror::Error;

/// Transport-level failure: connect, TLS, or a body that is not JSON.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// One multipart file attachment, carried as plain data so request contents
/// stay inspectable in tests.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub headers: Vec<(String, String)>,
    pub bytes: Vec<u8>,
}

/// Blocking HTTP operations the API client needs. Object safe so tests can
/// substitute a scripted transport.
pub trait VkTransport: Send + Sync {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, TransportError>;
    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<Value, TransportError>;
    fn post_multipart(&self, url: &str, part: FilePart) -> Result<Value, TransportError>;
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Production transport over one shared blocking client. Requests carry no
/// timeout; a stalled call keeps only the worker thread busy.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl VkTransport for HttpTransport {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        self.client
            .get(url)
            .query(query)
            .send()
            .and_then(|response| response.json())
            .map_err(|e| TransportError(e.to_string()))
    }

    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<Value, TransportError> {
        self.client
            .post(url)
            .form(fields)
            .send()
            .and_then(|response| response.json())
            .map_err(|e| TransportError(e.to_string()))
    }

    fn post_multipart(&self, url: &str, part: FilePart) -> Result<Value, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &part.headers {
            let name = HeaderName::from_str(name).map_err(|e| TransportError(e.to_string()))?;
            let value = HeaderValue::from_str(value).map_err(|e| TransportError(e.to_string()))?;
            headers.insert(name, value);
        }
        let file = Part::bytes(part.bytes)
            .file_name(part.file_name)
            .mime_str(&part.mime)
            .map_err(|e| TransportError(e.to_string()))?
            .headers(headers);
        let form = Form::new().part(part.field, file);
        self.client
            .post(url)
            .multipart(form)
            .send()
            .and_then(|response| response.json())
            .map_err(|e| TransportError(e.to_string()))
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.client
            .get(url)
            .send()
            .and_then(|response| response.bytes())
            .map(|bytes| bytes.to_vec())
            .map_err(|e| TransportError(e.to_string()))
    }
}
