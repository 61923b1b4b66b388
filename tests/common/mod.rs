//! Shared scripted transport for the workflow tests: replies are played back
//! in order and every request is recorded for assertions.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use vgu::vk::{FilePart, TransportError, VkTransport};

/// One canned reply.
pub enum Reply {
    Json(Value),
    Bytes(Vec<u8>),
    Fail(String),
}

/// What the transport saw, in call order.
#[derive(Debug, Clone)]
pub enum Recorded {
    GetJson {
        url: String,
        query: Vec<(String, String)>,
    },
    PostForm {
        url: String,
        fields: Vec<(String, String)>,
    },
    PostMultipart {
        url: String,
        file_name: String,
        mime: String,
        headers: Vec<(String, String)>,
        payload_len: usize,
    },
    GetBytes {
        url: String,
    },
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    /// Form bodies of every `docs.save` call, in order.
    pub fn save_forms(&self) -> Vec<Vec<(String, String)>> {
        self.recorded()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::PostForm { url, fields } if url.ends_with("docs.save") => Some(fields),
                _ => None,
            })
            .collect()
    }

    /// Query strings of every `messages.send` call, in order.
    pub fn send_queries(&self) -> Vec<Vec<(String, String)>> {
        self.recorded()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::GetJson { url, query } if url.ends_with("messages.send") => Some(query),
                _ => None,
            })
            .collect()
    }

    fn next_reply(&self) -> Reply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Fail("transport script exhausted".to_string()))
    }

    fn record(&self, call: Recorded) {
        self.calls.lock().unwrap().push(call);
    }

    fn json_reply(&self) -> Result<Value, TransportError> {
        match self.next_reply() {
            Reply::Json(value) => Ok(value),
            Reply::Bytes(_) => Err(TransportError("script holds bytes, not json".to_string())),
            Reply::Fail(message) => Err(TransportError(message)),
        }
    }
}

impl VkTransport for ScriptedTransport {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        self.record(Recorded::GetJson {
            url: url.to_string(),
            query: owned_pairs(query),
        });
        self.json_reply()
    }

    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<Value, TransportError> {
        self.record(Recorded::PostForm {
            url: url.to_string(),
            fields: owned_pairs(fields),
        });
        self.json_reply()
    }

    fn post_multipart(&self, url: &str, part: FilePart) -> Result<Value, TransportError> {
        self.record(Recorded::PostMultipart {
            url: url.to_string(),
            file_name: part.file_name.clone(),
            mime: part.mime.clone(),
            headers: part.headers.clone(),
            payload_len: part.bytes.len(),
        });
        self.json_reply()
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.record(Recorded::GetBytes {
            url: url.to_string(),
        });
        match self.next_reply() {
            Reply::Bytes(bytes) => Ok(bytes),
            Reply::Json(_) => Err(TransportError("script holds json, not bytes".to_string())),
            Reply::Fail(message) => Err(TransportError(message)),
        }
    }
}

fn owned_pairs(pairs: &[(&str, String)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

pub fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Writes small solid-color images into `dir`, one per name, format taken
/// from the extension.
pub fn fixture_images(dir: &tempfile::TempDir, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            image::ImageBuffer::from_pixel(4, 4, image::Rgba([10u8, 20, 30, 255]))
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

/// A decodable PNG for scripted captcha image replies.
pub fn tiny_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    let img = image::DynamicImage::ImageRgba8(image::ImageBuffer::from_pixel(
        2,
        2,
        image::Rgba([0, 0, 0, 255]),
    ));
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageOutputFormat::Png,
    )
    .unwrap();
    bytes
}
