mod state;
mod ui;

use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use eframe::{egui, App};
use log::{info, warn};

pub use state::{BatchProgress, CaptchaPrompt, UploadState};

use crate::upload::GraffitiPublisher;
use crate::vk::{UserInfo, VkApi};

/// Extensions offered by the file picker. Anything else the decoder happens
/// to understand still works when typed in by hand.
const PICKER_EXTENSIONS: [&str; 3] = ["png", "gif", "webp"];

/// Challenge preview edge length in points.
const CAPTCHA_PREVIEW_SIZE: f32 = 180.0;

pub struct GraffitiApp {
    api: VkApi,
    user: UserInfo,
    state: UploadState,
}

impl GraffitiApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, api: VkApi, user: UserInfo) -> Self {
        Self {
            api,
            user,
            state: UploadState::default(),
        }
    }

    /// Opens the picker and starts a batch with whatever was chosen.
    /// Cancelling or picking nothing leaves the current state alone.
    pub fn select_files(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Select image for uploading")
            .add_filter("Images", &PICKER_EXTENSIONS)
            .pick_files();

        match picked {
            Some(files) if !files.is_empty() => self.start_batch(files),
            _ => info!("selection cancelled"),
        }
    }

    fn start_batch(&mut self, files: Vec<PathBuf>) {
        info!("publishing {} image(s)", files.len());

        let (events_tx, events_rx) = std_mpsc::channel();
        let (reply_tx, reply_rx) = std_mpsc::channel();
        self.state.begin_batch(files.len(), events_rx, reply_tx);

        let publisher =
            GraffitiPublisher::new(self.api.clone(), self.user.id, events_tx, reply_rx);
        thread::spawn(move || publisher.run(files));
    }

    /// Sends the typed transcription to the blocked worker and hides the
    /// prompt. The prompt never comes back for this file.
    pub fn submit_captcha(&mut self) {
        let Some(prompt) = self.state.captcha.take() else {
            return;
        };
        self.state.captcha_texture = None;
        if let Some(reply) = &self.state.captcha_reply {
            if reply.send(prompt.input).is_err() {
                warn!("captcha answer dropped, worker already stopped");
            }
        }
    }

    /// Drains worker events and keeps the challenge texture in sync.
    pub fn update_state(&mut self, ctx: &egui::Context) {
        let mut drained = Vec::new();
        if let Some(events) = &self.state.events {
            while let Ok(event) = events.try_recv() {
                drained.push(event);
            }
        }
        for event in drained {
            self.state.apply_event(event);
        }

        // One decode attempt per challenge; the fold resets the flag when a
        // new image arrives.
        if let Some(prompt) = &self.state.captcha {
            if self.state.captcha_texture.is_none() && !self.state.captcha_decode_failed {
                match load_captcha_texture(ctx, &prompt.image) {
                    Ok(texture) => self.state.captcha_texture = Some(texture),
                    Err(e) => {
                        self.state.captcha_decode_failed = true;
                        warn!("could not decode the captcha image: {e}");
                    }
                }
            }
        }

        // Worker events arrive without any input to wake the UI, so poll
        // while a batch is in flight.
        if self.state.is_publishing() || self.state.captcha.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl App for GraffitiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}

fn load_captcha_texture(
    ctx: &egui::Context,
    bytes: &[u8],
) -> Result<egui::TextureHandle, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let size = [decoded.width() as usize, decoded.height() as usize];
    let pixels = egui::ColorImage::from_rgba_unmultiplied(size, decoded.as_raw());
    Ok(ctx.load_texture("captcha", pixels, egui::TextureOptions::LINEAR))
}
