use std::sync::mpsc::{Receiver, Sender};

use crate::upload::{PublishEvent, PublishStage};

/// Progress of the current batch, folded from worker events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchProgress {
    NotStarted,
    Publishing { total: usize, completed: usize },
    Completed { total: usize },
    Aborted { total: usize, completed: usize },
}

impl Default for BatchProgress {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// An open challenge: the fetched image plus whatever the user has typed
/// so far.
#[derive(Default)]
pub struct CaptchaPrompt {
    pub image: Vec<u8>,
    pub input: String,
}

/// Render-side state. The worker owns the real workflow; this struct only
/// folds its events into something the UI can draw.
#[derive(Default)]
pub struct UploadState {
    pub progress: BatchProgress,
    pub current_file: Option<String>,
    pub stage: Option<PublishStage>,
    pub error_message: Option<String>,
    pub captcha: Option<CaptchaPrompt>,
    pub captcha_texture: Option<egui::TextureHandle>,
    pub captcha_decode_failed: bool,
    pub events: Option<Receiver<PublishEvent>>,
    pub captcha_reply: Option<Sender<String>>,
}

impl UploadState {
    /// Starts tracking a fresh batch, dropping everything from the last one.
    pub fn begin_batch(
        &mut self,
        total: usize,
        events: Receiver<PublishEvent>,
        captcha_reply: Sender<String>,
    ) {
        *self = UploadState::default();
        self.progress = BatchProgress::Publishing { total, completed: 0 };
        self.events = Some(events);
        self.captcha_reply = Some(captcha_reply);
    }

    pub fn is_publishing(&self) -> bool {
        matches!(self.progress, BatchProgress::Publishing { .. })
    }

    /// Folds one worker event into render state.
    pub fn apply_event(&mut self, event: PublishEvent) {
        match event {
            PublishEvent::FileStarted { name, .. } => {
                self.current_file = Some(name);
                self.stage = None;
            }
            PublishEvent::StageChanged { stage } => {
                self.stage = Some(stage);
            }
            PublishEvent::CaptchaChallenge { image } => {
                self.captcha = Some(CaptchaPrompt {
                    image,
                    input: String::new(),
                });
                self.captcha_texture = None;
                self.captcha_decode_failed = false;
            }
            PublishEvent::FileCompleted { .. } => {
                if let BatchProgress::Publishing { completed, .. } = &mut self.progress {
                    *completed += 1;
                }
                self.stage = None;
            }
            PublishEvent::BatchCompleted => {
                if let BatchProgress::Publishing { total, .. } = self.progress {
                    self.progress = BatchProgress::Completed { total };
                }
                self.current_file = None;
                self.stage = None;
                self.events = None;
                self.captcha_reply = None;
            }
            PublishEvent::BatchAborted { file, error } => {
                if let BatchProgress::Publishing { total, completed } = self.progress {
                    self.progress = BatchProgress::Aborted { total, completed };
                }
                self.error_message = Some(format!("{file}: {error}"));
                self.current_file = None;
                self.stage = None;
                self.captcha = None;
                self.captcha_texture = None;
                self.captcha_decode_failed = false;
                self.events = None;
                self.captcha_reply = None;
            }
        }
    }

    pub fn get_progress_percentage(&self) -> f32 {
        match &self.progress {
            BatchProgress::NotStarted => 0.0,
            BatchProgress::Publishing { total, completed }
            | BatchProgress::Aborted { total, completed } => {
                if *total == 0 {
                    0.0
                } else {
                    (*completed as f32) / (*total as f32)
                }
            }
            BatchProgress::Completed { total } => {
                if *total == 0 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    pub fn get_status_text(&self) -> String {
        match &self.progress {
            BatchProgress::NotStarted => String::new(),
            BatchProgress::Publishing { total, completed } => {
                let stage = self.stage.map(|s| s.label()).unwrap_or("Starting");
                match &self.current_file {
                    Some(file) => format!("{stage}: {file} | {completed}/{total} files"),
                    None => format!("{stage} | {completed}/{total} files"),
                }
            }
            BatchProgress::Completed { .. } => "Everything Uploaded".to_string(),
            BatchProgress::Aborted { total, completed } => {
                format!("Stopped after {completed}/{total} files")
            }
        }
    }
}
