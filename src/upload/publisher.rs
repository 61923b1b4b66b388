use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};

use log::{error, info};

use crate::upload::types::{PublishError, PublishEvent, PublishStage};
use crate::utils::convert;
use crate::vk::{SaveOutcome, VkApi, GRAFFITI_TYPE};

/// Drives the publish workflow for one batch of files on a worker thread.
///
/// Ordering is strict: a file's conversion and all four round-trips finish
/// before the next file starts, and the first failure aborts the rest of
/// the batch.
pub struct GraffitiPublisher {
    api: VkApi,
    recipient_id: i64,
    events: Sender<PublishEvent>,
    captcha_replies: Receiver<String>,
}

impl GraffitiPublisher {
    pub fn new(
        api: VkApi,
        recipient_id: i64,
        events: Sender<PublishEvent>,
        captcha_replies: Receiver<String>,
    ) -> Self {
        Self {
            api,
            recipient_id,
            events,
            captcha_replies,
        }
    }

    /// Consumes the batch, emitting events until completion or the first
    /// failure.
    pub fn run(self, files: Vec<PathBuf>) {
        for (index, path) in files.iter().enumerate() {
            let name = display_name(path);
            self.emit(PublishEvent::FileStarted {
                index,
                name: name.clone(),
            });
            info!("publishing {}", path.display());

            match self.publish_one(path) {
                Ok(()) => {
                    info!("published {}", path.display());
                    self.emit(PublishEvent::FileCompleted { index });
                }
                Err(e) => {
                    error!("publishing {} failed: {e}", path.display());
                    self.emit(PublishEvent::BatchAborted {
                        file: name,
                        error: e.to_string(),
                    });
                    return;
                }
            }
        }
        info!("all images published");
        self.emit(PublishEvent::BatchCompleted);
    }

    /// One file through the whole chain. Challenge state lives on this
    /// call's stack, so it cannot leak into the next file.
    fn publish_one(&self, path: &Path) -> Result<(), PublishError> {
        self.stage(PublishStage::Converting);
        let png = convert::to_png(path)?;

        self.stage(PublishStage::RequestingUploadUrl);
        let upload_url = self.api.get_upload_server(GRAFFITI_TYPE)?;

        self.stage(PublishStage::Uploading);
        let ticket = self.api.upload(&upload_url, png)?;

        self.stage(PublishStage::Saving);
        let saved = match self.api.save(&ticket)? {
            SaveOutcome::Saved(graffiti) => graffiti,
            SaveOutcome::CaptchaRequired(challenge) => {
                info!("save challenged, captcha sid {}", challenge.sid);
                self.stage(PublishStage::AwaitingCaptcha);
                let image = self.api.fetch_captcha_image(&challenge.img_url)?;
                self.emit(PublishEvent::CaptchaChallenge { image });
                let key = self
                    .captcha_replies
                    .recv()
                    .map_err(|_| PublishError::CaptchaAbandoned)?;
                self.stage(PublishStage::RetryingSave);
                self.api.save_with_captcha(&ticket, &challenge.sid, &key)?
            }
        };

        self.stage(PublishStage::Sending);
        self.api.send_message(self.recipient_id, &saved.attachment())?;
        Ok(())
    }

    fn stage(&self, stage: PublishStage) {
        self.emit(PublishEvent::StageChanged { stage });
    }

    fn emit(&self, event: PublishEvent) {
        // A dropped receiver means the window is gone; nobody left to tell.
        let _ = self.events.send(event);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
