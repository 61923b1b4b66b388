use serde::Deserialize;
use serde_json::Value;

/// Account identity returned by `users.get` for the token owner.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// Opaque upload token returned by the upload server. Passed verbatim to
/// `docs.save`, never inspected.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTicket {
    pub file: String,
}

/// Saved graffiti document reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GraffitiRef {
    pub owner_id: i64,
    pub id: i64,
}

impl GraffitiRef {
    /// Attachment id in the form `messages.send` expects.
    pub fn attachment(&self) -> String {
        format!("graffiti{}_{}", self.owner_id, self.id)
    }
}

/// Challenge details lifted from a rejected save response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaChallenge {
    pub sid: String,
    pub img_url: String,
}

/// Outcome of a `docs.save` call, decided by the response shape.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved(GraffitiRef),
    CaptchaRequired(CaptchaChallenge),
}

#[derive(Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Deserialize)]
struct UploadServer {
    upload_url: String,
}

#[derive(Deserialize)]
struct SaveBody {
    response: Option<SaveResponse>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct SaveResponse {
    graffiti: Option<GraffitiRef>,
}

#[derive(Deserialize)]
struct RetryBody {
    response: Option<Vec<GraffitiRef>>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error_code: Option<i64>,
    error_msg: Option<String>,
    captcha_sid: Option<String>,
    captcha_img: Option<String>,
}

impl ErrorBody {
    fn describe(&self, body: &Value) -> String {
        match (&self.error_code, &self.error_msg) {
            (Some(code), Some(msg)) => format!("error {code}: {msg}"),
            _ => format!("error body: {body}"),
        }
    }
}

pub(crate) fn decode_user(body: &Value) -> Result<UserInfo, String> {
    let parsed: Envelope<Vec<UserInfo>> = serde_json::from_value(body.clone())
        .map_err(|e| format!("unexpected users.get response: {e}"))?;
    parsed
        .response
        .into_iter()
        .next()
        .ok_or_else(|| "users.get returned an empty user list".to_string())
}

pub(crate) fn decode_upload_url(body: &Value) -> Result<String, String> {
    let parsed: Envelope<UploadServer> = serde_json::from_value(body.clone())
        .map_err(|e| format!("unexpected docs.getUploadServer response: {e}"))?;
    Ok(parsed.response.upload_url)
}

pub(crate) fn decode_upload_ticket(body: &Value) -> Result<UploadTicket, String> {
    serde_json::from_value(body.clone()).map_err(|e| format!("upload response has no file token: {e}"))
}

/// Tells a saved document apart from a captcha challenge. The decision is
/// made on the shape of the body, not by probing for absent fields.
pub(crate) fn decode_save_outcome(body: &Value) -> Result<SaveOutcome, String> {
    let parsed: SaveBody = serde_json::from_value(body.clone())
        .map_err(|e| format!("unexpected docs.save response: {e}"))?;

    if let Some(error) = parsed.error {
        return match (error.captcha_sid.clone(), error.captcha_img.clone()) {
            (Some(sid), Some(img_url)) => {
                Ok(SaveOutcome::CaptchaRequired(CaptchaChallenge { sid, img_url }))
            }
            _ => Err(format!("docs.save {}", error.describe(body))),
        };
    }

    match parsed.response.and_then(|r| r.graffiti) {
        Some(graffiti) => Ok(SaveOutcome::Saved(graffiti)),
        None => Err(format!("docs.save response has no graffiti object: {body}")),
    }
}

/// The captcha retry answers with the saved document as a one-element array
/// instead of the `graffiti` object. Both shapes are kept exactly as the
/// service sends them. A second challenge is not retried and surfaces as a
/// plain failure.
pub(crate) fn decode_captcha_retry(body: &Value) -> Result<GraffitiRef, String> {
    let parsed: RetryBody = serde_json::from_value(body.clone())
        .map_err(|e| format!("unexpected docs.save retry response: {e}"))?;

    if let Some(error) = parsed.error {
        return Err(format!("docs.save retry {}", error.describe(body)));
    }

    parsed
        .response
        .and_then(|docs| docs.into_iter().next())
        .ok_or_else(|| format!("docs.save retry response has no document: {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attachment_is_owner_then_id() {
        let graffiti = GraffitiRef { owner_id: 5, id: 42 };
        assert_eq!(graffiti.attachment(), "graffiti5_42");

        let community = GraffitiRef { owner_id: -101, id: 7 };
        assert_eq!(community.attachment(), "graffiti-101_7");
    }

    #[test]
    fn identity_takes_the_first_user() {
        let body = json!({"response": [
            {"id": 42, "first_name": "Pavel", "last_name": "D."},
            {"id": 43, "first_name": "Nikolai", "last_name": "D."}
        ]});
        let user = decode_user(&body).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.first_name, "Pavel");
    }

    #[test]
    fn identity_rejects_an_error_body() {
        let body = json!({"error": {"error_code": 5, "error_msg": "User authorization failed"}});
        let err = decode_user(&body).unwrap_err();
        assert!(err.contains("users.get"), "unexpected message: {err}");
    }

    #[test]
    fn identity_rejects_an_empty_user_list() {
        let body = json!({"response": []});
        assert!(decode_user(&body).is_err());
    }

    #[test]
    fn save_success_decodes_to_saved() {
        let body = json!({"response": {"graffiti": {"owner_id": 1, "id": 2}, "type": "graffiti"}});
        match decode_save_outcome(&body).unwrap() {
            SaveOutcome::Saved(graffiti) => {
                assert_eq!(graffiti, GraffitiRef { owner_id: 1, id: 2 });
            }
            other => panic!("expected a saved document, got {other:?}"),
        }
    }

    #[test]
    fn save_error_with_captcha_fields_becomes_a_challenge() {
        let body = json!({"error": {
            "error_code": 14,
            "error_msg": "Captcha needed",
            "captcha_sid": "8675309",
            "captcha_img": "https://api.vk.com/captcha.php?sid=8675309"
        }});
        match decode_save_outcome(&body).unwrap() {
            SaveOutcome::CaptchaRequired(challenge) => {
                assert_eq!(challenge.sid, "8675309");
                assert!(challenge.img_url.contains("captcha.php"));
            }
            other => panic!("expected a challenge, got {other:?}"),
        }
    }

    #[test]
    fn save_error_without_captcha_fields_stays_an_error() {
        let body = json!({"error": {"error_code": 15, "error_msg": "Access denied"}});
        let err = decode_save_outcome(&body).unwrap_err();
        assert!(err.contains("error 15"), "unexpected message: {err}");
    }

    #[test]
    fn save_without_graffiti_object_is_rejected() {
        let body = json!({"response": {"type": "doc"}});
        assert!(decode_save_outcome(&body).is_err());
    }

    #[test]
    fn retry_takes_the_first_array_element() {
        let body = json!({"response": [{"owner_id": 7, "id": 9, "type": "graffiti"}]});
        let graffiti = decode_captcha_retry(&body).unwrap();
        assert_eq!(graffiti, GraffitiRef { owner_id: 7, id: 9 });
    }

    #[test]
    fn retry_does_not_accept_a_second_challenge() {
        let body = json!({"error": {
            "error_code": 14,
            "error_msg": "Captcha needed",
            "captcha_sid": "second",
            "captcha_img": "https://api.vk.com/captcha.php?sid=second"
        }});
        assert!(decode_captcha_retry(&body).is_err());
    }

    #[test]
    fn upload_ticket_keeps_the_token_verbatim() {
        let body = json!({"file": "3909|0|-1|some-opaque-token"});
        let ticket = decode_upload_ticket(&body).unwrap();
        assert_eq!(ticket.file, "3909|0|-1|some-opaque-token");
    }
}
