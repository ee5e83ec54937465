//! Score submission to the Code & Conquer backend
//!
//! The session identity comes from LocalStorage (left there by the join
//! flow) and the turn token from the `challengeId` query parameter. A
//! payload is only built when all three are present.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::platform::{query_param, storage};
use crate::result::RunSummary;
use crate::tuning::Difficulty;

/// LocalStorage keys written by the join flow
pub const SESSION_ID_KEY: &str = "cc_sessionId";
pub const SESSION_CODE_KEY: &str = "cc_sessionCode";
pub const PLAYER_ID_KEY: &str = "cc_playerId";

/// Query parameter carrying the turn token
pub const CHALLENGE_PARAM: &str = "challengeId";

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("No player set on this device.")]
    MissingPlayer,
    #[error("No active session.")]
    MissingSession,
    #[error("Missing challengeId (turn token). Start the challenge again.")]
    MissingChallenge,
    #[error("payload encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("network error: {0}")]
    Network(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Who is playing and for which turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: Option<String>,
    pub session_code: Option<String>,
    pub player_id: Option<String>,
    pub challenge_id: Option<String>,
}

impl SessionContext {
    /// Read the context from LocalStorage and the page URL
    pub fn load() -> Self {
        let ctx = Self {
            session_id: storage::get_trimmed(SESSION_ID_KEY),
            session_code: storage::get_trimmed(SESSION_CODE_KEY),
            player_id: storage::get_trimmed(PLAYER_ID_KEY),
            challenge_id: query_param(CHALLENGE_PARAM),
        };
        if ctx.session_id.is_none() {
            log::info!("No session in LocalStorage, scores stay local");
        }
        ctx
    }
}

/// JSON body of `POST /scores`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePayload {
    pub session_id: String,
    pub session_code: String,
    pub player_id: String,
    pub challenge_id: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub points: u32,
    pub time_ms: u64,
    pub errors: u32,
}

impl ScorePayload {
    /// Build the payload for a finished run. Fails before any request is
    /// made if part of the identity is missing.
    pub fn build(ctx: &SessionContext, summary: &RunSummary) -> Result<Self, SubmitError> {
        let player_id = ctx.player_id.clone().ok_or(SubmitError::MissingPlayer)?;
        let session_id = ctx.session_id.clone().ok_or(SubmitError::MissingSession)?;
        let challenge_id = ctx.challenge_id.clone().ok_or(SubmitError::MissingChallenge)?;

        Ok(Self {
            session_id,
            session_code: ctx.session_code.clone().unwrap_or_default(),
            player_id,
            challenge_id,
            category: summary.category.clone(),
            difficulty: summary.difficulty,
            points: summary.points(),
            time_ms: summary.time_ms,
            errors: summary.errors,
        })
    }

    pub fn to_json(&self) -> Result<String, SubmitError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Error message for a non-2xx response: the body's `error` or `message`
/// field, or a generic line with the status.
pub fn rejection_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Request failed ({})", status))
}

/// Completion callback for a submission
pub type SubmitCallback = Box<dyn FnOnce(Result<(), SubmitError>)>;

/// Something that can deliver a score. Delivery is fire-and-forget: `submit`
/// returns immediately and `done` runs when the outcome is known.
pub trait ScoreSubmitter {
    fn submit(&self, payload: ScorePayload, done: SubmitCallback);
}

/// Logs the payload and reports success. Used natively and when no backend
/// is reachable.
#[derive(Debug, Default)]
pub struct LogSubmitter;

impl ScoreSubmitter for LogSubmitter {
    fn submit(&self, payload: ScorePayload, done: SubmitCallback) {
        match payload.to_json() {
            Ok(json) => {
                log::info!("Score (not sent): {}", json);
                done(Ok(()));
            }
            Err(e) => done(Err(e)),
        }
    }
}

/// Status line of one run's submission, shown in the HUD.
///
/// Each run gets its own; a callback from an earlier run only writes into
/// the status it was created with.
#[derive(Debug, Clone, Default)]
pub struct SubmitStatus(Rc<RefCell<Option<String>>>);

impl SubmitStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    pub fn set(&self, line: impl Into<String>) {
        *self.0.borrow_mut() = Some(line.into());
    }

    /// Callback writing the outcome of a submission to this status
    pub fn callback(&self) -> SubmitCallback {
        let status = self.clone();
        Box::new(move |result: Result<(), SubmitError>| match result {
            Ok(()) => status.set("Score saved"),
            Err(e) => {
                log::warn!("Score submission failed: {}", e);
                status.set(e.to_string());
            }
        })
    }
}

/// Build the payload for a finished run and hand it to `submitter`.
/// A missing identity is reported on `status` without any request.
pub fn submit_run(
    submitter: &dyn ScoreSubmitter,
    ctx: &SessionContext,
    summary: &RunSummary,
    status: &SubmitStatus,
) {
    match ScorePayload::build(ctx, summary) {
        Ok(payload) => {
            status.set("Saving score…");
            submitter.submit(payload, status.callback());
        }
        Err(e) => {
            log::warn!("Score not submitted: {}", e);
            status.set(e.to_string());
        }
    }
}

/// POSTs to `<api_base>/scores` with the browser's fetch
#[cfg(target_arch = "wasm32")]
pub struct FetchSubmitter {
    url: String,
}

#[cfg(target_arch = "wasm32")]
impl FetchSubmitter {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn post(url: String, body: String) -> Result<(), SubmitError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;

        fn network(e: JsValue) -> SubmitError {
            SubmitError::Network(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
        }

        let headers = web_sys::Headers::new().map_err(network)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(network)?;

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_mode(web_sys::RequestMode::Cors);
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let request = web_sys::Request::new_with_str_and_init(&url, &init).map_err(network)?;
        let window =
            web_sys::window().ok_or_else(|| SubmitError::Network("no window".to_string()))?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)?;

        if response.ok() {
            return Ok(());
        }

        let status = response.status();
        let text = match response.text() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        };
        Err(SubmitError::Rejected {
            status,
            message: rejection_message(status, &text),
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreSubmitter for FetchSubmitter {
    fn submit(&self, payload: ScorePayload, done: SubmitCallback) {
        let body = match payload.to_json() {
            Ok(body) => body,
            Err(e) => return done(Err(e)),
        };
        let url = self.url.clone();
        log::info!("Submitting {} points to {}", payload.points, url);
        wasm_bindgen_futures::spawn_local(async move {
            done(Self::post(url, body).await);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CATEGORY;

    fn ctx() -> SessionContext {
        SessionContext {
            session_id: Some("s-1".to_string()),
            session_code: Some("ABCD".to_string()),
            player_id: Some("p-9".to_string()),
            challenge_id: Some("c-42".to_string()),
        }
    }

    fn summary(won: bool) -> RunSummary {
        RunSummary {
            category: CATEGORY.to_string(),
            difficulty: Difficulty::Medium,
            time_ms: 90_000,
            errors: 0,
            won,
            score: 300,
            loss_reason: None,
            bits_collected: 4,
            bits_total: 4,
            new_best: false,
        }
    }

    #[test]
    fn test_payload_fields() {
        let payload = ScorePayload::build(&ctx(), &summary(true)).unwrap();
        assert_eq!(payload.points, 220);
        assert_eq!(payload.session_code, "ABCD");

        let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(json["sessionId"], "s-1");
        assert_eq!(json["playerId"], "p-9");
        assert_eq!(json["challengeId"], "c-42");
        assert_eq!(json["category"], "BIT_JUMPER");
        assert_eq!(json["difficulty"], "MEDIUM");
        assert_eq!(json["timeMs"], 90_000);
        assert_eq!(json["errors"], 0);
    }

    #[test]
    fn test_missing_session_code_is_empty() {
        let mut c = ctx();
        c.session_code = None;
        let payload = ScorePayload::build(&c, &summary(false)).unwrap();
        assert_eq!(payload.session_code, "");
        assert_eq!(payload.points, 0);
    }

    #[test]
    fn test_missing_identity_fails_early() {
        let mut c = ctx();
        c.player_id = None;
        assert!(matches!(
            ScorePayload::build(&c, &summary(true)),
            Err(SubmitError::MissingPlayer)
        ));

        let mut c = ctx();
        c.session_id = None;
        assert!(matches!(
            ScorePayload::build(&c, &summary(true)),
            Err(SubmitError::MissingSession)
        ));

        let mut c = ctx();
        c.challenge_id = None;
        assert!(matches!(
            ScorePayload::build(&c, &summary(true)),
            Err(SubmitError::MissingChallenge)
        ));
    }

    #[test]
    fn test_context_reads_storage() {
        storage::set_item(SESSION_ID_KEY, "sess");
        storage::set_item(SESSION_CODE_KEY, "");
        storage::set_item(PLAYER_ID_KEY, " player ");
        let c = SessionContext::load();
        assert_eq!(c.session_id.as_deref(), Some("sess"));
        assert_eq!(c.session_code, None);
        assert_eq!(c.player_id.as_deref(), Some("player"));
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(rejection_message(409, r#"{"error":"Not your turn"}"#), "Not your turn");
        assert_eq!(rejection_message(400, r#"{"message":"Bad token"}"#), "Bad token");
        assert_eq!(rejection_message(500, "<html>"), "Request failed (500)");
        assert_eq!(rejection_message(502, r#"{"error":""}"#), "Request failed (502)");
    }

    #[test]
    fn test_log_submitter_reports_success() {
        use std::cell::Cell;
        use std::rc::Rc;

        let ok = Rc::new(Cell::new(false));
        let flag = ok.clone();
        let payload = ScorePayload::build(&ctx(), &summary(true)).unwrap();
        LogSubmitter.submit(payload, Box::new(move |r: Result<(), SubmitError>| flag.set(r.is_ok())));
        assert!(ok.get());
    }

    /// Holds on to callbacks so a test can finish submissions later
    #[derive(Default)]
    struct DeferredSubmitter {
        pending: RefCell<Vec<SubmitCallback>>,
    }

    impl ScoreSubmitter for DeferredSubmitter {
        fn submit(&self, _payload: ScorePayload, done: SubmitCallback) {
            self.pending.borrow_mut().push(done);
        }
    }

    #[test]
    fn test_submit_run_updates_status() {
        let submitter = DeferredSubmitter::default();
        let status = SubmitStatus::new();
        submit_run(&submitter, &ctx(), &summary(true), &status);
        assert_eq!(status.get().as_deref(), Some("Saving score…"));

        let done = submitter.pending.borrow_mut().pop().unwrap();
        done(Err(SubmitError::Rejected {
            status: 409,
            message: "Not your turn".to_string(),
        }));
        assert_eq!(status.get().as_deref(), Some("Not your turn"));
    }

    #[test]
    fn test_submit_run_without_identity_sends_nothing() {
        let submitter = DeferredSubmitter::default();
        let status = SubmitStatus::new();
        let mut c = ctx();
        c.challenge_id = None;
        submit_run(&submitter, &c, &summary(true), &status);
        assert!(submitter.pending.borrow().is_empty());
        assert_eq!(
            status.get().as_deref(),
            Some("Missing challengeId (turn token). Start the challenge again.")
        );
    }

    #[test]
    fn test_late_result_stays_with_its_run() {
        let submitter = DeferredSubmitter::default();
        let first_run = SubmitStatus::new();
        submit_run(&submitter, &ctx(), &summary(true), &first_run);

        // Restart before the first submission finished
        let second_run = SubmitStatus::new();
        let done = submitter.pending.borrow_mut().pop().unwrap();
        done(Ok(()));

        assert_eq!(first_run.get().as_deref(), Some("Score saved"));
        assert_eq!(second_run.get(), None);
    }
}
