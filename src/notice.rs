//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `shave_failed`.
//! Role: Shared contract helper for CLI diagnostics (failed shaves and similar events).
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde_json::{Map, Value, json};

use crate::api::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub message: String,
    pub details: Map<String, Value>,
}

/// Notice for a shave that failed without aborting the run.
pub fn shave_failed(err: &Error, cmd: &str, time: String) -> Notice {
    let mut details = Map::new();
    if let Some(yak) = err.yak() {
        details.insert("yak".to_string(), json!(yak));
    }
    details.insert("error_kind".to_string(), json!(format!("{:?}", err.kind())));
    Notice {
        kind: "shave_failed".to_string(),
        time,
        cmd: cmd.to_string(),
        message: err
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| "shave failed".to_string()),
        details,
    }
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}
