//! Shared types for the WASM API
//!
//! Plain objects handed back to JavaScript. Offsets in here are already in
//! UTF-16 code units.

use serde::Serialize;

use crate::models::{AuxiliarySnapshot, DueSave};
use crate::sync::{Notice, SaveOutcome};

/// A save the host must persist and then report with `saveCompleted`
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsSave {
    pub ticket: u64,
    pub content: String,
    pub auxiliary: AuxiliarySnapshot,
    pub timestamp: u64,
}

impl From<DueSave> for JsSave {
    fn from(due: DueSave) -> Self {
        Self {
            ticket: due.ticket.0,
            content: due.request.content,
            auxiliary: due.request.auxiliary,
            timestamp: due.request.timestamp,
        }
    }
}

/// Result of `tick`
#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JsEffects {
    pub saves: Vec<JsSave>,
    pub frame_requested: bool,
    pub render: bool,
    pub notices: Vec<Notice>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RemoteStatus {
    Applied,
    Identical,
    Deferred,
}

/// Result of `applyRemoteSync`
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsRemoteApply {
    pub status: RemoteStatus,
    /// Caret to set before the next paint, when one was restored
    pub cursor_offset: Option<usize>,
}

/// Name of a save outcome as JS sees it
pub fn outcome_name(outcome: &SaveOutcome) -> &'static str {
    match outcome {
        SaveOutcome::Saved => "saved",
        SaveOutcome::Superseded => "superseded",
        SaveOutcome::Failed(_) => "failed",
        SaveOutcome::Ignored => "ignored",
    }
}
