//! Persistence payloads

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::scheduler::Millis;

/// Snapshots of auxiliary domain entities, keyed by entity kind
///
/// The core never looks inside the values; they are persisted atomically
/// together with the content.
pub type AuxiliarySnapshot = BTreeMap<String, serde_json::Value>;

/// A pending save, superseded by any newer request inside the debounce window
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Full content (markers included)
    pub content: String,
    pub dirty: bool,
    pub auxiliary: AuxiliarySnapshot,
    /// Host wall-clock time the request was made, epoch ms
    pub timestamp: u64,
}

impl SaveRequest {
    /// What actually goes over the wire
    pub fn payload(&self) -> SavePayload<'_> {
        SavePayload {
            content: &self.content,
            auxiliary: &self.auxiliary,
            timestamp: self.timestamp,
        }
    }
}

/// The atomic unit handed to a persistence sink
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload<'a> {
    pub content: &'a str,
    pub auxiliary: &'a AuxiliarySnapshot,
    pub timestamp: u64,
}

/// Identifies one in-flight persistence call
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveTicket(pub u64);

/// A request handed to the host together with its ticket
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DueSave {
    pub ticket: SaveTicket,
    pub request: SaveRequest,
    /// Host monotonic time the debounce fired
    pub fired_at: Millis,
}
