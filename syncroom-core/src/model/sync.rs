use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key reserved in the replicated state for the host's revision counter.
pub const REVISION_FIELD: &str = "revision";

/// Application state stamped with the host's revision.
///
/// `S` is flattened next to `revision`, so it must serialize as a JSON object.
/// Revision `0` means the state was never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<S> {
    #[serde(flatten)]
    pub state: S,
    #[serde(default)]
    pub revision: u64,
}

impl<S> Versioned<S> {
    pub fn initial(state: S) -> Self {
        Self { state, revision: 0 }
    }
}

/// Data-channel message of the sync protocol.
///
/// `{"type":"DELIVER","payload":{..state, "revision": n}}` from host to all,
/// `{"type":"REQUEST","payload":<action>}` from a client to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SyncMessage<S, A> {
    #[serde(rename = "DELIVER")]
    Deliver(Versioned<S>),
    #[serde(rename = "REQUEST")]
    Request(A),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReservedFieldError {
    #[error("replicated state must serialize to a JSON object")]
    NotAnObject,
    #[error("`{REVISION_FIELD}` is reserved and cannot be set by the application")]
    Reserved,
    #[error("state is not serializable: {0}")]
    Encode(String),
}

/// Rejects application states that would clash with the revision stamp.
pub fn check_reserved_field<S: Serialize>(state: &S) -> Result<(), ReservedFieldError> {
    let value =
        serde_json::to_value(state).map_err(|e| ReservedFieldError::Encode(e.to_string()))?;
    let Some(object) = value.as_object() else {
        return Err(ReservedFieldError::NotAnObject);
    };
    if object.contains_key(REVISION_FIELD) {
        return Err(ReservedFieldError::Reserved);
    }
    Ok(())
}
