use syncroom_core::{REVISION_FIELD, ReservedFieldError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("replicated state must serialize to a JSON object")]
    NotAnObject,
    #[error("`{REVISION_FIELD}` is reserved for the host's revision counter")]
    ReservedField,
    #[error("failed to encode sync message: {0}")]
    Encode(String),
}

impl From<ReservedFieldError> for SyncError {
    fn from(e: ReservedFieldError) -> Self {
        match e {
            ReservedFieldError::NotAnObject => SyncError::NotAnObject,
            ReservedFieldError::Reserved => SyncError::ReservedField,
            ReservedFieldError::Encode(reason) => SyncError::Encode(reason),
        }
    }
}
