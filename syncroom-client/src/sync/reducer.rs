use crate::sync::SyncError;
use serde::Serialize;
use std::sync::Arc;
use syncroom_core::{Versioned, check_reserved_field};

/// Application reducer: pure function from the current state and an action to the next state.
pub type Reducer<S, A> = Arc<dyn Fn(&S, &A) -> S + Send + Sync>;

/// Input of the revision-stamping wrapper around an application reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction<S, A> {
    /// Host snapshot: replaces the state as-is.
    Deliver(Versioned<S>),
    User(A),
}

/// Runs one action through `reducer`, stamping user actions with the next revision.
///
/// Nothing is committed here; the caller stores the returned state.
pub fn apply_action<S, A>(
    current: &Versioned<S>,
    action: SyncAction<S, A>,
    reducer: &(dyn Fn(&S, &A) -> S + Send + Sync),
) -> Result<Versioned<S>, SyncError>
where
    S: Serialize,
{
    match action {
        SyncAction::Deliver(delivered) => {
            check_reserved_field(&delivered.state)?;
            Ok(delivered)
        }
        SyncAction::User(action) => {
            let state = reducer(&current.state, &action);
            check_reserved_field(&state)?;
            Ok(Versioned {
                state,
                revision: current.revision + 1,
            })
        }
    }
}
