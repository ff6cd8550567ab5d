mod test_counter_replication;
mod test_late_joiner_snapshot;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub counter: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CounterAction {
    #[serde(rename = "INC")]
    Inc,
    #[serde(rename = "ADD")]
    Add(i64),
}

pub fn counter_reducer(state: &Counter, action: &CounterAction) -> Counter {
    match action {
        CounterAction::Inc => Counter {
            counter: state.counter + 1,
        },
        CounterAction::Add(n) => Counter {
            counter: state.counter + n,
        },
    }
}
