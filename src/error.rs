//! Error types shared across the crate

use thiserror::Error;

use crate::state::{EngineStatus, Intent};

/// Failure to bring up a timing process
#[derive(Error, Debug)]
pub enum TimingError {
    #[error("failed to build timing runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to spawn timing thread: {0}")]
    Thread(#[source] std::io::Error),

    #[error("no async runtime available for the in-context timer")]
    NoRuntime,

    #[error("timing process has stopped")]
    Closed,
}

/// An intent that is not enabled in the engine's current state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentRejected {
    #[error("{intent} is not available while {status}")]
    NotAvailable { intent: &'static str, status: EngineStatus },

    #[error("invalid {field} duration: {input:?}")]
    InvalidDuration { field: &'static str, input: String },
}

/// Failure to deliver an intent to the engine task
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Rejected(#[from] IntentRejected),

    #[error("timer engine is not running")]
    EngineUnavailable,
}

impl IntentRejected {
    pub fn not_available(intent: &Intent, status: EngineStatus) -> Self {
        IntentRejected::NotAvailable { intent: intent.name(), status }
    }
}
