//! Message protocol between the engine and the timing process

use serde::{Deserialize, Serialize};

/// Commands sent from the controlling context to the timing process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Begin (or resume) a countdown of `duration_seconds`, cancelling any prior one
    Start { duration_seconds: u64 },
    Pause,
    Reset,
}

/// Events emitted by the timing process back to the controlling context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimingEvent {
    Tick { remaining_seconds: u64 },
    Complete,
    Paused { remaining_seconds: u64 },
    Reset,
}

impl Command {
    pub fn start(duration_seconds: u64) -> Self {
        Command::Start { duration_seconds }
    }
}

impl TimingEvent {
    /// Terminal events end a countdown run; no tick follows them until the next start
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TimingEvent::Tick { .. })
    }
}
