//! Phase and engine status types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which half of the cycle is current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Work => write!(f, "work"),
            Phase::Break => write!(f, "break"),
        }
    }
}

/// Engine state machine status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Idle,
    RunningWork,
    PausedWork,
    RunningBreak,
    PausedBreak,
}

impl EngineStatus {
    pub fn phase(self) -> Phase {
        match self {
            EngineStatus::Idle | EngineStatus::RunningWork | EngineStatus::PausedWork => Phase::Work,
            EngineStatus::RunningBreak | EngineStatus::PausedBreak => Phase::Break,
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, EngineStatus::RunningWork | EngineStatus::RunningBreak)
    }

    pub fn is_paused(self) -> bool {
        !self.is_running()
    }

    /// The paused status of the same phase
    pub fn paused(self) -> Self {
        match self.phase() {
            Phase::Work => EngineStatus::PausedWork,
            Phase::Break => EngineStatus::PausedBreak,
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineStatus::Idle => "idle",
            EngineStatus::RunningWork => "running work",
            EngineStatus::PausedWork => "paused in work",
            EngineStatus::RunningBreak => "running break",
            EngineStatus::PausedBreak => "paused in break",
        };
        f.write_str(name)
    }
}

/// Which intents the UI should currently offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub can_start_work: bool,
    pub can_start_break: bool,
    pub can_pause: bool,
    pub can_reset: bool,
}

/// Format seconds as a `MM:SS` clock face
pub fn clock_face(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_phase() {
        assert_eq!(EngineStatus::Idle.phase(), Phase::Work);
        assert_eq!(EngineStatus::RunningBreak.phase(), Phase::Break);
        assert_eq!(EngineStatus::RunningBreak.paused(), EngineStatus::PausedBreak);
        assert_eq!(EngineStatus::RunningWork.paused(), EngineStatus::PausedWork);
        assert!(EngineStatus::Idle.is_paused());
    }

    #[test]
    fn clock_face_pads_minutes_and_seconds() {
        assert_eq!(clock_face(1500), "25:00");
        assert_eq!(clock_face(61), "01:01");
        assert_eq!(clock_face(0), "00:00");
        assert_eq!(clock_face(6000), "100:00");
    }
}
