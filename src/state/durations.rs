//! Configured phase durations and their raw user input

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Phase;

/// Raw duration input as received from the UI, either a JSON number or text
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MinutesInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MinutesInput {
    /// Positive whole minutes, or `None` for anything else
    pub fn parse(&self) -> Option<u32> {
        let minutes = match self {
            MinutesInput::Integer(n) => *n,
            MinutesInput::Float(_) => return None,
            MinutesInput::Text(text) => text.trim().parse::<i64>().ok()?,
        };
        u32::try_from(minutes).ok().filter(|&m| m > 0)
    }
}

impl From<u32> for MinutesInput {
    fn from(minutes: u32) -> Self {
        MinutesInput::Integer(i64::from(minutes))
    }
}

impl From<&str> for MinutesInput {
    fn from(text: &str) -> Self {
        MinutesInput::Text(text.to_string())
    }
}

impl fmt::Display for MinutesInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinutesInput::Integer(n) => write!(f, "{n}"),
            MinutesInput::Float(n) => write!(f, "{n}"),
            MinutesInput::Text(text) => f.write_str(text),
        }
    }
}

/// Work and break durations. `None` marks an invalid entry that disables starting that phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Durations {
    pub work_minutes: Option<u32>,
    pub break_minutes: Option<u32>,
}

impl Durations {
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        Self {
            work_minutes: Some(work_minutes).filter(|&m| m > 0),
            break_minutes: Some(break_minutes).filter(|&m| m > 0),
        }
    }

    pub fn minutes(&self, phase: Phase) -> Option<u32> {
        match phase {
            Phase::Work => self.work_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    /// Full length of a phase in seconds, zero when the entry is invalid
    pub fn seconds(&self, phase: Phase) -> u64 {
        self.minutes(phase).map_or(0, |m| u64::from(m) * 60)
    }

    pub fn set(&mut self, phase: Phase, minutes: Option<u32>) {
        match phase {
            Phase::Work => self.work_minutes = minutes,
            Phase::Break => self.break_minutes = minutes,
        }
    }
}
