//! State management module
//!
//! This module contains the timer state machine and the state shared with the HTTP layer.

pub mod app_state;
pub mod break_tasks;
pub mod durations;
pub mod engine;
pub mod stats;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, EngineLink, IntentRequest, TimerSnapshot};
pub use break_tasks::{BreakTask, BreakTasks};
pub use durations::{Durations, MinutesInput};
pub use engine::{Effect, EngineView, Intent, TimerEngine};
pub use stats::Stats;
pub use timer_state::{clock_face, Controls, EngineStatus, Phase};
