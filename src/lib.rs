//! Pomodoro Sync - A drift-free work/break countdown service
//!
//! A timing process owns the countdown deadline and reports progress over channels;
//! the timer engine turns those reports into work/break phase changes, statistics
//! and control availability for the HTTP layer.

pub mod api;
pub mod config;
pub mod error;
pub mod protocol;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timing;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use protocol::{Command, TimingEvent};
pub use state::{AppState, Intent, Phase, TimerEngine};
pub use timing::{spawn_timing_process, TimingBackend, TimingProcess};
pub use utils::signals::shutdown_signal;
