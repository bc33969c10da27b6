//! Timing process module
//!
//! A timing process owns the deadline of the running countdown and reports progress
//! through [`TimingEvent`]s. It knows nothing about work or break phases.

pub mod countdown;
pub mod in_context;
pub mod worker;

use std::{fmt, time::Duration};

use clap::ValueEnum;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::{
    error::TimingError,
    protocol::{Command, TimingEvent},
};

pub use countdown::{remaining_seconds, run_countdown, CountdownState, DEFAULT_CADENCE};
pub use in_context::InContextTimer;
pub use worker::WorkerTimer;

/// Which timing process implementation is driving the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TimingBackend {
    /// Dedicated thread with its own runtime
    Worker,
    /// Task on the controlling runtime
    InContext,
}

impl fmt::Display for TimingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingBackend::Worker => write!(f, "worker"),
            TimingBackend::InContext => write!(f, "in-context"),
        }
    }
}

/// Command side of a timing process. Events arrive on the receiver returned at spawn time.
pub trait TimingProcess: Send {
    fn send(&self, command: Command) -> Result<(), TimingError>;

    fn backend(&self) -> TimingBackend;
}

/// A running timing process together with its event stream
pub struct TimingHandle {
    pub process: Box<dyn TimingProcess>,
    pub events: UnboundedReceiver<TimingEvent>,
    /// Set when the preferred backend could not be created
    pub notice: Option<String>,
}

impl fmt::Debug for TimingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimingHandle")
            .field("backend", &self.process.backend())
            .field("notice", &self.notice)
            .finish()
    }
}

/// Spawn the in-context timing process on the current runtime
pub fn spawn_in_context(cadence: Duration) -> Result<TimingHandle, TimingError> {
    let (timer, events) = InContextTimer::spawn(cadence)?;
    Ok(TimingHandle {
        process: Box::new(timer),
        events,
        notice: None,
    })
}

/// Spawn the preferred timing process, falling back to the in-context loop when the
/// worker cannot be created.
pub fn spawn_timing_process(
    preferred: TimingBackend,
    cadence: Duration,
) -> Result<TimingHandle, TimingError> {
    spawn_timing_process_with(preferred, cadence, WorkerTimer::spawn)
}

/// Same as [`spawn_timing_process`] with a caller-provided worker constructor
pub fn spawn_timing_process_with<P, F>(
    preferred: TimingBackend,
    cadence: Duration,
    spawn_worker: F,
) -> Result<TimingHandle, TimingError>
where
    P: TimingProcess + 'static,
    F: FnOnce(Duration) -> Result<(P, UnboundedReceiver<TimingEvent>), TimingError>,
{
    if preferred == TimingBackend::InContext {
        info!("Using in-context timing process");
        return spawn_in_context(cadence);
    }

    match spawn_worker(cadence) {
        Ok((timer, events)) => {
            info!("Timing worker thread started");
            Ok(TimingHandle {
                process: Box::new(timer),
                events,
                notice: None,
            })
        }
        Err(e) => {
            warn!("Timing worker unavailable ({}), falling back to in-context timer", e);
            let mut handle = spawn_in_context(cadence)?;
            handle.notice = Some(format!(
                "Background timer unavailable ({e}); running the countdown in-process"
            ));
            Ok(handle)
        }
    }
}
