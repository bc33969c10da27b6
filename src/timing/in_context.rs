//! Timing process running as a task on the controlling runtime

use std::time::Duration;

use tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use super::{countdown::run_countdown, TimingBackend, TimingProcess};
use crate::{
    error::TimingError,
    protocol::{Command, TimingEvent},
};

/// Fallback timing process sharing the caller's runtime
#[derive(Debug)]
pub struct InContextTimer {
    commands: UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl InContextTimer {
    pub fn spawn(cadence: Duration) -> Result<(Self, UnboundedReceiver<TimingEvent>), TimingError> {
        let runtime = Handle::try_current().map_err(|_| TimingError::NoRuntime)?;

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let task = runtime.spawn(run_countdown(command_rx, event_tx, cadence));

        Ok((Self { commands, task }, events))
    }
}

impl TimingProcess for InContextTimer {
    fn send(&self, command: Command) -> Result<(), TimingError> {
        self.commands.send(command).map_err(|_| TimingError::Closed)
    }

    fn backend(&self) -> TimingBackend {
        TimingBackend::InContext
    }
}

impl Drop for InContextTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
