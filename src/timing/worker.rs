//! Timing process running on a dedicated thread with its own runtime
//!
//! The controlling runtime can be saturated by request handling without delaying the
//! countdown cadence, since the worker schedules its ticks independently.

use std::{sync::mpsc as std_mpsc, thread, time::Duration};

use tokio::{
    runtime::{Builder, Handle, RuntimeFlavor},
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task,
};
use tracing::debug;

use super::{countdown::run_countdown, TimingBackend, TimingProcess};
use crate::{
    error::TimingError,
    protocol::{Command, TimingEvent},
};

/// Out-of-context timing process
#[derive(Debug)]
pub struct WorkerTimer {
    commands: UnboundedSender<Command>,
}

impl WorkerTimer {
    pub fn spawn(cadence: Duration) -> Result<(Self, UnboundedReceiver<TimingEvent>), TimingError> {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);

        // The runtime is built on the worker thread so that it is never dropped
        // from inside the caller's async context.
        thread::Builder::new()
            .name("timing-worker".to_string())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_time().build() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                runtime.block_on(run_countdown(command_rx, event_tx, cadence));
                debug!("Timing worker thread exiting");
            })
            .map_err(TimingError::Thread)?;

        match wait_ready(&ready_rx) {
            Ok(Ok(())) => Ok((Self { commands }, events)),
            Ok(Err(e)) => Err(TimingError::Runtime(e)),
            Err(_) => Err(TimingError::Closed),
        }
    }
}

/// Wait for the worker's runtime to come up. On a multi-thread runtime the wait is
/// announced with `block_in_place` so the caller's other tasks move to another thread.
fn wait_ready<T>(ready: &std_mpsc::Receiver<T>) -> Result<T, std_mpsc::RecvError> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            task::block_in_place(|| ready.recv())
        }
        // block_in_place panics on a current-thread runtime
        _ => ready.recv(),
    }
}

impl TimingProcess for WorkerTimer {
    fn send(&self, command: Command) -> Result<(), TimingError> {
        self.commands.send(command).map_err(|_| TimingError::Closed)
    }

    fn backend(&self) -> TimingBackend {
        TimingBackend::Worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Instant};

    #[tokio::test]
    async fn worker_completes_on_wall_clock_time() {
        let (timer, mut events) = WorkerTimer::spawn(Duration::from_millis(50)).unwrap();
        let started = Instant::now();
        timer.send(Command::start(1)).unwrap();

        let mut ticks = Vec::new();
        let terminal = timeout(Duration::from_secs(5), async {
            loop {
                match events.recv().await {
                    Some(TimingEvent::Tick { remaining_seconds }) => ticks.push(remaining_seconds),
                    other => return other,
                }
            }
        })
        .await
        .expect("worker did not complete in time");

        assert_eq!(terminal, Some(TimingEvent::Complete));
        assert_eq!(ticks.first(), Some(&1));
        assert!(ticks.windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_worker() {
        let (timer, mut events) = WorkerTimer::spawn(Duration::from_millis(50)).unwrap();
        timer.send(Command::Reset).unwrap();
        assert_eq!(events.recv().await, Some(TimingEvent::Reset));

        drop(timer);
        let closed = timeout(Duration::from_secs(2), events.recv()).await.unwrap();
        assert_eq!(closed, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn spawns_inside_a_multi_thread_runtime() {
        let heartbeat = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
        });

        let (timer, mut events) = WorkerTimer::spawn(Duration::from_millis(50)).unwrap();
        timer.send(Command::Reset).unwrap();
        assert_eq!(events.recv().await, Some(TimingEvent::Reset));

        timeout(Duration::from_secs(2), heartbeat).await.unwrap().unwrap();
    }

    #[test]
    fn spawns_outside_any_runtime() {
        let (timer, events) = WorkerTimer::spawn(Duration::from_millis(50)).unwrap();
        assert_eq!(timer.backend(), TimingBackend::Worker);
        drop(events);
    }
}
