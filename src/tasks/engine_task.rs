//! Engine background task

use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    protocol::TimingEvent,
    services::Collaborators,
    state::{AppState, BreakTasks, Effect, EngineLink, IntentRequest, TimerEngine, TimerSnapshot},
    timing::{spawn_in_context, TimingHandle},
};

/// Owns the engine and the timing process and keeps the published snapshot current
pub struct EngineTask {
    engine: TimerEngine,
    timing: TimingHandle,
    collaborators: Arc<dyn Collaborators>,
    cadence: Duration,
    /// False once the timing process is gone and no replacement could be started
    timing_alive: bool,
}

impl EngineTask {
    pub fn new(
        engine: TimerEngine,
        timing: TimingHandle,
        collaborators: Arc<dyn Collaborators>,
        cadence: Duration,
    ) -> Self {
        Self { engine, timing, collaborators, cadence, timing_alive: true }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            engine: self.engine.view(),
            timing_backend: self.timing.process.backend(),
            notice: self.timing.notice.clone(),
        }
    }

    /// Create the shared app state wired to this engine and spawn the engine task
    pub fn spawn(
        self,
        port: u16,
        host: String,
        break_tasks: Arc<BreakTasks>,
    ) -> (Arc<AppState>, JoinHandle<()>) {
        let (state, link) = AppState::new(port, host, self.snapshot(), break_tasks);
        let task = tokio::spawn(self.run(link));
        (Arc::new(state), task)
    }

    /// Serve intents and timing events until every intent sender is gone
    pub async fn run(mut self, link: EngineLink) {
        info!("Starting timer engine task ({} timing)", self.timing.process.backend());

        let EngineLink { mut intents, snapshots } = link;
        self.publish(&snapshots);

        loop {
            tokio::select! {
                request = intents.recv() => match request {
                    Some(request) => self.handle_request(request, &snapshots),
                    None => {
                        info!("Intent channel closed, stopping timer engine task");
                        break;
                    }
                },

                event = self.timing.events.recv(), if self.timing_alive => match event {
                    Some(event) => {
                        self.handle_event(event);
                        self.publish(&snapshots);
                    }
                    None => {
                        self.recover_timing();
                        self.publish(&snapshots);
                    }
                },
            }
        }
    }

    /// Apply an intent and answer it. The snapshot is published before the reply, so a
    /// requester that reads the watch after its answer never sees the previous state.
    fn handle_request(&mut self, request: IntentRequest, snapshots: &watch::Sender<TimerSnapshot>) {
        let IntentRequest { intent, reply } = request;
        debug!("Engine received intent: {:?}", intent);

        let verdict = match self.engine.handle_intent(intent) {
            Ok(effects) => {
                // A timing notice is shown until the next accepted intent
                if let Some(notice) = self.timing.notice.take() {
                    debug!("Clearing timing notice: {}", notice);
                }
                self.apply(effects);
                Ok(self.snapshot())
            }
            Err(rejected) => {
                info!("Intent rejected: {}", rejected);
                Err(rejected)
            }
        };

        self.publish(snapshots);
        if reply.send(verdict).is_err() {
            debug!("Intent requester went away before the reply");
        }
    }

    fn handle_event(&mut self, event: TimingEvent) {
        let effects = self.engine.handle_event(event);
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            let outcome = match &effect {
                Effect::Send(command) => self
                    .timing
                    .process
                    .send(*command)
                    .map_err(anyhow::Error::from),
                Effect::CycleCompleted(stats) => self.collaborators.on_cycle_completed(stats),
                Effect::PhaseEnded(phase) => self.collaborators.on_phase_end(*phase),
                Effect::WorkCycleEnded => self.collaborators.on_work_cycle_end(),
            };

            if let Err(e) = outcome {
                warn!("Effect {:?} failed: {:#}", effect, e);
            }
        }
    }

    /// The timing process went away. Swap in the in-context loop and pause the engine on
    /// its last known remaining time.
    fn recover_timing(&mut self) {
        error!(
            "{} timing process stopped unexpectedly, switching to in-context timer",
            self.timing.process.backend()
        );
        match spawn_in_context(self.cadence) {
            Ok(mut handle) => {
                handle.notice = Some(
                    "Background timer stopped; the countdown was paused and can be resumed"
                        .to_string(),
                );
                self.timing = handle;
                self.engine.timing_lost();
            }
            Err(e) => {
                error!("Failed to start in-context timer: {}", e);
                self.timing_alive = false;
            }
        }
    }

    fn publish(&self, snapshots: &watch::Sender<TimerSnapshot>) {
        let snapshot = self.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
