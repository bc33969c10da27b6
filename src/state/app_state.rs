//! Shared application state handed to the HTTP layer

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use super::{BreakTasks, EngineView, Intent};
use crate::{error::DispatchError, error::IntentRejected, timing::TimingBackend};

/// Capacity of the intent queue feeding the engine task
const INTENT_QUEUE: usize = 32;

/// What the UI renders: engine view plus which timing process is in charge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub engine: EngineView,
    pub timing_backend: TimingBackend,
    /// One-time notice, e.g. that the background timer was unavailable
    pub notice: Option<String>,
}

/// An intent with a reply slot for the resulting snapshot
#[derive(Debug)]
pub struct IntentRequest {
    pub intent: Intent,
    pub reply: oneshot::Sender<Result<TimerSnapshot, IntentRejected>>,
}

/// Engine-task side of the channels created by [`AppState::new`]
#[derive(Debug)]
pub struct EngineLink {
    pub intents: mpsc::Receiver<IntentRequest>,
    pub snapshots: watch::Sender<TimerSnapshot>,
}

#[derive(Debug)]
pub struct AppState {
    intent_tx: mpsc::Sender<IntentRequest>,
    snapshot_rx: watch::Receiver<TimerSnapshot>,
    pub break_tasks: Arc<BreakTasks>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create the state together with the channels the engine task will serve
    pub fn new(
        port: u16,
        host: String,
        initial: TimerSnapshot,
        break_tasks: Arc<BreakTasks>,
    ) -> (Self, EngineLink) {
        let (intent_tx, intents) = mpsc::channel(INTENT_QUEUE);
        let (snapshots, snapshot_rx) = watch::channel(initial);

        let state = Self {
            intent_tx,
            snapshot_rx,
            break_tasks,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        };
        (state, EngineLink { intents, snapshots })
    }

    /// Hand an intent to the engine task and wait for its verdict
    pub async fn dispatch(&self, intent: Intent) -> Result<TimerSnapshot, DispatchError> {
        let action = intent.name();
        let (reply, verdict) = oneshot::channel();

        self.intent_tx
            .send(IntentRequest { intent, reply })
            .await
            .map_err(|_| DispatchError::EngineUnavailable)?;

        let snapshot = verdict.await.map_err(|_| DispatchError::EngineUnavailable)??;
        debug!("Intent {} accepted", action);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(snapshot)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified of every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn break_suggestion(&self) -> Option<String> {
        self.break_tasks.last_suggestion()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
