//! Deadline-based countdown loop shared by every timing process implementation

use std::time::Duration;

use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, trace, warn};

use crate::protocol::{Command, TimingEvent};

/// Default cadence between progress ticks
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(100);

/// Ground-truth countdown state, owned exclusively by the timing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Running { deadline: Instant },
    Paused { residual: u64 },
}

/// Whole seconds left until `deadline`, rounded up and clamped at zero
pub fn remaining_seconds(deadline: Instant, now: Instant) -> u64 {
    let left = deadline.saturating_duration_since(now).as_millis() as u64;
    left.div_ceil(1000)
}

struct Countdown {
    state: CountdownState,
    cadence: Duration,
    ticker: Option<Interval>,
    events: UnboundedSender<TimingEvent>,
}

impl Countdown {
    fn emit(&self, event: TimingEvent) -> bool {
        trace!("Timing event: {:?}", event);
        self.events.send(event).is_ok()
    }

    fn apply(&mut self, command: Command) -> bool {
        debug!("Timing command: {:?}", command);
        match command {
            Command::Start { duration_seconds: 0 } => {
                warn!("Ignoring start with a zero duration");
                true
            }
            Command::Start { duration_seconds } => {
                let now = Instant::now();
                let deadline = now + Duration::from_secs(duration_seconds);
                self.state = CountdownState::Running { deadline };

                let mut ticker = interval_at(now + self.cadence, self.cadence);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.ticker = Some(ticker);

                self.emit(TimingEvent::Tick { remaining_seconds: duration_seconds })
            }
            Command::Pause => match self.state {
                CountdownState::Running { deadline } => {
                    self.ticker = None;
                    let residual = remaining_seconds(deadline, Instant::now());
                    self.state = CountdownState::Paused { residual };
                    self.emit(TimingEvent::Paused { remaining_seconds: residual })
                }
                CountdownState::Idle | CountdownState::Paused { .. } => {
                    debug!("Pause received with no running countdown");
                    true
                }
            },
            Command::Reset => {
                self.ticker = None;
                self.state = CountdownState::Idle;
                self.emit(TimingEvent::Reset)
            }
        }
    }

    fn on_tick(&mut self) -> bool {
        let CountdownState::Running { deadline } = self.state else {
            self.ticker = None;
            return true;
        };

        let remaining = remaining_seconds(deadline, Instant::now());
        if !self.emit(TimingEvent::Tick { remaining_seconds: remaining }) {
            return false;
        }
        if remaining == 0 {
            self.ticker = None;
            self.state = CountdownState::Idle;
            return self.emit(TimingEvent::Complete);
        }
        true
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Run the countdown until the command channel closes or the event receiver is dropped.
///
/// Commands are always handled before a pending cadence tick, so a `Reset` or a new
/// `Start` cancels the previous cadence before it can fire again.
pub async fn run_countdown(
    mut commands: UnboundedReceiver<Command>,
    events: UnboundedSender<TimingEvent>,
    cadence: Duration,
) {
    let mut countdown = Countdown {
        state: CountdownState::Idle,
        cadence,
        ticker: None,
        events,
    };

    loop {
        let delivered = tokio::select! {
            biased;

            command = commands.recv() => match command {
                Some(command) => countdown.apply(command),
                None => {
                    debug!("Command channel closed, stopping countdown loop");
                    break;
                }
            },

            _ = next_tick(&mut countdown.ticker) => countdown.on_tick(),
        };

        if !delivered {
            debug!("Event receiver dropped, stopping countdown loop");
            break;
        }
    }
}
