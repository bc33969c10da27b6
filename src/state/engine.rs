//! Work/break state machine
//!
//! `TimerEngine` is a synchronous state machine. Intents from the UI and events from the
//! timing process go in; [`Effect`]s come out and are carried out by the engine task.
//! Phase changes happen only when the timing process reports a finished countdown.

use serde::Serialize;
use tracing::{debug, info};

use super::{
    clock_face, Controls, Durations, EngineStatus, MinutesInput, Phase, Stats,
};
use crate::{error::IntentRejected, protocol::{Command, TimingEvent}};

/// Requests issued by the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    StartWork,
    StartBreak,
    Pause,
    Reset,
    SetDuration { phase: Phase, input: MinutesInput },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::StartWork => "start-work",
            Intent::StartBreak => "start-break",
            Intent::Pause => "pause",
            Intent::Reset => "reset",
            Intent::SetDuration { phase: Phase::Work, .. } => "set-work-duration",
            Intent::SetDuration { phase: Phase::Break, .. } => "set-break-duration",
        }
    }
}

/// Work the engine asks its surroundings to do
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Forward a command to the timing process
    Send(Command),
    /// A work cycle was counted; carries the updated stats
    CycleCompleted(Stats),
    /// A phase ran to completion
    PhaseEnded(Phase),
    /// A work cycle ended and a break suggestion is due
    WorkCycleEnded,
}

/// Serializable view of the engine for the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineView {
    pub status: EngineStatus,
    pub phase: Phase,
    pub is_paused: bool,
    pub remaining_seconds: u64,
    pub display: String,
    pub controls: Controls,
    pub stats: Stats,
    pub durations: Durations,
}

#[derive(Debug)]
pub struct TimerEngine {
    status: EngineStatus,
    remaining_seconds: u64,
    durations: Durations,
    stats: Stats,
    /// A pause was sent and its `Paused` reply has not arrived yet
    awaiting_pause: bool,
    /// Resets sent whose `Reset` reply has not arrived yet; events before it are stale
    pending_resets: u32,
}

impl TimerEngine {
    pub fn new(durations: Durations) -> Self {
        Self::with_stats(durations, Stats::new())
    }

    pub fn with_stats(durations: Durations, stats: Stats) -> Self {
        Self {
            status: EngineStatus::Idle,
            remaining_seconds: durations.seconds(Phase::Work),
            durations,
            stats,
            awaiting_pause: false,
            pending_resets: 0,
        }
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn phase(&self) -> Phase {
        self.status.phase()
    }

    pub fn is_paused(&self) -> bool {
        self.status.is_paused()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    /// Controls currently on offer, derived from state alone
    pub fn controls(&self) -> Controls {
        let settled = !self.awaiting_pause && self.remaining_seconds > 0;
        Controls {
            can_start_work: settled
                && matches!(self.status, EngineStatus::Idle | EngineStatus::PausedWork),
            can_start_break: settled && self.status == EngineStatus::PausedBreak,
            can_pause: self.status.is_running(),
            can_reset: true,
        }
    }

    pub fn view(&self) -> EngineView {
        EngineView {
            status: self.status,
            phase: self.phase(),
            is_paused: self.is_paused(),
            remaining_seconds: self.remaining_seconds,
            display: clock_face(self.remaining_seconds),
            controls: self.controls(),
            stats: self.stats.clone(),
            durations: self.durations,
        }
    }

    /// Apply a UI intent. Unavailable intents leave the engine untouched; an invalid
    /// duration is stored (disabling start) and reported back as an error.
    pub fn handle_intent(&mut self, intent: Intent) -> Result<Vec<Effect>, IntentRejected> {
        let controls = self.controls();
        match intent {
            Intent::StartWork if controls.can_start_work => {
                Ok(self.start(EngineStatus::RunningWork))
            }
            Intent::StartBreak if controls.can_start_break => {
                Ok(self.start(EngineStatus::RunningBreak))
            }
            Intent::Pause if controls.can_pause => {
                self.status = self.status.paused();
                self.awaiting_pause = true;
                info!("Pausing {} countdown", self.phase());
                Ok(vec![Effect::Send(Command::Pause)])
            }
            Intent::Reset => {
                self.status = EngineStatus::PausedWork;
                self.remaining_seconds = self.durations.seconds(Phase::Work);
                self.awaiting_pause = false;
                self.pending_resets += 1;
                info!("Timer reset to {}", clock_face(self.remaining_seconds));
                Ok(vec![Effect::Send(Command::Reset)])
            }
            Intent::SetDuration { phase, input } => self.set_duration(phase, input),
            intent => Err(IntentRejected::not_available(&intent, self.status)),
        }
    }

    /// Apply an event from the timing process. Events that make no sense in the current
    /// state are dropped.
    pub fn handle_event(&mut self, event: TimingEvent) -> Vec<Effect> {
        if self.pending_resets > 0 {
            if event == TimingEvent::Reset {
                self.pending_resets -= 1;
            } else {
                debug!("Dropping {:?} issued before reset", event);
            }
            return Vec::new();
        }

        match event {
            TimingEvent::Tick { remaining_seconds } if self.status.is_running() => {
                self.remaining_seconds = remaining_seconds;
                Vec::new()
            }
            TimingEvent::Paused { remaining_seconds } if self.awaiting_pause => {
                self.awaiting_pause = false;
                self.remaining_seconds = remaining_seconds;
                if remaining_seconds == 0 {
                    // Paused right on the deadline: the phase is over
                    self.complete_phase()
                } else {
                    Vec::new()
                }
            }
            TimingEvent::Complete if self.status.is_running() || self.awaiting_pause => {
                self.awaiting_pause = false;
                self.complete_phase()
            }
            TimingEvent::Tick { .. }
            | TimingEvent::Paused { .. }
            | TimingEvent::Complete
            | TimingEvent::Reset => {
                debug!("Ignoring {:?} while {}", event, self.status);
                Vec::new()
            }
        }
    }

    /// The timing process was replaced. Any countdown it held is gone, so settle into the
    /// paused state of the current phase with the last reported remaining time.
    pub fn timing_lost(&mut self) {
        self.status = self.status.paused();
        self.awaiting_pause = false;
        self.pending_resets = 0;
        info!("Countdown paused at {} after losing the timing process", clock_face(self.remaining_seconds));
    }

    fn start(&mut self, running: EngineStatus) -> Vec<Effect> {
        self.status = running;
        info!(
            "Starting {} countdown from {}",
            self.phase(),
            clock_face(self.remaining_seconds)
        );
        vec![Effect::Send(Command::start(self.remaining_seconds))]
    }

    fn set_duration(
        &mut self,
        phase: Phase,
        input: MinutesInput,
    ) -> Result<Vec<Effect>, IntentRejected> {
        let minutes = input.parse();
        self.durations.set(phase, minutes);

        // Live edit applies only while resting in the edited phase
        if self.status.is_paused() && self.phase() == phase && !self.awaiting_pause {
            self.remaining_seconds = self.durations.seconds(phase);
        }

        match minutes {
            Some(minutes) => {
                info!("{} duration set to {} minutes", phase, minutes);
                Ok(Vec::new())
            }
            None => Err(IntentRejected::InvalidDuration {
                field: match phase {
                    Phase::Work => "work",
                    Phase::Break => "break",
                },
                input: input.to_string(),
            }),
        }
    }

    fn complete_phase(&mut self) -> Vec<Effect> {
        match self.phase() {
            Phase::Work => {
                let minutes = self.durations.work_minutes.unwrap_or(0);
                self.stats.record_work_cycle(minutes);
                self.status = EngineStatus::PausedBreak;
                self.remaining_seconds = self.durations.seconds(Phase::Break);
                info!(
                    "Work cycle completed ({} today, {})",
                    self.stats.cycles_completed,
                    self.stats.total_time()
                );
                vec![
                    Effect::CycleCompleted(self.stats.clone()),
                    Effect::PhaseEnded(Phase::Work),
                    Effect::WorkCycleEnded,
                ]
            }
            Phase::Break => {
                self.status = EngineStatus::PausedWork;
                self.remaining_seconds = self.durations.seconds(Phase::Work);
                info!("Break completed");
                vec![Effect::PhaseEnded(Phase::Break)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(work: u32, brk: u32) -> TimerEngine {
        TimerEngine::new(Durations::new(work, brk))
    }

    /// Drive a full countdown of the current phase to completion
    fn run_to_completion(engine: &mut TimerEngine, intent: Intent) -> Vec<Effect> {
        let effects = engine.handle_intent(intent).unwrap();
        let Some(Effect::Send(Command::Start { duration_seconds })) = effects.first().cloned() else {
            panic!("expected a start command, got {effects:?}");
        };
        for remaining in (0..=duration_seconds).rev() {
            assert!(engine.handle_event(TimingEvent::Tick { remaining_seconds: remaining }).is_empty());
        }
        engine.handle_event(TimingEvent::Complete)
    }

    #[test]
    fn starts_idle_in_work_with_full_duration() {
        let engine = engine(25, 5);
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert_eq!(engine.phase(), Phase::Work);
        assert!(engine.is_paused());
        assert_eq!(engine.remaining_seconds(), 1500);
        assert_eq!(
            engine.controls(),
            Controls { can_start_work: true, can_start_break: false, can_pause: false, can_reset: true }
        );
    }

    #[test]
    fn start_work_sends_full_duration() {
        let mut engine = engine(25, 5);
        let effects = engine.handle_intent(Intent::StartWork).unwrap();
        assert_eq!(effects, vec![Effect::Send(Command::start(1500))]);
        assert_eq!(engine.status(), EngineStatus::RunningWork);
        assert_eq!(
            engine.controls(),
            Controls { can_start_work: false, can_start_break: false, can_pause: true, can_reset: true }
        );
    }

    #[test]
    fn completing_work_moves_to_break_and_counts_a_cycle() {
        let mut engine = engine(1, 1);
        let effects = run_to_completion(&mut engine, Intent::StartWork);

        assert_eq!(engine.status(), EngineStatus::PausedBreak);
        assert_eq!(engine.remaining_seconds(), 60);
        assert_eq!(engine.stats().cycles_completed, 1);
        assert_eq!(engine.stats().total_work_minutes, 1);
        assert_eq!(
            engine.controls(),
            Controls { can_start_work: false, can_start_break: true, can_pause: false, can_reset: true }
        );
        assert_eq!(effects.len(), 3);
        assert!(matches!(effects[0], Effect::CycleCompleted(ref s) if s.cycles_completed == 1));
        assert_eq!(effects[1], Effect::PhaseEnded(Phase::Work));
        assert_eq!(effects[2], Effect::WorkCycleEnded);
    }

    #[test]
    fn completing_break_returns_to_work_without_touching_stats() {
        let mut engine = engine(2, 1);
        run_to_completion(&mut engine, Intent::StartWork);
        let effects = run_to_completion(&mut engine, Intent::StartBreak);

        assert_eq!(effects, vec![Effect::PhaseEnded(Phase::Break)]);
        assert_eq!(engine.status(), EngineStatus::PausedWork);
        assert_eq!(engine.remaining_seconds(), 120);
        assert_eq!(engine.stats().cycles_completed, 1);
        assert_eq!(engine.stats().total_work_minutes, 2);
        assert!(engine.controls().can_start_work);
        assert!(!engine.controls().can_start_break);
    }

    #[test]
    fn stats_accrue_per_work_cycle() {
        let mut engine = engine(3, 1);
        for _ in 0..4 {
            run_to_completion(&mut engine, Intent::StartWork);
            run_to_completion(&mut engine, Intent::StartBreak);
        }
        assert_eq!(engine.stats().cycles_completed, 4);
        assert_eq!(engine.stats().total_work_minutes, 12);
    }

    #[test]
    fn pause_stores_residual_and_resume_uses_it() {
        let mut engine = engine(1, 1);
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 45 });

        let effects = engine.handle_intent(Intent::Pause).unwrap();
        assert_eq!(effects, vec![Effect::Send(Command::Pause)]);
        assert_eq!(engine.status(), EngineStatus::PausedWork);
        // Residual not known yet, so start stays disabled
        assert!(!engine.controls().can_start_work);

        engine.handle_event(TimingEvent::Paused { remaining_seconds: 44 });
        assert_eq!(engine.remaining_seconds(), 44);
        assert!(engine.controls().can_start_work);

        let effects = engine.handle_intent(Intent::StartWork).unwrap();
        assert_eq!(effects, vec![Effect::Send(Command::start(44))]);
    }

    #[test]
    fn complete_racing_a_pause_still_completes() {
        let mut engine = engine(1, 1);
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_intent(Intent::Pause).unwrap();

        let effects = engine.handle_event(TimingEvent::Complete);
        assert!(effects.contains(&Effect::WorkCycleEnded));
        assert_eq!(engine.status(), EngineStatus::PausedBreak);
        assert!(engine.controls().can_start_break);
    }

    #[test]
    fn paused_at_zero_completes_the_phase() {
        let mut engine = engine(1, 1);
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_intent(Intent::Pause).unwrap();

        let effects = engine.handle_event(TimingEvent::Paused { remaining_seconds: 0 });
        assert!(effects.contains(&Effect::PhaseEnded(Phase::Work)));
        assert_eq!(engine.status(), EngineStatus::PausedBreak);
        assert_eq!(engine.remaining_seconds(), 60);
    }

    #[test]
    fn reset_twice_is_idempotent() {
        let mut engine = engine(25, 5);
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 1200 });

        for _ in 0..2 {
            let effects = engine.handle_intent(Intent::Reset).unwrap();
            assert_eq!(effects, vec![Effect::Send(Command::Reset)]);
            assert_eq!(engine.status(), EngineStatus::PausedWork);
            assert_eq!(engine.phase(), Phase::Work);
            assert!(engine.is_paused());
            assert_eq!(engine.remaining_seconds(), 1500);
        }

        engine.handle_event(TimingEvent::Reset);
        engine.handle_event(TimingEvent::Reset);
        assert_eq!(engine.status(), EngineStatus::PausedWork);
        assert_eq!(engine.remaining_seconds(), 1500);
    }

    #[test]
    fn events_issued_before_reset_are_dropped() {
        let mut engine = engine(1, 1);
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_intent(Intent::Reset).unwrap();
        engine.handle_intent(Intent::StartWork).unwrap();

        // Stale tail of the first run
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 1 });
        assert!(engine.handle_event(TimingEvent::Complete).is_empty());
        assert_eq!(engine.status(), EngineStatus::RunningWork);
        assert_eq!(engine.stats().cycles_completed, 0);

        engine.handle_event(TimingEvent::Reset);
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 60 });
        assert_eq!(engine.remaining_seconds(), 60);
        let effects = engine.handle_event(TimingEvent::Complete);
        assert!(effects.contains(&Effect::WorkCycleEnded));
    }

    #[test]
    fn protocol_violations_are_ignored() {
        let mut engine = engine(25, 5);
        assert!(engine.handle_event(TimingEvent::Complete).is_empty());
        assert!(engine.handle_event(TimingEvent::Paused { remaining_seconds: 3 }).is_empty());
        assert!(engine.handle_event(TimingEvent::Tick { remaining_seconds: 3 }).is_empty());
        assert!(engine.handle_event(TimingEvent::Reset).is_empty());
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert_eq!(engine.remaining_seconds(), 1500);
    }

    #[test]
    fn unavailable_intents_are_rejected_without_change() {
        let mut engine = engine(25, 5);
        assert!(matches!(
            engine.handle_intent(Intent::StartBreak),
            Err(IntentRejected::NotAvailable { intent: "start-break", status: EngineStatus::Idle })
        ));
        assert!(engine.handle_intent(Intent::Pause).is_err());

        engine.handle_intent(Intent::StartWork).unwrap();
        assert!(engine.handle_intent(Intent::StartWork).is_err());
        assert_eq!(engine.status(), EngineStatus::RunningWork);
    }

    #[test]
    fn editing_duration_while_paused_updates_remaining() {
        let mut engine = engine(25, 5);
        engine.handle_intent(Intent::SetDuration { phase: Phase::Work, input: 50u32.into() }).unwrap();
        assert_eq!(engine.remaining_seconds(), 3000);

        // Break edits don't touch the work countdown
        engine.handle_intent(Intent::SetDuration { phase: Phase::Break, input: 10u32.into() }).unwrap();
        assert_eq!(engine.remaining_seconds(), 3000);
        assert_eq!(engine.durations().break_minutes, Some(10));
    }

    #[test]
    fn editing_duration_while_running_waits_for_next_start() {
        let mut engine = engine(1, 1);
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 30 });
        engine.handle_intent(Intent::SetDuration { phase: Phase::Work, input: 2u32.into() }).unwrap();
        assert_eq!(engine.remaining_seconds(), 30);

        engine.handle_event(TimingEvent::Complete);
        engine.handle_intent(Intent::Reset).unwrap();
        assert_eq!(engine.remaining_seconds(), 120);
    }

    #[test]
    fn invalid_duration_disables_start_until_corrected() {
        let mut engine = engine(25, 5);
        let err = engine
            .handle_intent(Intent::SetDuration { phase: Phase::Work, input: "-5".into() })
            .unwrap_err();
        assert!(matches!(err, IntentRejected::InvalidDuration { field: "work", .. }));
        assert_eq!(engine.remaining_seconds(), 0);
        assert!(!engine.controls().can_start_work);
        assert!(engine.handle_intent(Intent::StartWork).is_err());

        engine.handle_intent(Intent::SetDuration { phase: Phase::Work, input: "20".into() }).unwrap();
        assert!(engine.controls().can_start_work);
        assert_eq!(engine.remaining_seconds(), 1200);
    }

    #[test]
    fn losing_timing_pauses_on_last_tick() {
        let mut engine = engine(1, 1);
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 20 });
        engine.handle_intent(Intent::Reset).unwrap();
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 60 });

        engine.timing_lost();
        assert_eq!(engine.status(), EngineStatus::PausedWork);
        assert_eq!(engine.remaining_seconds(), 60);
        assert!(engine.controls().can_start_work);

        // No reset acknowledgement is awaited from the replacement
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 59 });
        assert_eq!(engine.remaining_seconds(), 59);
    }

    #[test]
    fn view_reflects_state() {
        let mut engine = engine(1, 1);
        engine.handle_intent(Intent::StartWork).unwrap();
        engine.handle_event(TimingEvent::Tick { remaining_seconds: 59 });

        let view = engine.view();
        assert_eq!(view.status, EngineStatus::RunningWork);
        assert_eq!(view.display, "00:59");
        assert!(!view.is_paused);
        assert!(view.controls.can_pause);
    }
}
