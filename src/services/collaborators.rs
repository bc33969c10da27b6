//! Side effects the engine triggers but does not implement

use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use super::sound::play_sound;
use crate::state::{BreakTasks, Phase, Stats};

/// Outward hooks called by the engine task. Calls must return promptly; any error is
/// logged by the caller and never reaches the timer state.
pub trait Collaborators: Send + Sync {
    /// A work cycle was counted
    fn on_cycle_completed(&self, stats: &Stats) -> anyhow::Result<()>;

    /// A phase ran out, time to ring a bell
    fn on_phase_end(&self, phase: Phase) -> anyhow::Result<()>;

    /// A work cycle ended, time to suggest something to do during the break
    fn on_work_cycle_end(&self) -> anyhow::Result<()>;
}

/// Default collaborators: shell-command sounds and break task suggestions
#[derive(Debug, Clone)]
pub struct AppCollaborators {
    pub work_end_sound: Option<String>,
    pub break_end_sound: Option<String>,
    pub break_tasks: Arc<BreakTasks>,
}

impl AppCollaborators {
    pub fn new(
        work_end_sound: Option<String>,
        break_end_sound: Option<String>,
        break_tasks: Arc<BreakTasks>,
    ) -> Self {
        Self { work_end_sound, break_end_sound, break_tasks }
    }

    fn sound_for(&self, phase: Phase) -> Option<&str> {
        match phase {
            Phase::Work => self.work_end_sound.as_deref(),
            Phase::Break => self.break_end_sound.as_deref(),
        }
    }
}

impl Collaborators for AppCollaborators {
    fn on_cycle_completed(&self, stats: &Stats) -> anyhow::Result<()> {
        info!(
            "Stats for {}: {} cycles, {} of work",
            stats.date,
            stats.cycles_completed,
            stats.total_time()
        );
        Ok(())
    }

    fn on_phase_end(&self, phase: Phase) -> anyhow::Result<()> {
        let Some(command_line) = self.sound_for(phase) else {
            debug!("No sound configured for end of {}", phase);
            return Ok(());
        };

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| anyhow!("cannot play {} end sound: {}", phase, e))?;
        let command_line = command_line.to_string();
        runtime.spawn(async move {
            if let Err(e) = play_sound(&command_line).await {
                warn!("Sound playback failed: {}", e);
            }
        });
        Ok(())
    }

    fn on_work_cycle_end(&self) -> anyhow::Result<()> {
        match self.break_tasks.suggest().map_err(|e| anyhow!(e))? {
            Some(task) => info!("Break suggestion: {}", task),
            None => debug!("No break tasks to suggest"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_cycle_end_records_a_suggestion() {
        let tasks = Arc::new(BreakTasks::new());
        tasks.add("look out the window").unwrap();
        let collaborators = AppCollaborators::new(None, None, Arc::clone(&tasks));

        collaborators.on_work_cycle_end().unwrap();
        assert_eq!(tasks.last_suggestion().as_deref(), Some("look out the window"));
    }

    #[test]
    fn missing_sound_is_not_an_error() {
        let collaborators = AppCollaborators::new(None, None, Arc::new(BreakTasks::new()));
        assert!(collaborators.on_phase_end(Phase::Work).is_ok());
    }

    #[test]
    fn sound_outside_a_runtime_is_an_error() {
        let collaborators =
            AppCollaborators::new(Some("true".to_string()), None, Arc::new(BreakTasks::new()));
        assert!(collaborators.on_phase_end(Phase::Work).is_err());
        assert!(collaborators.on_phase_end(Phase::Break).is_ok());
    }
}
