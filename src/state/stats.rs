//! Daily statistics and the plain-text export

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Work cycles completed during the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub cycles_completed: u32,
    pub total_work_minutes: u64,
    pub date: NaiveDate,
}

impl Stats {
    /// Empty stats dated today
    pub fn new() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            cycles_completed: 0,
            total_work_minutes: 0,
            date,
        }
    }

    /// Account for one completed work cycle
    pub fn record_work_cycle(&mut self, work_minutes: u32) {
        self.cycles_completed += 1;
        self.total_work_minutes += u64::from(work_minutes);
    }

    /// Total work time as `{hours}h {minutes}m`
    pub fn total_time(&self) -> String {
        format!("{}h {}m", self.total_work_minutes / 60, self.total_work_minutes % 60)
    }

    /// Plain-text statistics document
    pub fn report(&self) -> String {
        format!(
            "Pomodoro Statistics\n\nDate: {}\nCycles completed: {}\nTotal study time: {}\n",
            self.date.format("%Y-%m-%d"),
            self.cycles_completed,
            self.total_time(),
        )
    }

    /// File name offered for the exported document
    pub fn report_file_name(&self) -> String {
        format!("pomodoro-stats-{}.txt", self.date.format("%Y-%m-%d"))
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
