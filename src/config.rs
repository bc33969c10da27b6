//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{state::Durations, timing::TimingBackend};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pomodoro-sync")]
#[command(about = "A drift-free work/break countdown served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Work phase duration in minutes
    #[arg(short, long, default_value = "25", value_parser = clap::value_parser!(u32).range(1..))]
    pub work_minutes: u32,

    /// Break phase duration in minutes
    #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    pub break_minutes: u32,

    /// Interval between progress ticks in milliseconds
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(10..=1000))]
    pub cadence_ms: u64,

    /// Preferred timing process; the worker falls back to in-context if it cannot start
    #[arg(long, value_enum, default_value_t = TimingBackend::Worker)]
    pub timing: TimingBackend,

    /// Shell command played when a work phase ends
    #[arg(long)]
    pub work_end_sound: Option<String>,

    /// Shell command played when a break ends
    #[arg(long)]
    pub break_end_sound: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn durations(&self) -> Durations {
        Durations::new(self.work_minutes, self.break_minutes)
    }

    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }
}
