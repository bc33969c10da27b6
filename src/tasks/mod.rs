//! Background tasks module
//!
//! This module contains the task that runs the timer engine alongside the HTTP server.

pub mod engine_task;

// Re-export main types
pub use engine_task::EngineTask;
