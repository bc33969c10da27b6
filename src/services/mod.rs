//! External collaborator module
//!
//! This module contains the side effects triggered by the timer engine: sounds and
//! break task suggestions.

pub mod collaborators;
pub mod sound;

// Re-export main types
pub use collaborators::{AppCollaborators, Collaborators};
pub use sound::play_sound;
