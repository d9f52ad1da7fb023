//! `gigforge-jobs` — the Job entity and its state machine.

pub mod job;
pub mod transition;

pub use job::{Job, JobState};
pub use transition::{manual_transition, TransitionActor};
