//! `gigforge-applications` — the JobApplication entity.

pub mod application;

pub use application::{ApplicationState, JobApplication};
