//! Explicit manual transition table for jobs.
//!
//! The table enumerates every `(from, to)` pair an employer or contractor may
//! request directly. `Waiting → Ongoing` is deliberately absent: it is only
//! reachable through application acceptance, which also attaches the
//! contractor in the same unit of work.

use crate::JobState;

/// Who may take a given manual edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransitionActor {
    Employer,
    EmployerOrContractor,
}

/// Look up a manual edge. `None` means the edge does not exist.
pub fn manual_transition(from: JobState, to: JobState) -> Option<TransitionActor> {
    use JobState::*;

    match (from, to) {
        (Waiting, Archived) => Some(TransitionActor::Employer),
        (Ongoing, Complete) => Some(TransitionActor::EmployerOrContractor),
        (Complete, Archived) => Some(TransitionActor::Employer),
        _ => None,
    }
}
