use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gigforge_core::{ApplicationId, CoreError, CoreResult, Entity, JobId, UserId};

/// Application status lifecycle. Everything except `Waiting` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationState {
    Waiting,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationState {
    pub fn is_terminal(self) -> bool {
        self != ApplicationState::Waiting
    }
}

impl core::fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ApplicationState::Waiting => "waiting",
            ApplicationState::Accepted => "accepted",
            ApplicationState::Rejected => "rejected",
            ApplicationState::Withdrawn => "withdrawn",
        };
        f.write_str(s)
    }
}

/// A contractor's application to a waiting job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    id: ApplicationId,
    job_id: JobId,
    applicant: UserId,
    state: ApplicationState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JobApplication {
    pub fn submit(job_id: JobId, applicant: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::new(),
            job_id,
            applicant,
            state: ApplicationState::Waiting,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn applicant(&self) -> UserId {
        self.applicant
    }

    pub fn state(&self) -> ApplicationState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ApplicationState::Waiting
    }

    /// Move the application to a terminal state.
    ///
    /// Only the `Waiting → {Accepted, Rejected, Withdrawn}` edges exist.
    pub fn resolve(&mut self, to: ApplicationState) -> CoreResult<()> {
        if self.state.is_terminal() {
            return Err(CoreError::invalid_state(format!(
                "application is already {}",
                self.state
            )));
        }
        if to == ApplicationState::Waiting {
            return Err(CoreError::invalid_transition(self.state, to));
        }

        self.state = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Entity for JobApplication {
    type Id = ApplicationId;

    fn id(&self) -> &ApplicationId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
