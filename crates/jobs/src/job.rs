use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gigforge_core::{CoreError, CoreResult, Entity, JobId, UserId};

/// Job status lifecycle.
///
/// `Waiting → Ongoing` has no manual edge; it only happens when an
/// application is accepted. See [`crate::transition`] for the manual edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Ongoing,
    Complete,
    Archived,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Archived)
    }
}

impl core::fmt::Display for JobState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            JobState::Waiting => "waiting",
            JobState::Ongoing => "ongoing",
            JobState::Complete => "complete",
            JobState::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// A posted job.
///
/// `contractor` is `Some` if and only if the job passed through a successful
/// application acceptance. Unassigned is always `None` — there is no sentinel
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    employer: UserId,
    contractor: Option<UserId>,
    /// Currency units per hour.
    rate: i64,
    duration_hours: u32,
    invoice_interval_hours: u32,
    state: JobState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Validate posting terms shared by creation and detail edits.
fn validate_terms(rate: i64, duration_hours: u32, invoice_interval_hours: u32) -> CoreResult<()> {
    if rate <= 0 {
        return Err(CoreError::invalid_argument("rate must be positive"));
    }
    if duration_hours == 0 {
        return Err(CoreError::invalid_argument("duration must be positive"));
    }
    if invoice_interval_hours == 0 {
        return Err(CoreError::invalid_argument(
            "invoice interval must be positive",
        ));
    }
    Ok(())
}

impl Job {
    /// Post a new job in `Waiting`.
    pub fn post(
        employer: UserId,
        rate: i64,
        duration_hours: u32,
        invoice_interval_hours: u32,
    ) -> CoreResult<Self> {
        validate_terms(rate, duration_hours, invoice_interval_hours)?;

        let now = Utc::now();
        Ok(Self {
            id: JobId::new(),
            employer,
            contractor: None,
            rate,
            duration_hours,
            invoice_interval_hours,
            state: JobState::Waiting,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn employer(&self) -> UserId {
        self.employer
    }

    pub fn contractor(&self) -> Option<UserId> {
        self.contractor
    }

    pub fn rate(&self) -> i64 {
        self.rate
    }

    pub fn duration_hours(&self) -> u32 {
        self.duration_hours
    }

    pub fn invoice_interval_hours(&self) -> u32 {
        self.invoice_interval_hours
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Open for applications: waiting and nobody attached yet.
    pub fn is_open(&self) -> bool {
        self.state == JobState::Waiting && self.contractor.is_none()
    }

    /// Edit rate/duration before any contractor is attached.
    ///
    /// Omitted fields keep their current value.
    pub fn edit_details(&mut self, rate: Option<i64>, duration_hours: Option<u32>) -> CoreResult<()> {
        if !self.is_open() {
            return Err(CoreError::invalid_state(
                "job details are frozen once a contractor is attached or the job left waiting",
            ));
        }

        let rate = rate.unwrap_or(self.rate);
        let duration_hours = duration_hours.unwrap_or(self.duration_hours);
        validate_terms(rate, duration_hours, self.invoice_interval_hours)?;

        self.rate = rate;
        self.duration_hours = duration_hours;
        self.touch();
        Ok(())
    }

    /// Attach a contractor and move to `Ongoing`.
    ///
    /// Only the application-acceptance flow calls this; there is no manual
    /// `Waiting → Ongoing` edge.
    pub fn assign_contractor(&mut self, contractor: UserId) -> CoreResult<()> {
        if !self.is_open() {
            return Err(CoreError::invalid_state(
                "job is not waiting for a contractor",
            ));
        }

        self.contractor = Some(contractor);
        self.state = JobState::Ongoing;
        self.touch();
        Ok(())
    }

    /// Apply an already-validated manual transition.
    ///
    /// Callers must have checked the transition table; this only mutates.
    pub fn set_state(&mut self, state: JobState) {
        self.state = state;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for Job {
    type Id = JobId;

    fn id(&self) -> &JobId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
