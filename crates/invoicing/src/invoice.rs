use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gigforge_core::{CoreError, CoreResult, Entity, InvoiceId, JobId};

/// Invoice status lifecycle. The only edge is `Waiting → Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceState {
    Waiting,
    Complete,
}

impl core::fmt::Display for InvoiceState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            InvoiceState::Waiting => "waiting",
            InvoiceState::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// An invoice billing one interval of an ongoing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    job_id: JobId,
    /// Position in the job's billing sequence, starting at 1. Contiguous and
    /// unique per job.
    interval_number: u32,
    /// Billed amount in currency units; never negative.
    value: i64,
    state: InvoiceState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Issue an invoice in `Waiting`.
    ///
    /// Interval-number assignment and the budget check live in the service
    /// layer, inside the same session as the insert.
    pub fn issue(job_id: JobId, interval_number: u32, value: i64) -> Self {
        debug_assert!(interval_number >= 1);
        debug_assert!(value >= 0);

        let now = Utc::now();
        Self {
            id: InvoiceId::new(),
            job_id,
            interval_number,
            value,
            state: InvoiceState::Waiting,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn interval_number(&self) -> u32 {
        self.interval_number
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn state(&self) -> InvoiceState {
        self.state
    }

    pub fn is_waiting(&self) -> bool {
        self.state == InvoiceState::Waiting
    }

    /// Mark the invoice as paid/confirmed.
    pub fn complete(&mut self) -> CoreResult<()> {
        match self.state {
            InvoiceState::Waiting => {
                self.state = InvoiceState::Complete;
                self.updated_at = Utc::now();
                Ok(())
            }
            InvoiceState::Complete => {
                Err(CoreError::invalid_transition(InvoiceState::Complete, InvoiceState::Complete))
            }
        }
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &InvoiceId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
