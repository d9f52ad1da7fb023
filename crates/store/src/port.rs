//! Storage ports.
//!
//! ## Unit of work
//!
//! Every repository call is scoped to an open [`Session`]. A session is
//! obtained from [`Store::begin`], threaded through the operation, and
//! consumed by [`Session::commit`]. Dropping an uncommitted session rolls
//! back every change made through it. There is no global or thread-local
//! transaction state.
//!
//! ## Isolation requirements
//!
//! Implementations must isolate sessions strongly enough that two concurrent
//! units of work against the same job cannot both derive the same
//! uniqueness/monotonicity fact: two sessions reading
//! [`Session::max_invoice_interval`] and inserting must serialize, and two
//! sessions accepting applications for one job must not both observe it open.
//! The in-memory implementation achieves this by holding the store lock for
//! the session's lifetime; a SQL-backed one would use transaction isolation.
//!
//! ## Error mapping
//!
//! [`StoreError`] is infrastructure-level. Services translate it at their
//! boundary: `Conflict` keeps its meaning, everything else becomes
//! `CoreError::Internal` with the cause attached. Raw store errors never
//! reach callers.

use thiserror::Error;

use gigforge_applications::JobApplication;
use gigforge_core::{ApplicationId, CoreError, InvoiceId, JobId, UserId};
use gigforge_invoicing::Invoice;
use gigforge_jobs::Job;

use crate::query::JobQuery;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row targeted by an update/delete does not exist.
    #[error("row not found")]
    NotFound,

    /// A uniqueness rule was violated (duplicate id, duplicate interval
    /// number per job).
    #[error("uniqueness violation: {0}")]
    Conflict(String),

    /// Backend failure (lock poisoned, connection lost, aborted transaction).
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => CoreError::Conflict(msg),
            StoreError::NotFound => {
                // An update losing its row mid-session means the session saw
                // inconsistent state; surface as internal, not NotFound.
                CoreError::internal(anyhow::anyhow!("row vanished inside an open session"))
            }
            StoreError::Backend(msg) => CoreError::internal(anyhow::anyhow!(msg)),
        }
    }
}

/// A transactional persistence backend.
pub trait Store: Send + Sync {
    type Session<'a>: Session
    where
        Self: 'a;

    /// Open a unit of work. All reads and writes through the returned session
    /// commit or roll back together.
    fn begin(&self) -> Result<Self::Session<'_>, StoreError>;
}

/// An open unit of work.
///
/// Reads observe the session's own uncommitted writes. Queries that feed
/// uniqueness or monotonicity decisions (`max_invoice_interval`,
/// `applications_for_job`) are part of the session on purpose: deriving
/// them outside the unit of work reintroduces the read-then-write race.
pub trait Session {
    // Jobs
    fn insert_job(&mut self, job: Job) -> Result<(), StoreError>;
    fn job(&self, id: JobId) -> Result<Option<Job>, StoreError>;
    fn update_job(&mut self, job: &Job) -> Result<(), StoreError>;
    fn delete_job(&mut self, id: JobId) -> Result<(), StoreError>;
    fn jobs_matching(&self, query: &JobQuery) -> Result<Vec<Job>, StoreError>;

    // Applications
    fn insert_application(&mut self, application: JobApplication) -> Result<(), StoreError>;
    fn application(&self, id: ApplicationId) -> Result<Option<JobApplication>, StoreError>;
    fn update_application(&mut self, application: &JobApplication) -> Result<(), StoreError>;
    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, StoreError>;
    fn applications_by_applicant(&self, applicant: UserId)
        -> Result<Vec<JobApplication>, StoreError>;

    // Invoices
    fn insert_invoice(&mut self, invoice: Invoice) -> Result<(), StoreError>;
    fn invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError>;
    fn update_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError>;
    fn delete_invoice(&mut self, id: InvoiceId) -> Result<(), StoreError>;
    fn invoices_for_job(&self, job_id: JobId) -> Result<Vec<Invoice>, StoreError>;

    /// Highest interval number billed for the job so far, 0 if none.
    fn max_invoice_interval(&self, job_id: JobId) -> Result<u32, StoreError>;

    /// Commit the unit of work. Dropping without committing rolls back.
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;
}
