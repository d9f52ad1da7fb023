use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use gigforge_applications::JobApplication;
use gigforge_core::{ApplicationId, Entity, InvoiceId, JobId, UserId};
use gigforge_invoicing::Invoice;
use gigforge_jobs::Job;

use crate::port::{Session, Store, StoreError};
use crate::query::JobQuery;

#[derive(Debug, Default, Clone)]
struct StoreData {
    jobs: HashMap<JobId, Job>,
    applications: HashMap<ApplicationId, JobApplication>,
    invoices: HashMap<InvoiceId, Invoice>,
}

/// In-memory transactional store.
///
/// Intended for tests/dev. Sessions hold the store lock for their lifetime,
/// so units of work are fully serialized (the strongest isolation level; a
/// SQL backend would rely on its transaction isolation instead). An undo
/// snapshot taken at `begin` is restored when a session drops uncommitted.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Mutex<StoreData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    type Session<'a> = InMemorySession<'a>;

    fn begin(&self) -> Result<InMemorySession<'_>, StoreError> {
        let guard = self
            .data
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let undo = guard.clone();
        Ok(InMemorySession {
            guard,
            undo: Some(undo),
        })
    }
}

/// A serialized unit of work over [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemorySession<'a> {
    guard: MutexGuard<'a, StoreData>,
    /// Pre-session snapshot; `None` once committed.
    undo: Option<StoreData>,
}

impl Drop for InMemorySession<'_> {
    fn drop(&mut self) {
        // Uncommitted sessions roll back to the snapshot taken at begin.
        if let Some(undo) = self.undo.take() {
            *self.guard = undo;
        }
    }
}

impl Session for InMemorySession<'_> {
    fn insert_job(&mut self, job: Job) -> Result<(), StoreError> {
        let id = *job.id();
        if self.guard.jobs.contains_key(&id) {
            return Err(StoreError::Conflict(format!("job {id} already exists")));
        }
        self.guard.jobs.insert(id, job);
        Ok(())
    }

    fn job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.guard.jobs.get(&id).cloned())
    }

    fn update_job(&mut self, job: &Job) -> Result<(), StoreError> {
        match self.guard.jobs.get_mut(job.id()) {
            Some(slot) => {
                *slot = job.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_job(&mut self, id: JobId) -> Result<(), StoreError> {
        match self.guard.jobs.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    fn jobs_matching(&self, query: &JobQuery) -> Result<Vec<Job>, StoreError> {
        Ok(query.apply(self.guard.jobs.values().cloned()))
    }

    fn insert_application(&mut self, application: JobApplication) -> Result<(), StoreError> {
        let id = *application.id();
        if self.guard.applications.contains_key(&id) {
            return Err(StoreError::Conflict(format!(
                "application {id} already exists"
            )));
        }
        self.guard.applications.insert(id, application);
        Ok(())
    }

    fn application(&self, id: ApplicationId) -> Result<Option<JobApplication>, StoreError> {
        Ok(self.guard.applications.get(&id).cloned())
    }

    fn update_application(&mut self, application: &JobApplication) -> Result<(), StoreError> {
        match self.guard.applications.get_mut(application.id()) {
            Some(slot) => {
                *slot = application.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<JobApplication>, StoreError> {
        let mut hits: Vec<JobApplication> = self
            .guard
            .applications
            .values()
            .filter(|a| a.job_id() == job_id)
            .cloned()
            .collect();
        hits.sort_by_key(|a| (a.created_at(), *a.id().as_uuid()));
        Ok(hits)
    }

    fn applications_by_applicant(
        &self,
        applicant: UserId,
    ) -> Result<Vec<JobApplication>, StoreError> {
        let mut hits: Vec<JobApplication> = self
            .guard
            .applications
            .values()
            .filter(|a| a.applicant() == applicant)
            .cloned()
            .collect();
        hits.sort_by_key(|a| (a.created_at(), *a.id().as_uuid()));
        Ok(hits)
    }

    fn insert_invoice(&mut self, invoice: Invoice) -> Result<(), StoreError> {
        let id = *invoice.id();
        if self.guard.invoices.contains_key(&id) {
            return Err(StoreError::Conflict(format!("invoice {id} already exists")));
        }
        // Uniqueness of (job, interval) is a store rule, like a SQL unique
        // index over (job_id, interval_number).
        let duplicate = self.guard.invoices.values().any(|i| {
            i.job_id() == invoice.job_id() && i.interval_number() == invoice.interval_number()
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "interval {} already billed for job {}",
                invoice.interval_number(),
                invoice.job_id()
            )));
        }
        self.guard.invoices.insert(id, invoice);
        Ok(())
    }

    fn invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        Ok(self.guard.invoices.get(&id).cloned())
    }

    fn update_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError> {
        match self.guard.invoices.get_mut(invoice.id()) {
            Some(slot) => {
                *slot = invoice.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete_invoice(&mut self, id: InvoiceId) -> Result<(), StoreError> {
        match self.guard.invoices.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    fn invoices_for_job(&self, job_id: JobId) -> Result<Vec<Invoice>, StoreError> {
        let mut hits: Vec<Invoice> = self
            .guard
            .invoices
            .values()
            .filter(|i| i.job_id() == job_id)
            .cloned()
            .collect();
        hits.sort_by_key(|i| i.interval_number());
        Ok(hits)
    }

    fn max_invoice_interval(&self, job_id: JobId) -> Result<u32, StoreError> {
        Ok(self
            .guard
            .invoices
            .values()
            .filter(|i| i.job_id() == job_id)
            .map(|i| i.interval_number())
            .max()
            .unwrap_or(0))
    }

    fn commit(mut self) -> Result<(), StoreError> {
        self.undo = None;
        Ok(())
    }
}
