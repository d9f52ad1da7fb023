//! Invoice generation against ongoing jobs.
//!
//! Interval numbers are a per-job monotonic sequence. The read of the current
//! maximum and the insert of the next invoice happen inside one session;
//! deriving the next number outside the unit of work would let two concurrent
//! callers both bill interval 1.

use std::sync::Arc;

use tracing::info;

use gigforge_auth::{ensure, Parties, Requirement};
use gigforge_core::{CoreError, CoreResult, Entity, InvoiceId, JobId, UserId};
use gigforge_invoicing::{interval_hours, invoice_value, max_intervals, Invoice, InvoiceState};
use gigforge_jobs::{Job, JobState};
use gigforge_store::{Session, Store};

pub struct InvoiceService<S> {
    store: Arc<S>,
}

impl<S: Store> InvoiceService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Bill the next interval of an ongoing job.
    pub fn create_invoice(
        &self,
        job_id: JobId,
        caller: UserId,
        adjustment: Option<i64>,
    ) -> CoreResult<Invoice> {
        let mut session = self.store.begin()?;
        let job = session.job(job_id)?.ok_or(CoreError::NotFound)?;

        // A job without a contractor has nobody to authorize against; its
        // state is the meaningful failure there.
        match job.contractor() {
            Some(_) => ensure(
                caller,
                Requirement::Contractor,
                &Parties::of_job(job.employer(), job.contractor()),
            )?,
            None => {
                return Err(CoreError::invalid_state(
                    "job has no contractor to invoice for",
                ));
            }
        }
        if job.state() != JobState::Ongoing {
            return Err(CoreError::invalid_state("job is not ongoing"));
        }

        let next = session.max_invoice_interval(job_id)? + 1;
        let budget = max_intervals(job.duration_hours(), job.invoice_interval_hours());
        if next > budget {
            return Err(CoreError::InvalidInvoiceInterval {
                requested: next,
                max: budget,
            });
        }

        let hours = interval_hours(next, job.duration_hours(), job.invoice_interval_hours());
        let value = invoice_value(job.rate(), hours, adjustment.unwrap_or(0))?;

        let invoice = Invoice::issue(job_id, next, value);
        session.insert_invoice(invoice.clone())?;
        session.commit()?;

        info!(
            invoice_id = %invoice.id(),
            %job_id,
            interval = next,
            value,
            "invoice created"
        );
        Ok(invoice)
    }

    /// Visible to both sides of the owning job.
    pub fn get_invoice(&self, id: InvoiceId, caller: UserId) -> CoreResult<Invoice> {
        let session = self.store.begin()?;
        let invoice = session.invoice(id)?.ok_or(CoreError::NotFound)?;
        let job = session.job(invoice.job_id())?.ok_or(CoreError::NotFound)?;

        Self::ensure_party(caller, &job)?;
        Ok(invoice)
    }

    /// All invoices for a job, in interval order; both sides of the job.
    pub fn list_by_job(&self, job_id: JobId, caller: UserId) -> CoreResult<Vec<Invoice>> {
        let session = self.store.begin()?;
        let job = session.job(job_id)?.ok_or(CoreError::NotFound)?;

        Self::ensure_party(caller, &job)?;
        Ok(session.invoices_for_job(job_id)?)
    }

    /// Employer confirms payment: the only edge is `Waiting → Complete`.
    pub fn update_invoice_state(
        &self,
        id: InvoiceId,
        caller: UserId,
        to: InvoiceState,
    ) -> CoreResult<Invoice> {
        let mut session = self.store.begin()?;
        let mut invoice = session.invoice(id)?.ok_or(CoreError::NotFound)?;
        let job = session.job(invoice.job_id())?.ok_or(CoreError::NotFound)?;

        ensure(
            caller,
            Requirement::Employer,
            &Parties::of_job(job.employer(), job.contractor()),
        )?;

        match to {
            InvoiceState::Complete => invoice.complete()?,
            InvoiceState::Waiting => {
                return Err(CoreError::invalid_transition(invoice.state(), to));
            }
        }

        session.update_invoice(&invoice)?;
        session.commit()?;

        info!(invoice_id = %id, "invoice completed");
        Ok(invoice)
    }

    /// Contractor retracts an unpaid invoice.
    pub fn delete_invoice(&self, id: InvoiceId, caller: UserId) -> CoreResult<()> {
        let mut session = self.store.begin()?;
        let invoice = session.invoice(id)?.ok_or(CoreError::NotFound)?;
        let job = session.job(invoice.job_id())?.ok_or(CoreError::NotFound)?;

        ensure(
            caller,
            Requirement::Contractor,
            &Parties::of_job(job.employer(), job.contractor()),
        )?;
        if !invoice.is_waiting() {
            return Err(CoreError::invalid_state(
                "completed invoices cannot be deleted",
            ));
        }

        session.delete_invoice(id)?;
        session.commit()?;

        info!(invoice_id = %id, "invoice deleted");
        Ok(())
    }

    fn ensure_party(caller: UserId, job: &Job) -> CoreResult<()> {
        ensure(
            caller,
            Requirement::EmployerOrContractor,
            &Parties::of_job(job.employer(), job.contractor()),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigforge_core::ErrorKind;
    use gigforge_store::InMemoryStore;

    use crate::{ApplicationService, JobService};

    struct Fixture {
        jobs: JobService<InMemoryStore>,
        applications: ApplicationService<InMemoryStore>,
        invoices: InvoiceService<InMemoryStore>,
        employer: UserId,
        contractor: UserId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        Fixture {
            jobs: JobService::new(store.clone()),
            applications: ApplicationService::new(store.clone()),
            invoices: InvoiceService::new(store),
            employer: UserId::new(),
            contractor: UserId::new(),
        }
    }

    /// Job accepted and ongoing, ready to invoice.
    fn ongoing_job(f: &Fixture, rate: i64, duration: u32, interval: u32) -> JobId {
        let job = f.jobs.create_job(f.employer, rate, duration, interval).unwrap();
        let application = f
            .applications
            .apply_to_job(*job.id(), f.contractor)
            .unwrap();
        f.applications
            .accept_application(*application.id(), f.employer)
            .unwrap();
        *job.id()
    }

    #[test]
    fn invoicing_a_waiting_job_is_invalid_state() {
        let f = fixture();
        let job = f.jobs.create_job(f.employer, 100, 40, 10).unwrap();

        let err = f
            .invoices
            .create_invoice(*job.id(), f.contractor, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn only_the_contractor_invoices() {
        let f = fixture();
        let job_id = ongoing_job(&f, 100, 40, 10);

        let err = f
            .invoices
            .create_invoice(job_id, f.employer, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn interval_numbers_are_contiguous_from_one() {
        let f = fixture();
        let job_id = ongoing_job(&f, 100, 40, 10);

        for expected in 1..=4 {
            let invoice = f
                .invoices
                .create_invoice(job_id, f.contractor, None)
                .unwrap();
            assert_eq!(invoice.interval_number(), expected);
            assert_eq!(invoice.value(), 1_000);
        }
    }

    #[test]
    fn partial_final_interval_bills_the_remainder() {
        let f = fixture();
        // 35h in 10h blocks: 3 full + 1 partial of 5h.
        let job_id = ongoing_job(&f, 100, 35, 10);

        for _ in 0..3 {
            let invoice = f
                .invoices
                .create_invoice(job_id, f.contractor, None)
                .unwrap();
            assert_eq!(invoice.value(), 1_000);
        }

        let last = f
            .invoices
            .create_invoice(job_id, f.contractor, None)
            .unwrap();
        assert_eq!(last.interval_number(), 4);
        assert_eq!(last.value(), 500);

        let err = f
            .invoices
            .create_invoice(job_id, f.contractor, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInvoiceInterval);
    }

    #[test]
    fn adjustment_shifts_value_and_floors_at_zero() {
        let f = fixture();
        let job_id = ongoing_job(&f, 100, 20, 10);

        let bumped = f
            .invoices
            .create_invoice(job_id, f.contractor, Some(250))
            .unwrap();
        assert_eq!(bumped.value(), 1_250);

        let floored = f
            .invoices
            .create_invoice(job_id, f.contractor, Some(-5_000))
            .unwrap();
        assert_eq!(floored.value(), 0);
    }

    #[test]
    fn completion_is_employer_only_and_one_way() {
        let f = fixture();
        let job_id = ongoing_job(&f, 100, 20, 10);
        let invoice = f
            .invoices
            .create_invoice(job_id, f.contractor, None)
            .unwrap();

        let err = f
            .invoices
            .update_invoice_state(*invoice.id(), f.contractor, InvoiceState::Complete)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        f.invoices
            .update_invoice_state(*invoice.id(), f.employer, InvoiceState::Complete)
            .unwrap();

        let err = f
            .invoices
            .update_invoice_state(*invoice.id(), f.employer, InvoiceState::Complete)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn back_to_waiting_is_not_an_edge() {
        let f = fixture();
        let job_id = ongoing_job(&f, 100, 20, 10);
        let invoice = f
            .invoices
            .create_invoice(job_id, f.contractor, None)
            .unwrap();

        let err = f
            .invoices
            .update_invoice_state(*invoice.id(), f.employer, InvoiceState::Waiting)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn deletion_is_contractor_only_and_waiting_only() {
        let f = fixture();
        let job_id = ongoing_job(&f, 100, 20, 10);
        let invoice = f
            .invoices
            .create_invoice(job_id, f.contractor, None)
            .unwrap();

        let err = f
            .invoices
            .delete_invoice(*invoice.id(), f.employer)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        f.invoices
            .update_invoice_state(*invoice.id(), f.employer, InvoiceState::Complete)
            .unwrap();
        let err = f
            .invoices
            .delete_invoice(*invoice.id(), f.contractor)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn deleted_interval_is_billable_again() {
        let f = fixture();
        let job_id = ongoing_job(&f, 100, 20, 10);

        let invoice = f
            .invoices
            .create_invoice(job_id, f.contractor, None)
            .unwrap();
        f.invoices
            .delete_invoice(*invoice.id(), f.contractor)
            .unwrap();

        let again = f
            .invoices
            .create_invoice(job_id, f.contractor, None)
            .unwrap();
        assert_eq!(again.interval_number(), 1);
    }

    #[test]
    fn reads_are_limited_to_the_job_parties() {
        let f = fixture();
        let job_id = ongoing_job(&f, 100, 20, 10);
        let invoice = f
            .invoices
            .create_invoice(job_id, f.contractor, None)
            .unwrap();

        assert!(f.invoices.get_invoice(*invoice.id(), f.employer).is_ok());
        assert!(f.invoices.get_invoice(*invoice.id(), f.contractor).is_ok());
        let err = f
            .invoices
            .get_invoice(*invoice.id(), UserId::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let listed = f.invoices.list_by_job(job_id, f.employer).unwrap();
        assert_eq!(listed.len(), 1);
    }
}
