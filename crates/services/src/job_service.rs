//! Job lifecycle management.

use std::sync::Arc;

use tracing::info;

use gigforge_auth::{ensure, Parties, Requirement};
use gigforge_core::{CoreError, CoreResult, Entity, JobId, UserId};
use gigforge_jobs::{manual_transition, Job, JobState, TransitionActor};
use gigforge_store::{JobQuery, Page, RateRange, Session, Store};

pub struct JobService<S> {
    store: Arc<S>,
}

impl<S: Store> JobService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Post a new job in `Waiting`.
    pub fn create_job(
        &self,
        employer: UserId,
        rate: i64,
        duration_hours: u32,
        invoice_interval_hours: u32,
    ) -> CoreResult<Job> {
        let job = Job::post(employer, rate, duration_hours, invoice_interval_hours)?;

        let mut session = self.store.begin()?;
        session.insert_job(job.clone())?;
        session.commit()?;

        info!(job_id = %job.id(), %employer, rate, "job posted");
        Ok(job)
    }

    pub fn get_job(&self, id: JobId) -> CoreResult<Job> {
        let session = self.store.begin()?;
        session.job(id)?.ok_or(CoreError::NotFound)
    }

    /// Marketplace view: waiting, unassigned jobs within a rate range.
    pub fn list_available(&self, rate: RateRange, page: Page) -> CoreResult<Vec<Job>> {
        let session = self.store.begin()?;
        Ok(session.jobs_matching(&JobQuery::available(rate, page))?)
    }

    /// Jobs posted by an employer, optionally narrowed by state/rate.
    pub fn list_by_employer(&self, employer: UserId, filter: JobQuery) -> CoreResult<Vec<Job>> {
        let query = JobQuery {
            employer: Some(employer),
            contractor: None,
            open_only: false,
            ..filter
        };
        let session = self.store.begin()?;
        Ok(session.jobs_matching(&query)?)
    }

    /// Jobs a contractor is attached to, optionally narrowed by state/rate.
    pub fn list_by_contractor(&self, contractor: UserId, filter: JobQuery) -> CoreResult<Vec<Job>> {
        let query = JobQuery {
            employer: None,
            contractor: Some(contractor),
            open_only: false,
            ..filter
        };
        let session = self.store.begin()?;
        Ok(session.jobs_matching(&query)?)
    }

    /// Edit rate/duration while the job is still open.
    pub fn update_job_details(
        &self,
        id: JobId,
        caller: UserId,
        rate: Option<i64>,
        duration_hours: Option<u32>,
    ) -> CoreResult<Job> {
        let mut session = self.store.begin()?;
        let mut job = session.job(id)?.ok_or(CoreError::NotFound)?;

        ensure(
            caller,
            Requirement::Employer,
            &Parties::of_job(job.employer(), job.contractor()),
        )?;
        job.edit_details(rate, duration_hours)?;

        session.update_job(&job)?;
        session.commit()?;

        info!(job_id = %id, "job details updated");
        Ok(job)
    }

    /// Take a manual edge in the job state machine.
    pub fn update_job_state(&self, id: JobId, caller: UserId, to: JobState) -> CoreResult<Job> {
        let mut session = self.store.begin()?;
        let mut job = session.job(id)?.ok_or(CoreError::NotFound)?;
        let parties = Parties::of_job(job.employer(), job.contractor());

        // Membership first: outsiders get Forbidden before learning whether
        // the edge exists.
        ensure(caller, Requirement::EmployerOrContractor, &parties)?;

        let actor = manual_transition(job.state(), to)
            .ok_or_else(|| CoreError::invalid_transition(job.state(), to))?;
        let requirement = match actor {
            TransitionActor::Employer => Requirement::Employer,
            TransitionActor::EmployerOrContractor => Requirement::EmployerOrContractor,
        };
        ensure(caller, requirement, &parties)?;

        let from = job.state();
        job.set_state(to);
        session.update_job(&job)?;
        session.commit()?;

        info!(job_id = %id, %from, %to, "job state changed");
        Ok(job)
    }

    /// Remove a job that never attracted a contractor.
    pub fn delete_job(&self, id: JobId, caller: UserId) -> CoreResult<()> {
        let mut session = self.store.begin()?;
        let job = session.job(id)?.ok_or(CoreError::NotFound)?;

        ensure(
            caller,
            Requirement::Employer,
            &Parties::of_job(job.employer(), job.contractor()),
        )?;
        if !job.is_open() {
            return Err(CoreError::invalid_state(
                "only waiting, unassigned jobs can be deleted",
            ));
        }
        // Applications reference the job; deleting it would orphan them.
        if !session.applications_for_job(id)?.is_empty() {
            return Err(CoreError::invalid_state(
                "job has applications and cannot be deleted",
            ));
        }

        session.delete_job(id)?;
        session.commit()?;

        info!(job_id = %id, "job deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigforge_core::ErrorKind;
    use gigforge_store::InMemoryStore;

    fn service() -> JobService<InMemoryStore> {
        JobService::new(Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn created_job_is_immediately_fetchable() {
        let svc = service();
        let employer = UserId::new();

        let job = svc.create_job(employer, 100, 40, 10).unwrap();
        let fetched = svc.get_job(*job.id()).unwrap();
        assert_eq!(fetched.state(), JobState::Waiting);
        assert_eq!(fetched.employer(), employer);
    }

    #[test]
    fn invalid_terms_never_reach_the_store() {
        let svc = service();
        let err = svc.create_job(UserId::new(), 0, 40, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(svc
            .list_available(RateRange::default(), Page::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_job_beats_bad_caller() {
        let svc = service();
        let err = svc
            .update_job_state(JobId::new(), UserId::new(), JobState::Archived)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn stranger_cannot_edit_details() {
        let svc = service();
        let job = svc.create_job(UserId::new(), 100, 40, 10).unwrap();

        let err = svc
            .update_job_details(*job.id(), UserId::new(), Some(200), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(svc.get_job(*job.id()).unwrap().rate(), 100);
    }

    #[test]
    fn successful_state_update_is_observable() {
        let svc = service();
        let employer = UserId::new();
        let job = svc.create_job(employer, 100, 40, 10).unwrap();

        svc.update_job_state(*job.id(), employer, JobState::Archived)
            .unwrap();
        assert_eq!(svc.get_job(*job.id()).unwrap().state(), JobState::Archived);
    }

    #[test]
    fn waiting_to_ongoing_is_not_a_manual_edge() {
        let svc = service();
        let employer = UserId::new();
        let job = svc.create_job(employer, 100, 40, 10).unwrap();

        let err = svc
            .update_job_state(*job.id(), employer, JobState::Ongoing)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn outsider_gets_forbidden_before_transition_errors() {
        let svc = service();
        let job = svc.create_job(UserId::new(), 100, 40, 10).unwrap();

        // Ongoing is not reachable from Waiting, but the outsider must not
        // learn that.
        let err = svc
            .update_job_state(*job.id(), UserId::new(), JobState::Ongoing)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn deleting_a_waiting_job_works_once() {
        let svc = service();
        let employer = UserId::new();
        let job = svc.create_job(employer, 100, 40, 10).unwrap();

        svc.delete_job(*job.id(), employer).unwrap();
        let err = svc.delete_job(*job.id(), employer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn job_with_applications_cannot_be_deleted() {
        let svc = service();
        let employer = UserId::new();
        let job = svc.create_job(employer, 100, 40, 10).unwrap();

        // Applications come from another service; reach through the store
        // the way it would.
        let store = svc.store.clone();
        let mut session = store.begin().unwrap();
        session
            .insert_application(gigforge_applications::JobApplication::submit(
                *job.id(),
                UserId::new(),
            ))
            .unwrap();
        session.commit().unwrap();

        let err = svc.delete_job(*job.id(), employer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn archived_job_cannot_be_deleted() {
        let svc = service();
        let employer = UserId::new();
        let job = svc.create_job(employer, 100, 40, 10).unwrap();
        svc.update_job_state(*job.id(), employer, JobState::Archived)
            .unwrap();

        let err = svc.delete_job(*job.id(), employer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn listings_filter_by_rate_and_paginate() {
        let svc = service();
        let employer = UserId::new();
        for rate in [50, 100, 150, 200] {
            svc.create_job(employer, rate, 40, 10).unwrap();
        }

        let cheap = svc
            .list_available(
                RateRange {
                    min: None,
                    max: Some(100),
                },
                Page::default(),
            )
            .unwrap();
        assert_eq!(cheap.len(), 2);

        let paged = svc
            .list_by_employer(
                employer,
                JobQuery::default().with_page(Page {
                    offset: 1,
                    limit: 2,
                }),
            )
            .unwrap();
        assert_eq!(paged.len(), 2);
    }
}
