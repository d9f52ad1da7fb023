//! Application workflow management.
//!
//! Acceptance is the one place a `Waiting` job becomes `Ongoing`, and it
//! moves three things in a single unit of work: the accepted application, the
//! job (contractor + state), and every sibling application still waiting.

use std::sync::Arc;

use tracing::info;

use gigforge_applications::{ApplicationState, JobApplication};
use gigforge_auth::{ensure, Parties, Requirement};
use gigforge_core::{ApplicationId, CoreError, CoreResult, Entity, JobId, UserId};
use gigforge_store::{Session, Store};

pub struct ApplicationService<S> {
    store: Arc<S>,
}

impl<S: Store> ApplicationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Apply to an open job.
    pub fn apply_to_job(&self, job_id: JobId, applicant: UserId) -> CoreResult<JobApplication> {
        let mut session = self.store.begin()?;
        let job = session.job(job_id)?.ok_or(CoreError::NotFound)?;

        if job.employer() == applicant {
            return Err(CoreError::Forbidden);
        }
        if !job.is_open() {
            return Err(CoreError::invalid_state(
                "job is not accepting applications",
            ));
        }

        let already_applied = session
            .applications_for_job(job_id)?
            .iter()
            .any(|a| a.applicant() == applicant && a.is_open());
        if already_applied {
            return Err(CoreError::conflict(
                "an open application for this job already exists",
            ));
        }

        let application = JobApplication::submit(job_id, applicant);
        session.insert_application(application.clone())?;
        session.commit()?;

        info!(application_id = %application.id(), %job_id, %applicant, "application submitted");
        Ok(application)
    }

    /// Accept one application: flips the job to `Ongoing`, attaches the
    /// applicant as contractor, and rejects every sibling still waiting.
    /// All three changes commit or roll back together.
    pub fn accept_application(
        &self,
        application_id: ApplicationId,
        caller: UserId,
    ) -> CoreResult<JobApplication> {
        let mut session = self.store.begin()?;
        let mut application = session
            .application(application_id)?
            .ok_or(CoreError::NotFound)?;
        let mut job = session.job(application.job_id())?.ok_or(CoreError::NotFound)?;

        ensure(
            caller,
            Requirement::Employer,
            &Parties::of_job(job.employer(), job.contractor()),
        )?;
        if !job.is_open() {
            return Err(CoreError::invalid_state("job already has a contractor"));
        }
        if !application.is_open() {
            return Err(CoreError::invalid_state(format!(
                "application is already {}",
                application.state()
            )));
        }

        application.resolve(ApplicationState::Accepted)?;
        session.update_application(&application)?;

        job.assign_contractor(application.applicant())?;
        session.update_job(&job)?;

        for mut sibling in session.applications_for_job(application.job_id())? {
            if sibling.id() != application.id() && sibling.is_open() {
                sibling.resolve(ApplicationState::Rejected)?;
                session.update_application(&sibling)?;
            }
        }

        session.commit()?;

        info!(
            application_id = %application_id,
            job_id = %application.job_id(),
            contractor = %application.applicant(),
            "application accepted"
        );
        Ok(application)
    }

    /// Turn down a waiting application.
    pub fn reject_application(
        &self,
        application_id: ApplicationId,
        caller: UserId,
    ) -> CoreResult<JobApplication> {
        self.resolve_as(application_id, caller, ApplicationState::Rejected)
    }

    /// Applicant retracts their own waiting application.
    pub fn withdraw_application(
        &self,
        application_id: ApplicationId,
        caller: UserId,
    ) -> CoreResult<JobApplication> {
        self.resolve_as(application_id, caller, ApplicationState::Withdrawn)
    }

    fn resolve_as(
        &self,
        application_id: ApplicationId,
        caller: UserId,
        to: ApplicationState,
    ) -> CoreResult<JobApplication> {
        let mut session = self.store.begin()?;
        let mut application = session
            .application(application_id)?
            .ok_or(CoreError::NotFound)?;
        let job = session.job(application.job_id())?.ok_or(CoreError::NotFound)?;

        let parties = Parties::of_job(job.employer(), job.contractor())
            .with_applicant(application.applicant());
        let requirement = match to {
            ApplicationState::Rejected => Requirement::Employer,
            ApplicationState::Withdrawn => Requirement::Applicant,
            // Accepted goes through accept_application; Waiting is not a
            // resolution.
            _ => return Err(CoreError::invalid_transition(application.state(), to)),
        };
        ensure(caller, requirement, &parties)?;

        application.resolve(to)?;
        session.update_application(&application)?;
        session.commit()?;

        info!(application_id = %application_id, state = %to, "application resolved");
        Ok(application)
    }

    /// Visible to the applicant and the job's employer.
    pub fn get_application(
        &self,
        application_id: ApplicationId,
        caller: UserId,
    ) -> CoreResult<JobApplication> {
        let session = self.store.begin()?;
        let application = session
            .application(application_id)?
            .ok_or(CoreError::NotFound)?;
        let job = session.job(application.job_id())?.ok_or(CoreError::NotFound)?;

        let is_applicant = application.applicant() == caller;
        let is_employer = job.employer() == caller;
        if !is_applicant && !is_employer {
            return Err(CoreError::Forbidden);
        }

        Ok(application)
    }

    /// All applications for a job; employer only.
    pub fn list_by_job(&self, job_id: JobId, caller: UserId) -> CoreResult<Vec<JobApplication>> {
        let session = self.store.begin()?;
        let job = session.job(job_id)?.ok_or(CoreError::NotFound)?;

        ensure(
            caller,
            Requirement::Employer,
            &Parties::of_job(job.employer(), job.contractor()),
        )?;

        Ok(session.applications_for_job(job_id)?)
    }

    /// Everything the caller has applied to.
    pub fn list_by_applicant(&self, applicant: UserId) -> CoreResult<Vec<JobApplication>> {
        let session = self.store.begin()?;
        Ok(session.applications_by_applicant(applicant)?)
    }
}
