use serde::Serialize;
use thiserror::Error;

use gigforge_core::UserId;

/// The identities holding a relationship to an entity.
///
/// Services build this from a freshly loaded entity, immediately after the
/// existence check and before any state check. Construction is decoupled from
/// storage: the guard never performs IO.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Parties {
    pub employer: Option<UserId>,
    pub contractor: Option<UserId>,
    pub applicant: Option<UserId>,
}

impl Parties {
    pub fn employer(id: UserId) -> Self {
        Self {
            employer: Some(id),
            ..Self::default()
        }
    }

    pub fn of_job(employer: UserId, contractor: Option<UserId>) -> Self {
        Self {
            employer: Some(employer),
            contractor,
            applicant: None,
        }
    }

    pub fn with_applicant(mut self, id: UserId) -> Self {
        self.applicant = Some(id);
        self
    }
}

/// The exact relationship a caller must hold for an operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Caller created the job.
    Employer,
    /// Caller is the job's assigned contractor.
    Contractor,
    /// Caller is either side of the job.
    EmployerOrContractor,
    /// Caller submitted the application.
    Applicant,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("forbidden: caller is not the {0:?}")]
    Forbidden(Requirement),
}

impl From<GuardError> for gigforge_core::CoreError {
    fn from(_: GuardError) -> Self {
        gigforge_core::CoreError::Forbidden
    }
}

/// Evaluate whether `caller` holds `required` among `parties`.
///
/// - No IO
/// - No panics
/// - No business logic (pure relationship check)
pub fn ensure(caller: UserId, required: Requirement, parties: &Parties) -> Result<(), GuardError> {
    let holds = match required {
        Requirement::Employer => parties.employer == Some(caller),
        Requirement::Contractor => parties.contractor == Some(caller),
        Requirement::EmployerOrContractor => {
            parties.employer == Some(caller) || parties.contractor == Some(caller)
        }
        Requirement::Applicant => parties.applicant == Some(caller),
    };

    if holds {
        Ok(())
    } else {
        Err(GuardError::Forbidden(required))
    }
}
