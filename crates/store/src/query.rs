//! Query/filter types for job listings.

use serde::{Deserialize, Serialize};

use gigforge_core::{Entity, UserId};
use gigforge_jobs::{Job, JobState};

pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Offset/limit pagination window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Inclusive hourly-rate bounds; `None` leaves a side unbounded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RateRange {
    pub fn contains(&self, rate: i64) -> bool {
        self.min.is_none_or(|min| rate >= min) && self.max.is_none_or(|max| rate <= max)
    }
}

/// Declarative job listing filter, evaluated store-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    pub employer: Option<UserId>,
    pub contractor: Option<UserId>,
    pub state: Option<JobState>,
    /// Restrict to waiting, unassigned jobs (the public marketplace view).
    pub open_only: bool,
    pub rate: RateRange,
    pub page: Page,
}

impl JobQuery {
    /// Marketplace listing: open jobs within a rate range.
    pub fn available(rate: RateRange, page: Page) -> Self {
        Self {
            open_only: true,
            rate,
            page,
            ..Self::default()
        }
    }

    pub fn by_employer(employer: UserId) -> Self {
        Self {
            employer: Some(employer),
            ..Self::default()
        }
    }

    pub fn by_contractor(contractor: UserId) -> Self {
        Self {
            contractor: Some(contractor),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: JobState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_rate(mut self, rate: RateRange) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Predicate form of the filter (pagination excluded).
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(employer) = self.employer {
            if job.employer() != employer {
                return false;
            }
        }
        if let Some(contractor) = self.contractor {
            if job.contractor() != Some(contractor) {
                return false;
            }
        }
        if let Some(state) = self.state {
            if job.state() != state {
                return false;
            }
        }
        if self.open_only && !job.is_open() {
            return false;
        }
        self.rate.contains(job.rate())
    }

    /// Apply filter, stable ordering (creation time) and pagination.
    pub fn apply(&self, jobs: impl IntoIterator<Item = Job>) -> Vec<Job> {
        let mut hits: Vec<Job> = jobs.into_iter().filter(|j| self.matches(j)).collect();
        hits.sort_by_key(|j| (j.created_at(), *j.id().as_uuid()));
        hits.into_iter().skip(self.page.offset).take(self.page.limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with_rate(rate: i64) -> Job {
        Job::post(UserId::new(), rate, 40, 10).unwrap()
    }

    #[test]
    fn rate_range_bounds_are_inclusive() {
        let range = RateRange {
            min: Some(50),
            max: Some(150),
        };
        assert!(range.contains(50));
        assert!(range.contains(150));
        assert!(!range.contains(49));
        assert!(!range.contains(151));
    }

    #[test]
    fn available_filter_excludes_assigned_jobs() {
        let mut assigned = job_with_rate(100);
        assigned.assign_contractor(UserId::new()).unwrap();
        let open = job_with_rate(100);

        let query = JobQuery::available(RateRange::default(), Page::default());
        assert!(query.matches(&open));
        assert!(!query.matches(&assigned));
    }

    #[test]
    fn employer_filter_combines_with_state() {
        let employer = UserId::new();
        let mine = Job::post(employer, 100, 40, 10).unwrap();
        let theirs = job_with_rate(100);

        let query = JobQuery::by_employer(employer).with_state(JobState::Waiting);
        assert!(query.matches(&mine));
        assert!(!query.matches(&theirs));
    }

    #[test]
    fn pagination_windows_the_result() {
        let jobs: Vec<Job> = (1..=5).map(|i| job_with_rate(i * 10)).collect();
        let query = JobQuery::default().with_page(Page {
            offset: 2,
            limit: 2,
        });

        let out = query.apply(jobs);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].rate(), 30);
        assert_eq!(out[1].rate(), 40);
    }
}
