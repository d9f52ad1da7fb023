//! `gigforge-services` — the orchestration core.
//!
//! This is the only layer where multiple entities change together. Every
//! operation follows the same discipline:
//!
//! 1. open one session (unit of work),
//! 2. existence check (`NotFound`),
//! 3. authorization (`Forbidden`),
//! 4. state validity (`InvalidState` / `InvalidTransition`),
//! 5. writes,
//! 6. commit.
//!
//! Checks never reorder, so error precedence is observable and stable. A
//! failure anywhere before commit drops the session and rolls back every
//! write in the unit.

pub mod application_service;
pub mod invoice_service;
pub mod job_service;

pub use application_service::ApplicationService;
pub use invoice_service::InvoiceService;
pub use job_service::JobService;
