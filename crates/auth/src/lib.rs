//! `gigforge-auth` — pure authorization boundary.
//!
//! This crate is intentionally decoupled from storage and transport: services
//! resolve the parties of an entity and ask a single declarative question
//! ("does the caller hold this relationship?"). No credential verification
//! happens here — caller identity arrives pre-resolved.

pub mod guard;

pub use guard::{ensure, GuardError, Parties, Requirement};
