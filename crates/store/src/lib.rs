//! `gigforge-store` — persistence ports and the in-memory reference store.
//!
//! The [`Store`] / [`Session`] pair is the transaction coordinator boundary:
//! a session is an explicit unit-of-work handle passed down the call chain,
//! committed as one atomic group or rolled back wholesale when dropped.

pub mod in_memory;
pub mod port;
pub mod query;

pub use in_memory::InMemoryStore;
pub use port::{Session, Store, StoreError};
pub use query::{JobQuery, Page, RateRange};
