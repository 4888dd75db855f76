//! Application layer: event dispatch and node reference resolution
//!
//! This layer orchestrates domain logic for front-ends.

pub mod error;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use session::{ClusterEvent, CreationDefaults, Outcome, Session};
