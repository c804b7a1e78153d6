//! Domain layer - Circulation rules and abstractions
//!
//! No HTTP and no storage access here: rules, the status transition table,
//! the capability check, error types and repository traits.

pub mod access;
pub mod errors;
pub mod policy;
pub mod repositories;
pub mod transitions;

pub use access::{Action, Caller, Role, authorize};
pub use errors::CirculationError;
pub use policy::{LoanPeriod, ReturnCondition};
pub use repositories::*;
pub use transitions::{BorrowEvent, transition};
