//! Keeping the local cache and the remote plan store in step with the grid.

mod debounce;
mod session;

pub use debounce::Debouncer;
pub use session::{PlanSession, PlanSource, DEFAULT_DEBOUNCE};
