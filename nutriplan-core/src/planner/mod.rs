//! Weekly grid state and drag-and-drop on top of it.

mod drag;
mod store;

pub use drag::{drop_meal, DragSession, DropOutcome};
pub use store::{MoveResult, WeeklyPlanStore};
