//! NutriPlan Core Library
//!
//! The weekly meal plan model and everything that keeps it consistent:
//! the grid state machine, drag-and-drop reassignment, the on-device cache,
//! the remote plan store client and the debounced sync between them.

pub mod grocery;
pub mod models;
pub mod planner;
pub mod remote;
pub mod storage;
pub mod sync;

pub use grocery::{GroceryCategory, GroceryItem, GroceryList, ItemSource};
pub use models::{Day, DayMeals, MacroTotals, Meal, MealType, ParseError, SlotId, WeeklyPlan};
pub use planner::{drop_meal, DragSession, DropOutcome, MoveResult, WeeklyPlanStore};
pub use remote::{
    check_server, HttpPlanClient, PlanRecord, RemoteError, RemotePlanStore, SavePlanRequest,
    SavePlanResponse,
};
pub use storage::{LocalPlanStorage, StorageError, PLAN_KEY};
pub use sync::{Debouncer, PlanSession, PlanSource, DEFAULT_DEBOUNCE};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
