//! On-device cache of the weekly plan.

mod local;

pub use local::{LocalPlanStorage, StorageError, PLAN_KEY};
