//! Drag-and-drop reassignment.
//!
//! Draggable items are keyed by meal id and drop targets by slot id
//! (`"{Day}-{mealType}"`). A completed drop becomes one move on the
//! [`WeeklyPlanStore`]: the source slot is cleared and the destination
//! receives the meal, discarding its previous occupant.

use std::sync::Arc;

use super::store::WeeklyPlanStore;
use crate::models::{Meal, SlotId};

/// Result of ending a drag.
#[derive(Debug, Clone)]
pub enum DropOutcome {
    Moved {
        from: SlotId,
        to: SlotId,
        /// Meal that occupied `to` before the drop; it is no longer in the plan.
        displaced: Option<Arc<Meal>>,
    },
    /// `drag_end` without a matching `drag_start`.
    NotDragging,
    /// The dragged id is not a meal currently in the plan.
    UnknownSource,
    /// The drop target is neither a slot id nor a planned meal's id.
    InvalidTarget,
    /// Dropped back onto its own slot.
    SameSlot,
}

impl DropOutcome {
    pub fn changed_plan(&self) -> bool {
        matches!(self, DropOutcome::Moved { .. })
    }
}

/// Tracks the item being dragged between start and end/cancel.
#[derive(Debug, Default)]
pub struct DragSession {
    active_id: Option<String>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, item_id: impl Into<String>) {
        self.active_id = Some(item_id.into());
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// The meal under the cursor, for rendering a drag overlay.
    pub fn active_meal<'a>(&self, store: &'a WeeklyPlanStore) -> Option<&'a Arc<Meal>> {
        let id = self.active_id.as_deref()?;
        store.plan().meals().find(|(_, meal)| meal.id == id).map(|(_, meal)| meal)
    }

    /// Drop outside any target or escape: nothing changes.
    pub fn cancel(&mut self) {
        self.active_id = None;
    }

    /// Completes the drag onto `target` and applies the move.
    pub fn end(&mut self, store: &mut WeeklyPlanStore, target: &str) -> DropOutcome {
        let Some(item_id) = self.active_id.take() else {
            return DropOutcome::NotDragging;
        };
        let outcome = drop_meal(store, &item_id, target);
        tracing::debug!("Drop of '{}' onto '{}': {:?}", item_id, target, outcome);
        outcome
    }
}

/// Moves the meal with id `item_id` onto the container named by `target`.
pub fn drop_meal(store: &mut WeeklyPlanStore, item_id: &str, target: &str) -> DropOutcome {
    let Some(from) = store.find_meal(item_id) else {
        return DropOutcome::UnknownSource;
    };
    let Some(to) = resolve_target(store, target) else {
        return DropOutcome::InvalidTarget;
    };
    if from == to {
        return DropOutcome::SameSlot;
    }
    match store.move_meal(from, to) {
        Some(result) => {
            if let Some(displaced) = &result.displaced {
                tracing::info!("'{}' replaced '{}' at {}", result.meal.name, displaced.name, to);
            }
            DropOutcome::Moved {
                from,
                to,
                displaced: result.displaced,
            }
        }
        None => DropOutcome::UnknownSource,
    }
}

/// A target is a slot id, or the id of a meal whose card was dropped onto.
fn resolve_target(store: &WeeklyPlanStore, target: &str) -> Option<SlotId> {
    target
        .parse::<SlotId>()
        .ok()
        .or_else(|| store.find_meal(target))
}
