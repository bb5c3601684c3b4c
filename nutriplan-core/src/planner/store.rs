//! The weekly grid state machine.
//!
//! `WeeklyPlanStore` exclusively owns the plan for a session and is the
//! only thing that mutates it. Persistence is not its concern: the sync
//! session observes mutations and handles caching and remote writes.

use std::borrow::Cow;
use std::sync::Arc;

use crate::models::{Day, MacroTotals, Meal, MealType, SlotId, WeeklyPlan};

#[derive(Debug, Clone, Default)]
pub struct WeeklyPlanStore {
    plan: WeeklyPlan,
}

impl WeeklyPlanStore {
    pub fn new(plan: WeeklyPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &WeeklyPlan {
        &self.plan
    }

    pub fn into_plan(self) -> WeeklyPlan {
        self.plan
    }

    /// Swaps in a whole plan, e.g. one adopted from the remote store.
    pub fn replace(&mut self, plan: WeeklyPlan) {
        self.plan = plan;
    }

    pub fn slot(&self, day: Day, meal_type: MealType) -> Option<&Arc<Meal>> {
        self.plan.day(day).get(meal_type)
    }

    /// Puts `meal` in the slot, discarding whatever was there.
    pub fn assign(&mut self, day: Day, meal_type: MealType, meal: Arc<Meal>) {
        tracing::debug!("Assigning '{}' to {}", meal.name, SlotId::new(day, meal_type));
        self.plan.day_mut(day).set(meal_type, Some(meal));
    }

    /// Empties the slot. Clearing an empty slot is a no-op on the data.
    pub fn clear(&mut self, day: Day, meal_type: MealType) {
        tracing::debug!("Clearing {}", SlotId::new(day, meal_type));
        self.plan.day_mut(day).set(meal_type, None);
    }

    /// Empties every slot of every day.
    pub fn clear_all(&mut self) {
        tracing::debug!("Clearing all {} planned meal(s)", self.plan.meal_count());
        self.plan = WeeklyPlan::new();
    }

    /// Moves the meal at `from` into `to`, overwriting the destination.
    ///
    /// The destination's previous occupant is dropped from the plan, not
    /// swapped back into `from`; it is returned only so callers can report
    /// it. Returns `None` without changes if `from` is empty or equals `to`.
    pub fn move_meal(&mut self, from: SlotId, to: SlotId) -> Option<MoveResult> {
        if from == to {
            return None;
        }
        let meal = self.plan.set(from, None)?;
        let displaced = self.plan.set(to, Some(Arc::clone(&meal)));
        Some(MoveResult { meal, displaced })
    }

    /// First slot, in calendar order, whose meal has this id.
    pub fn find_meal(&self, meal_id: &str) -> Option<SlotId> {
        self.plan
            .meals()
            .find(|(_, meal)| meal.id == meal_id)
            .map(|(slot, _)| slot)
    }

    /// Macro totals for one day. Computed on every call.
    pub fn daily_summary(&self, day: Day) -> MacroTotals {
        self.plan.day(day).totals()
    }

    pub fn weekly_summary(&self) -> [(Day, MacroTotals); 7] {
        Day::ALL.map(|day| (day, self.daily_summary(day)))
    }

    /// A copy of the plan keeping only meals whose name contains `query`
    /// (case-insensitive). An empty query borrows the plan unchanged.
    pub fn filtered_view(&self, query: &str) -> Cow<'_, WeeklyPlan> {
        if query.is_empty() {
            return Cow::Borrowed(&self.plan);
        }
        let mut view = self.plan.clone();
        for slot in SlotId::all() {
            if view.get(slot).is_some_and(|meal| !meal.name_matches(query)) {
                view.set(slot, None);
            }
        }
        Cow::Owned(view)
    }

    /// Every ingredient of every planned meal, in calendar and slot order.
    pub fn ingredients(&self) -> Vec<&str> {
        self.plan
            .meals()
            .flat_map(|(_, meal)| meal.ingredients.iter().map(String::as_str))
            .collect()
    }
}

/// What a `move_meal` did.
#[derive(Debug, Clone)]
pub struct MoveResult {
    pub meal: Arc<Meal>,
    pub displaced: Option<Arc<Meal>>,
}
