use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::{Meal, MacroTotals, MealType};

/// The three meal slots of one day. Empty slots are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMeals {
    #[serde(default, deserialize_with = "slot")]
    pub breakfast: Option<Arc<Meal>>,
    #[serde(default, deserialize_with = "slot")]
    pub lunch: Option<Arc<Meal>>,
    #[serde(default, deserialize_with = "slot")]
    pub dinner: Option<Arc<Meal>>,
}

impl DayMeals {
    pub fn get(&self, meal_type: MealType) -> Option<&Arc<Meal>> {
        match meal_type {
            MealType::Breakfast => self.breakfast.as_ref(),
            MealType::Lunch => self.lunch.as_ref(),
            MealType::Dinner => self.dinner.as_ref(),
        }
    }

    /// Replaces a slot, returning its previous occupant.
    pub fn set(&mut self, meal_type: MealType, meal: Option<Arc<Meal>>) -> Option<Arc<Meal>> {
        let slot = match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
        };
        std::mem::replace(slot, meal)
    }

    /// Occupied slots in breakfast, lunch, dinner order.
    pub fn meals(&self) -> impl Iterator<Item = (MealType, &Arc<Meal>)> {
        MealType::ALL
            .into_iter()
            .filter_map(move |meal_type| self.get(meal_type).map(|meal| (meal_type, meal)))
    }

    pub fn is_empty(&self) -> bool {
        self.meals().next().is_none()
    }

    /// Sum of the occupied slots' macros; empty slots contribute zero.
    pub fn totals(&self) -> MacroTotals {
        self.meals().map(|(_, meal)| meal.macros()).sum()
    }
}

/// A slot whose meal cannot be read is treated as empty rather than failing
/// the whole plan.
fn slot<'de, D>(deserializer: D) -> Result<Option<Arc<Meal>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value::<Meal>(value) {
        Ok(meal) => Ok(Some(Arc::new(meal))),
        Err(e) => {
            tracing::warn!("Dropping unreadable meal from plan: {}", e);
            Ok(None)
        }
    }
}
