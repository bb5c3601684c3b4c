use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use super::{Day, DayMeals, Meal, SlotId};

/// Seven days of three meal slots each.
///
/// Every day and every slot always exists; only the meal held in a slot
/// varies. The JSON form is an object keyed by day name in calendar order:
///
/// ```json
/// { "Monday": { "breakfast": null, "lunch": { ... }, "dinner": null }, ... }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyPlan {
    days: [DayMeals; 7],
}

impl WeeklyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Day) -> &DayMeals {
        &self.days[day.index()]
    }

    pub fn day_mut(&mut self, day: Day) -> &mut DayMeals {
        &mut self.days[day.index()]
    }

    pub fn get(&self, slot: SlotId) -> Option<&Arc<Meal>> {
        self.day(slot.day).get(slot.meal_type)
    }

    /// Replaces a slot, returning its previous occupant.
    pub fn set(&mut self, slot: SlotId, meal: Option<Arc<Meal>>) -> Option<Arc<Meal>> {
        self.day_mut(slot.day).set(slot.meal_type, meal)
    }

    pub fn days(&self) -> impl Iterator<Item = (Day, &DayMeals)> {
        Day::ALL.into_iter().map(move |day| (day, self.day(day)))
    }

    /// Occupied slots in calendar order.
    pub fn meals(&self) -> impl Iterator<Item = (SlotId, &Arc<Meal>)> {
        self.days().flat_map(|(day, meals)| {
            meals
                .meals()
                .map(move |(meal_type, meal)| (SlotId::new(day, meal_type), meal))
        })
    }

    pub fn meal_count(&self) -> usize {
        self.meals().count()
    }

    pub fn is_empty(&self) -> bool {
        self.meals().next().is_none()
    }
}

impl Serialize for WeeklyPlan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Day::ALL.len()))?;
        for (day, meals) in self.days() {
            map.serialize_entry(day.name(), meals)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeeklyPlan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(WeeklyPlanVisitor)
    }
}

struct WeeklyPlanVisitor;

impl<'de> Visitor<'de> for WeeklyPlanVisitor {
    type Value = WeeklyPlan;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of weekday names to meal slots")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut plan = WeeklyPlan::new();
        while let Some(key) = map.next_key::<String>()? {
            match key.parse::<Day>() {
                Ok(day) => {
                    let meals = map.next_value::<Option<DayMeals>>()?;
                    *plan.day_mut(day) = meals.unwrap_or_default();
                }
                Err(_) => {
                    tracing::debug!("Ignoring unknown day key '{}' in plan", key);
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(plan)
    }
}
