use std::fmt;
use std::str::FromStr;

use super::{Day, MealType, ParseError};

/// Addresses one (day, meal type) cell of the weekly grid.
///
/// The string form `"{Day}-{mealType}"` (e.g. `Monday-breakfast`) is what
/// drop targets are keyed by. It is derived on demand and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub day: Day,
    pub meal_type: MealType,
}

impl SlotId {
    pub fn new(day: Day, meal_type: MealType) -> Self {
        Self { day, meal_type }
    }

    /// All 21 slots in calendar, then breakfast-lunch-dinner, order.
    pub fn all() -> impl Iterator<Item = SlotId> {
        Day::ALL.into_iter().flat_map(|day| {
            MealType::ALL
                .into_iter()
                .map(move |meal_type| SlotId::new(day, meal_type))
        })
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.meal_type)
    }
}

impl FromStr for SlotId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, meal_type) = s
            .split_once('-')
            .ok_or_else(|| ParseError::Slot(s.to_string()))?;
        let day = day.parse().map_err(|_| ParseError::Slot(s.to_string()))?;
        let meal_type = meal_type
            .parse()
            .map_err(|_| ParseError::Slot(s.to_string()))?;
        Ok(SlotId { day, meal_type })
    }
}
