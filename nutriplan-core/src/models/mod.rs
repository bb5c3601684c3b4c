mod day;
mod day_meals;
pub(crate) mod lenient;
mod meal;
mod meal_type;
mod nutrient;
mod slot;
mod weekly_plan;

pub use day::Day;
pub use day_meals::DayMeals;
pub use meal::Meal;
pub use meal_type::MealType;
pub use nutrient::MacroTotals;
pub use slot::SlotId;
pub use weekly_plan::WeeklyPlan;

use thiserror::Error;

/// Errors from parsing day, meal type and slot names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid day '{0}'. Valid options: Monday..Sunday or Mon..Sun")]
    Day(String),
    #[error("Invalid meal type '{0}'. Valid options: breakfast, lunch, dinner")]
    MealType(String),
    #[error("Invalid slot '{0}'. Expected '<Day>-<mealType>', e.g. 'Monday-breakfast'")]
    Slot(String),
}
