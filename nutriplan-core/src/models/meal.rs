use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::lenient;
use super::MacroTotals;

/// A recipe that can be placed into a slot of the weekly plan.
///
/// Meals come from the recommendation service or from a persisted plan and
/// are never edited in place: slots hold them behind an `Arc` and replacing
/// a slot's meal swaps the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_negative_f64")]
    pub calories: f64,
    #[serde(default, deserialize_with = "lenient::non_negative_f64")]
    pub protein: f64,
    #[serde(default, deserialize_with = "lenient::non_negative_f64")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient::non_negative_f64")]
    pub fats: f64,
    /// Minutes
    #[serde(default, deserialize_with = "lenient::non_negative_u32")]
    pub cook_time: u32,
    /// Free-form display time (e.g. "25 min"), kept as provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(
        default = "lenient::default_servings",
        deserialize_with = "lenient::servings"
    )]
    pub servings: u32,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub tags: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
}

impl Meal {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fats: 0.0,
            cook_time: 0,
            time: None,
            servings: 1,
            tags: BTreeSet::new(),
            ingredients: Vec::new(),
            steps: None,
        }
    }

    pub fn with_macros(mut self, calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        self.calories = calories;
        self.protein = protein;
        self.carbs = carbs;
        self.fats = fats;
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn macros(&self) -> MacroTotals {
        MacroTotals::new(self.calories, self.protein, self.carbs, self.fats)
    }

    /// Case-insensitive substring match on the meal name.
    pub fn name_matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.0} kcal)", self.name, self.calories)
    }
}
