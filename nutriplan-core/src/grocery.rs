//! Grocery list generated from the weekly plan.
//!
//! Ingredients of every planned meal are collected, identical names merged
//! into one item whose quantity counts how many times it appears, and each
//! item is filed under a store category by keyword. Manual items can be
//! added alongside, and items checked off as they are bought.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

use crate::models::WeeklyPlan;

/// Store aisle an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroceryCategory {
    #[serde(rename = "Bakery")]
    Bakery,
    #[serde(rename = "Beverages")]
    Beverages,
    #[serde(rename = "Dairy")]
    Dairy,
    #[serde(rename = "Frozen")]
    Frozen,
    #[serde(rename = "Grains")]
    Grains,
    #[serde(rename = "Meat & Fish")]
    MeatAndFish,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Pantry")]
    Pantry,
    #[serde(rename = "Produce")]
    Produce,
}

/// Keyword table, checked in order; the first category with a keyword
/// contained in the ingredient name wins.
const CATEGORY_KEYWORDS: &[(GroceryCategory, &[&str])] = &[
    (
        GroceryCategory::MeatAndFish,
        &[
            "chicken", "beef", "fish", "salmon", "steak", "pork", "meat", "egg", "turkey", "lamb",
            "shrimp", "tuna",
        ],
    ),
    (
        GroceryCategory::Dairy,
        &[
            "milk",
            "cheese",
            "yogurt",
            "cream",
            "butter",
            "ghee",
            "whey",
            "mozzarella",
            "cheddar",
        ],
    ),
    (
        GroceryCategory::Bakery,
        &["bread", "bun", "tortilla", "bagel", "pita", "muffin", "toast"],
    ),
    (
        GroceryCategory::Produce,
        &[
            "apple",
            "banana",
            "berry",
            "spinach",
            "lettuce",
            "tomato",
            "potato",
            "onion",
            "garlic",
            "carrot",
            "vegetable",
            "fruit",
            "pepper",
            "cucumber",
            "broccoli",
            "avocado",
            "lemon",
            "lime",
            "herb",
            "cilantro",
            "parsley",
            "basil",
        ],
    ),
    (
        GroceryCategory::Grains,
        &["rice", "pasta", "quinoa", "oat", "grain", "flour", "noodle", "couscous"],
    ),
    (
        GroceryCategory::Beverages,
        &["coffee", "tea", "juice", "soda", "water", "drink"],
    ),
    (GroceryCategory::Frozen, &["frozen", "ice cream"]),
    (
        GroceryCategory::Pantry,
        &[
            "oil", "sauce", "spice", "salt", "sugar", "honey", "syrup", "can", "jar", "nut",
            "seed", "bean", "lentil", "chickpea", "stock", "broth",
        ],
    ),
];

impl GroceryCategory {
    pub fn name(self) -> &'static str {
        match self {
            GroceryCategory::Bakery => "Bakery",
            GroceryCategory::Beverages => "Beverages",
            GroceryCategory::Dairy => "Dairy",
            GroceryCategory::Frozen => "Frozen",
            GroceryCategory::Grains => "Grains",
            GroceryCategory::MeatAndFish => "Meat & Fish",
            GroceryCategory::Other => "Other",
            GroceryCategory::Pantry => "Pantry",
            GroceryCategory::Produce => "Produce",
        }
    }

    /// Files an ingredient by keyword, case-insensitively.
    pub fn categorize(ingredient: &str) -> Self {
        let lower = ingredient.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(GroceryCategory::Other)
    }
}

impl fmt::Display for GroceryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemSource {
    MealPlan,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub id: String,
    pub name: String,
    pub category: GroceryCategory,
    pub quantity: String,
    pub unit: String,
    pub checked: bool,
    pub source: ItemSource,
}

impl fmt::Display for GroceryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.checked { 'x' } else { ' ' };
        write!(f, "[{}] {}", mark, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroceryList {
    items: Vec<GroceryItem>,
}

impl GroceryList {
    /// Builds the list from every planned meal's ingredients.
    ///
    /// Items are sorted by category name, then item name.
    pub fn from_plan(plan: &WeeklyPlan) -> Self {
        let mut items: Vec<GroceryItem> = Vec::new();
        let mut index_by_name: HashMap<&str, usize> = HashMap::new();

        let ingredients = plan
            .meals()
            .flat_map(|(_, meal)| meal.ingredients.iter())
            .map(|ingredient| ingredient.trim())
            .filter(|name| !name.is_empty());

        for name in ingredients {
            match index_by_name.get(name) {
                Some(&index) => {
                    let item = &mut items[index];
                    let count = item.quantity.parse::<u32>().unwrap_or(1);
                    item.quantity = (count + 1).to_string();
                }
                None => {
                    index_by_name.insert(name, items.len());
                    items.push(GroceryItem {
                        id: (items.len() + 1).to_string(),
                        name: name.to_string(),
                        category: GroceryCategory::categorize(name),
                        quantity: "1".to_string(),
                        unit: "item".to_string(),
                        checked: false,
                        source: ItemSource::MealPlan,
                    });
                }
            }
        }

        items.sort_by_cached_key(|item| (item.category.name(), item.name.to_lowercase()));

        Self { items }
    }

    pub fn items(&self) -> &[GroceryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds an item by hand. Returns its id, or `None` if an item with the
    /// same name (case-insensitive) is already listed.
    pub fn add_manual(
        &mut self,
        name: &str,
        quantity: Option<&str>,
        unit: Option<&str>,
    ) -> Option<String> {
        let name = name.trim();
        let name_lower = name.to_lowercase();
        if name.is_empty()
            || self
                .items
                .iter()
                .any(|item| item.name.to_lowercase() == name_lower)
        {
            return None;
        }

        let id = Uuid::new_v4().to_string();
        self.items.push(GroceryItem {
            id: id.clone(),
            name: name.to_string(),
            category: GroceryCategory::categorize(name),
            quantity: quantity.unwrap_or("1").to_string(),
            unit: unit.unwrap_or("item").to_string(),
            checked: false,
            source: ItemSource::Manual,
        });
        Some(id)
    }

    /// Flips an item's checked state. Returns false if the id is unknown.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.checked = !item.checked;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let len_before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != len_before
    }

    /// Removes every checked item.
    pub fn clear_completed(&mut self) {
        self.items.retain(|item| !item.checked);
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.checked).count()
    }

    pub fn by_category(&self) -> BTreeMap<&'static str, Vec<&GroceryItem>> {
        let mut grouped: BTreeMap<&'static str, Vec<&GroceryItem>> = BTreeMap::new();
        for item in &self.items {
            grouped.entry(item.category.name()).or_default().push(item);
        }
        grouped
    }

    /// Plain-text export, grouped by category.
    pub fn to_text(&self) -> String {
        let mut text = String::from("My Smart Grocery List\n\n");
        for (category, items) in self.by_category() {
            text.push_str(&format!("--- {} ---\n", category));
            for item in items {
                text.push_str(&format!("{}\n", item));
            }
            text.push('\n');
        }
        text
    }
}
