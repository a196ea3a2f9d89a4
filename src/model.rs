//! Data model for the upstream recipe API.
//!
//! Field names follow the upstream JSON envelope (`idMeal`, `strMeal`, ...)
//! through serde renames. A `meals` field of `null` means "no results" and is
//! mapped to an empty list; it is never a failure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A recipe category as listed by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "idCategory")]
    pub id: String,
    #[serde(rename = "strCategory")]
    pub name: String,
    #[serde(rename = "strCategoryThumb")]
    pub thumb: String,
    #[serde(rename = "strCategoryDescription")]
    pub description: String,
}

/// Envelope for the list-categories operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

/// Abbreviated meal record returned by filter and search operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSummary {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb")]
    pub thumb: Option<String>,
}

/// Full meal detail returned by lookup and search operations.
///
/// The numbered `strIngredient1..20` / `strMeasure1..20` fields land in
/// `extra` and are read back through [`Meal::ingredients`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory")]
    pub category: Option<String>,
    #[serde(rename = "strArea")]
    pub area: Option<String>,
    #[serde(rename = "strInstructions")]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb")]
    pub thumb: Option<String>,
    #[serde(rename = "strYoutube")]
    pub youtube: Option<String>,
    #[serde(rename = "strTags")]
    pub tags: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Option<String>>,
}

/// Upper bound of the numbered ingredient fields in the upstream payload.
const INGREDIENT_SLOTS: usize = 20;

impl Meal {
    /// Pairs each `strIngredientN` with its `strMeasureN`, skipping blank and
    /// null entries. The index range is fixed by the upstream schema.
    pub fn ingredients(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for i in 1..=INGREDIENT_SLOTS {
            let ingredient = self.extra_field(&format!("strIngredient{}", i));
            let measure = self.extra_field(&format!("strMeasure{}", i));

            match ingredient {
                Some(name) if !name.trim().is_empty() => {
                    pairs.push((name, measure.unwrap_or_default().trim().to_string()));
                }
                _ => {}
            }
        }
        pairs
    }

    fn extra_field(&self, key: &str) -> Option<String> {
        self.extra.get(key).and_then(|v| v.clone())
    }
}

/// Envelope for every meal-returning operation.
///
/// The upstream API encodes "no results" as `{ "meals": null }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealList<T> {
    pub meals: Option<Vec<T>>,
}

impl<T> MealList<T> {
    /// Unwraps the envelope, mapping a `null` meals field to an empty list.
    pub fn into_results(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.as_ref().map_or(true, |m| m.is_empty())
    }
}
