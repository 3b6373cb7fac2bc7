//! Food-database search results.

use serde::Deserialize;

/// One hit from the food search endpoint. Macros are per listed serving,
/// not per 100g.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodSearchResult {
    pub name: String,
    pub serving_weight_grams: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub source: String,
    /// Upstream identifier; empty string when the source has none.
    #[serde(default)]
    pub source_food_id: Option<String>,
}

impl FoodSearchResult {
    /// Compact per-serving label for list display.
    pub fn macros_label(&self) -> String {
        format!(
            "{:.0} kcal  P {:.0}g  C {:.0}g  F {:.0}g  ({:.0}g serving)",
            self.calories, self.protein_g, self.carbs_g, self.fat_g, self.serving_weight_grams
        )
    }
}

/// Response envelope from the food search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<FoodSearchResult>,
}
