//! Domain models for logged food entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One logged food, as returned by the entries endpoints.
///
/// Macros and calories are a snapshot taken by the server at logging time,
/// so historical entries stay accurate if the food database changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub weight_g: f64,
    pub carbs_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub calories: f64,
}

impl FoodEntry {
    /// Clock time of the entry for table display.
    pub fn time_display(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Payload for creating an entry. The server resolves the food by name and
/// computes the macro snapshot for the given amount.
#[derive(Debug, Clone, Serialize)]
pub struct NewEntry {
    pub food: String,
    pub amount_g: f64,
    pub date: NaiveDate,
}

/// One food recorded by the natural-language logging endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggedFood {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Response envelope from the natural-language logging endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LogFoodResponse {
    #[serde(default)]
    pub entries: Vec<LoggedFood>,
}
