//! Daily macro totals and the calorie-share math behind the dashboard chart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::FoodEntry;

/// Calories per gram of carbohydrate (Atwater factor)
const KCAL_PER_CARB_G: f64 = 4.0;

/// Calories per gram of protein
const KCAL_PER_PROTEIN_G: f64 = 4.0;

/// Calories per gram of fat
const KCAL_PER_FAT_G: f64 = 9.0;

/// Aggregated totals for a single day, as returned by the day-summary
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_carbs_g: f64,
    pub total_protein_g: f64,
    pub total_fat_g: f64,
}

impl DaySummary {
    /// Compute totals locally from a list of entries. Used as a fallback
    /// while the summary endpoint response is still in flight.
    pub fn from_entries(date: NaiveDate, entries: &[FoodEntry]) -> Self {
        let mut summary = Self {
            date,
            ..Default::default()
        };
        for entry in entries {
            summary.total_calories += entry.calories;
            summary.total_carbs_g += entry.carbs_g;
            summary.total_protein_g += entry.protein_g;
            summary.total_fat_g += entry.fat_g;
        }
        summary
    }

    pub fn macro_split(&self) -> MacroSplit {
        MacroSplit::from_grams(self.total_carbs_g, self.total_protein_g, self.total_fat_g)
    }
}

/// One row from the all-history summaries endpoint.
///
/// Note the field names differ from `DaySummary`: this endpoint aggregates
/// in the database and omits the `_g` suffix on the macro keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl DailySummary {
    pub fn macro_split(&self) -> MacroSplit {
        MacroSplit::from_grams(self.total_carbs, self.total_protein, self.total_fat)
    }
}

/// Calorie share attributable to each macro, for proportional display.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroSplit {
    pub carbs_kcal: f64,
    pub protein_kcal: f64,
    pub fat_kcal: f64,
}

impl MacroSplit {
    pub fn from_grams(carbs_g: f64, protein_g: f64, fat_g: f64) -> Self {
        Self {
            carbs_kcal: carbs_g * KCAL_PER_CARB_G,
            protein_kcal: protein_g * KCAL_PER_PROTEIN_G,
            fat_kcal: fat_g * KCAL_PER_FAT_G,
        }
    }

    pub fn total_kcal(&self) -> f64 {
        self.carbs_kcal + self.protein_kcal + self.fat_kcal
    }

    /// Percentage of calories from carbs, rounded. Zero when nothing is logged.
    pub fn carbs_pct(&self) -> u16 {
        self.pct(self.carbs_kcal)
    }

    pub fn protein_pct(&self) -> u16 {
        self.pct(self.protein_kcal)
    }

    pub fn fat_pct(&self) -> u16 {
        self.pct(self.fat_kcal)
    }

    fn pct(&self, part: f64) -> u16 {
        let total = self.total_kcal();
        if total <= 0.0 {
            return 0;
        }
        (part / total * 100.0).round() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_split_factors() {
        let split = MacroSplit::from_grams(100.0, 50.0, 10.0);
        assert_eq!(split.carbs_kcal, 400.0);
        assert_eq!(split.protein_kcal, 200.0);
        assert_eq!(split.fat_kcal, 90.0);
        assert_eq!(split.total_kcal(), 690.0);
        assert_eq!(split.carbs_pct(), 58);
        assert_eq!(split.protein_pct(), 29);
        assert_eq!(split.fat_pct(), 13);
    }

    #[test]
    fn test_macro_split_empty_day() {
        let split = MacroSplit::from_grams(0.0, 0.0, 0.0);
        assert_eq!(split.total_kcal(), 0.0);
        assert_eq!(split.carbs_pct(), 0);
    }

    #[test]
    fn test_parse_day_summary() {
        let json = r#"{"date": "2025-03-14", "total_calories": 1850.5,
            "total_carbs_g": 210.0, "total_protein_g": 120.3, "total_fat_g": 55.0}"#;
        let summary: DaySummary = serde_json::from_str(json).expect("Failed to parse day summary");
        assert_eq!(summary.total_calories, 1850.5);
        assert_eq!(summary.total_protein_g, 120.3);
    }

    #[test]
    fn test_parse_daily_summary_row() {
        // The all-history endpoint drops the _g suffix
        let json = r#"{"date": "2025-03-13", "total_calories": 2100.0,
            "total_protein": 130.0, "total_carbs": 240.0, "total_fat": 60.0}"#;
        let row: DailySummary = serde_json::from_str(json).expect("Failed to parse summary row");
        assert_eq!(row.total_carbs, 240.0);
        assert_eq!(row.macro_split().fat_kcal, 540.0);
    }

    #[test]
    fn test_summary_from_entries() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let entries: Vec<FoodEntry> = serde_json::from_str(
            r#"[
                {"id": 1, "date": "2025-03-14", "timestamp": "2025-03-14T08:00:00Z",
                 "name": "eggs", "weight_g": 100.0, "carbs_g": 1.0, "protein_g": 13.0,
                 "fat_g": 10.0, "calories": 146.0},
                {"id": 2, "date": "2025-03-14", "timestamp": "2025-03-14T12:30:00Z",
                 "name": "rice", "weight_g": 150.0, "carbs_g": 42.0, "protein_g": 4.0,
                 "fat_g": 0.5, "calories": 188.5}
            ]"#,
        )
        .unwrap();

        let summary = DaySummary::from_entries(date, &entries);
        assert_eq!(summary.total_calories, 334.5);
        assert_eq!(summary.total_carbs_g, 43.0);
        assert_eq!(summary.total_protein_g, 17.0);
        assert_eq!(summary.total_fat_g, 10.5);
    }
}
