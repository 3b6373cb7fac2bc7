//! Data models for nutrition-tracking entities.
//!
//! This module contains the data structures used to represent the remote
//! API's payloads:
//!
//! - `FoodEntry`, `NewEntry`: logged foods and the creation payload
//! - `LoggedFood`, `LogFoodResponse`: natural-language logging results
//! - `DaySummary`, `DailySummary`, `MacroSplit`: per-day macro totals
//! - `FoodSearchResult`, `SearchResponse`: food-database search hits

pub mod entry;
pub mod food;
pub mod summary;

pub use entry::{FoodEntry, LogFoodResponse, LoggedFood, NewEntry};
pub use food::{FoodSearchResult, SearchResponse};
pub use summary::{DailySummary, DaySummary, MacroSplit};
