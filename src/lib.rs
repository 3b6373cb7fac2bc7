//! Macrolog - a terminal client for a nutrition-tracking REST API.
//!
//! The library crate exposes the API client, credential store, and domain
//! models so the binary and the integration tests share one implementation.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
pub mod ui;
pub mod utils;
