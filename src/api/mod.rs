//! REST API client module for the nutrition-tracking service.
//!
//! This module provides the `ApiClient` for communicating with the remote
//! API: JWT bearer authentication with transparent refresh-on-401, plus
//! typed endpoint methods for entries, summaries, logging, and search.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiRequest};
pub use error::ApiError;
