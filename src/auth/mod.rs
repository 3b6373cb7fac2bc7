//! Credential storage for the API client.
//!
//! Access and refresh tokens live behind the `TokenStore` trait so the
//! client never holds them in memory between requests. Two implementations:
//!
//! - `DiskTokenStore`: `tokens.json` in the per-user data directory
//! - `MemoryTokenStore`: in-memory map for tests and one-off sessions

pub mod store;

pub use store::{DiskTokenStore, MemoryTokenStore, TokenKind, TokenStore};
