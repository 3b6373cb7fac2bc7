//! Application state management for macrolog.
//!
//! This module contains the core `App` struct that manages all application
//! state, including UI state, fetched nutrition data, login/registration
//! form state, and background task coordination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::models::{DailySummary, DaySummary, FoodEntry, FoodSearchResult, LoggedFood, NewEntry};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is sufficient for a full refresh (~4 API calls) with headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the food-description and search inputs.
const MAX_QUERY_LENGTH: usize = 120;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Today,
    History,
    Summaries,
    Dashboard,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Today => "Today",
            Tab::History => "History",
            Tab::Summaries => "Summaries",
            Tab::Dashboard => "Dashboard",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Today => Tab::History,
            Tab::History => Tab::Summaries,
            Tab::Summaries => Tab::Dashboard,
            Tab::Dashboard => Tab::Today,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Today => Tab::Dashboard,
            Tab::History => Tab::Today,
            Tab::Summaries => Tab::History,
            Tab::Dashboard => Tab::Summaries,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    Registering,
    EnteringFood,
    SearchingFood,
    ConfirmingDelete,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Registration form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegisterFocus {
    Username,
    Password,
    Confirm,
    Button,
}

/// Which half of the food-search overlay owns keyboard input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchFocus {
    Query,
    Results,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background fetch tasks.
///
/// These variants are sent through an MPSC channel from spawned fetch tasks
/// back to the main application. Each variant carries one kind of data from
/// the nutrition API.
enum RefreshResult {
    /// Today's entries fetched successfully
    TodayEntries(Vec<FoodEntry>),
    /// Aggregated totals for today
    TodaySummary(DaySummary),
    /// Entries for the History tab's date (date, entries)
    HistoryEntries(NaiveDate, Vec<FoodEntry>),
    /// Per-day totals across the whole logging history
    DailySummaries(Vec<DailySummary>),
    /// Foods recorded by the natural-language logging endpoint
    FoodLogged(Vec<LoggedFood>),
    /// A single entry created from a food-search pick
    EntryCreated(FoodEntry),
    /// An entry was deleted
    EntryDeleted(i64),
    /// Food-database search hits for the search overlay
    SearchResults(Vec<FoodSearchResult>),
    /// Signal that a full refresh has completed
    RefreshComplete,
    /// An error occurred in a background task
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    /// Set by the API client's unauthenticated callback; polled by the
    /// event loop and converted into the login overlay.
    auth_expired: Arc<AtomicBool>,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Registration form state
    pub register_username: String,
    pub register_password: String,
    pub register_confirm: String,
    pub register_focus: RegisterFocus,
    pub register_error: Option<String>,

    // Food logging and search overlays
    pub food_input: String,
    pub search_input: String,
    pub search_results: Vec<FoodSearchResult>,
    pub search_selection: usize,
    pub search_focus: SearchFocus,

    // Fetched data
    pub today_entries: Vec<FoodEntry>,
    pub today_summary: DaySummary,
    pub history_date: NaiveDate,
    pub history_entries: Vec<FoodEntry>,
    pub daily_summaries: Vec<DailySummary>,

    // Selection indices
    pub today_selection: usize,
    pub history_selection: usize,
    pub summaries_selection: usize,

    // Background task channel
    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance.
    ///
    /// `auth_expired` is the flag the API client's unauthenticated callback
    /// sets; the event loop polls it via `check_auth_expired`.
    pub fn new(config: Config, api: ApiClient, auth_expired: Arc<AtomicBool>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Pre-fill login from env vars or config
        let login_username = std::env::var("MACROLOG_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var("MACROLOG_PASSWORD").unwrap_or_default();

        Self {
            config,
            api,
            auth_expired,

            state: AppState::Normal,
            current_tab: Tab::Today,

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            register_username: String::new(),
            register_password: String::new(),
            register_confirm: String::new(),
            register_focus: RegisterFocus::Username,
            register_error: None,

            food_input: String::new(),
            search_input: String::new(),
            search_results: Vec::new(),
            search_selection: 0,
            search_focus: SearchFocus::Query,

            today_entries: Vec::new(),
            today_summary: DaySummary::default(),
            history_date: Local::now().date_naive(),
            history_entries: Vec::new(),
            daily_summaries: Vec::new(),

            today_selection: 0,
            history_selection: 0,
            summaries_selection: 0,

            refresh_rx: Some(rx),
            refresh_tx: tx,

            status_message: None,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check if an access token is stored for this session
    pub fn is_authenticated(&self) -> bool {
        self.api.has_session()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Start account registration (show registration overlay)
    pub fn start_register(&mut self) {
        self.state = AppState::Registering;
        self.register_focus = RegisterFocus::Username;
        self.register_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.clone();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        match self.api.login(&username, &password).await {
            Ok(()) => {
                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(Self::login_error_message(&e));
                Err(e)
            }
        }
    }

    /// Map a login failure to a user-friendly message
    fn login_error_message(e: &anyhow::Error) -> String {
        let text = e.to_string().to_lowercase();
        if text.contains("unauthorized") || text.contains("401") {
            "Invalid username or password".to_string()
        } else if text.contains("network") || text.contains("connect") {
            "Unable to connect to server. Check your internet connection.".to_string()
        } else if text.contains("timeout") {
            "Connection timed out. Please try again.".to_string()
        } else {
            format!("Login failed: {}", e)
        }
    }

    /// Attempt registration with the form fields, logging in on success
    pub async fn attempt_register(&mut self) -> Result<()> {
        let username = self.register_username.clone();
        let password = self.register_password.clone();

        if username.is_empty() || password.is_empty() {
            self.register_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }
        if password != self.register_confirm {
            self.register_error = Some("Passwords do not match".to_string());
            return Err(anyhow::anyhow!("Passwords do not match"));
        }

        self.register_error = None;

        if let Err(e) = self.api.register(&username, &password).await {
            error!(error = %e, "Registration failed");
            let text = e.to_string().to_lowercase();
            self.register_error = if text.contains("400") || text.contains("bad request") {
                Some("Username is already taken".to_string())
            } else {
                Some(format!("Registration failed: {}", e))
            };
            return Err(e);
        }

        match self.api.login(&username, &password).await {
            Ok(()) => {
                self.config.last_username = Some(username.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.login_username = username;
                self.register_password.clear();
                self.register_confirm.clear();
                self.state = AppState::Normal;
                info!("Registration successful");
                Ok(())
            }
            Err(e) => {
                // Account exists but the follow-up login failed; fall back
                // to the login overlay with the username pre-filled
                self.login_username = username;
                self.start_login();
                self.login_error = Some(Self::login_error_message(&e));
                Err(e)
            }
        }
    }

    /// Log out: delete stored credentials, drop fetched data, show login
    pub fn logout(&mut self) {
        if let Err(e) = self.api.logout() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        self.today_entries.clear();
        self.today_summary = DaySummary::default();
        self.history_entries.clear();
        self.daily_summaries.clear();
        self.status_message = None;
        self.start_login();
        info!("Logged out");
    }

    /// Convert a fired unauthenticated callback into the login overlay.
    /// Called once per event-loop tick; the flag is reset on read.
    pub fn check_auth_expired(&mut self) {
        if self.auth_expired.swap(false, Ordering::SeqCst)
            && !matches!(self.state, AppState::LoggingIn | AppState::Registering)
        {
            warn!("Session expired, returning to login");
            self.status_message = Some("Session expired. Please log in again.".to_string());
            self.start_login();
        }
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Spawn a background task to refresh today's entries, today's summary,
    /// and the all-history summaries. The UI never blocks on the network.
    pub fn refresh_all_background(&mut self) {
        info!("Starting background refresh");

        // Clone is cheap - the client is Arc-backed
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            let (entries_res, summary_res, daily_res) = tokio::join!(
                api.today_entries(),
                api.day_summary(None),
                api.daily_summaries(),
            );

            match entries_res {
                Ok(entries) => Self::send_result(&tx, RefreshResult::TodayEntries(entries)).await,
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Entries: {}", e))).await
                }
            }
            match summary_res {
                Ok(summary) => Self::send_result(&tx, RefreshResult::TodaySummary(summary)).await,
                Err(e) => {
                    // Non-fatal: the local from_entries fallback covers the gap
                    warn!(error = %e, "Today summary fetch failed");
                }
            }
            match daily_res {
                Ok(rows) => Self::send_result(&tx, RefreshResult::DailySummaries(rows)).await,
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Summaries: {}", e))).await
                }
            }

            Self::send_result(&tx, RefreshResult::RefreshComplete).await;
        });

        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Fetch entries for the History tab's current date in the background
    pub fn refresh_history(&mut self) {
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        let date = self.history_date;

        tokio::spawn(async move {
            match api.entries_for(date).await {
                Ok(entries) => {
                    Self::send_result(&tx, RefreshResult::HistoryEntries(date, entries)).await;
                }
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("History: {}", e))).await;
                }
            }
        });
    }

    /// Submit the natural-language food description for logging
    pub fn submit_food_log(&mut self) {
        let query = self.food_input.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.food_input.clear();
        self.state = AppState::Normal;

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            match api.log_food(&query).await {
                Ok(foods) => {
                    Self::send_result(&tx, RefreshResult::FoodLogged(foods)).await;
                    // Re-fetch so the Today tab shows the server's snapshot
                    if let Ok(entries) = api.today_entries().await {
                        Self::send_result(&tx, RefreshResult::TodayEntries(entries)).await;
                    }
                    if let Ok(summary) = api.day_summary(None).await {
                        Self::send_result(&tx, RefreshResult::TodaySummary(summary)).await;
                    }
                }
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Log food: {}", e))).await;
                }
            }
        });

        self.status_message = Some("Logging food...".to_string());
    }

    /// Run the food-database search with the current query
    pub fn run_search(&mut self) {
        let query = self.search_input.trim().to_string();
        if query.is_empty() {
            return;
        }

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            match api.search_foods(&query).await {
                Ok(results) => {
                    Self::send_result(&tx, RefreshResult::SearchResults(results)).await;
                }
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Search: {}", e))).await;
                }
            }
        });

        self.status_message = Some("Searching...".to_string());
    }

    /// Log the currently selected search result as one serving for today
    pub fn log_selected_search_result(&mut self) {
        let Some(result) = self.search_results.get(self.search_selection) else {
            return;
        };

        let entry = NewEntry {
            food: result.name.clone(),
            amount_g: result.serving_weight_grams,
            date: Local::now().date_naive(),
        };
        self.state = AppState::Normal;
        self.search_input.clear();
        self.search_results.clear();
        self.search_selection = 0;
        self.search_focus = SearchFocus::Query;

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            match api.create_entry(&entry).await {
                Ok(created) => {
                    Self::send_result(&tx, RefreshResult::EntryCreated(created)).await;
                    if let Ok(entries) = api.today_entries().await {
                        Self::send_result(&tx, RefreshResult::TodayEntries(entries)).await;
                    }
                    if let Ok(summary) = api.day_summary(None).await {
                        Self::send_result(&tx, RefreshResult::TodaySummary(summary)).await;
                    }
                }
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Add entry: {}", e))).await;
                }
            }
        });

        self.status_message = Some("Adding entry...".to_string());
    }

    /// Delete the entry selected on the Today or History tab
    pub fn delete_selected_entry(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let id = entry.id;
        let refetch_history = self.current_tab == Tab::History;
        let history_date = self.history_date;
        self.state = AppState::Normal;

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            match api.delete_entry(id).await {
                Ok(()) => {
                    Self::send_result(&tx, RefreshResult::EntryDeleted(id)).await;
                    if let Ok(entries) = api.today_entries().await {
                        Self::send_result(&tx, RefreshResult::TodayEntries(entries)).await;
                    }
                    if let Ok(summary) = api.day_summary(None).await {
                        Self::send_result(&tx, RefreshResult::TodaySummary(summary)).await;
                    }
                    if refetch_history {
                        if let Ok(entries) = api.entries_for(history_date).await {
                            Self::send_result(
                                &tx,
                                RefreshResult::HistoryEntries(history_date, entries),
                            )
                            .await;
                        }
                    }
                }
                Err(e) => {
                    Self::send_result(&tx, RefreshResult::Error(format!("Delete: {}", e))).await;
                }
            }
        });

        self.status_message = Some("Deleting entry...".to_string());
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let results: Vec<RefreshResult> = {
            if let Some(ref mut rx) = self.refresh_rx {
                let mut results = Vec::new();
                while let Ok(result) = rx.try_recv() {
                    results.push(result);
                }
                results
            } else {
                Vec::new()
            }
        };

        for result in results {
            self.process_refresh_result(result);
        }
    }

    /// Process a single result from a background fetch task
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::TodayEntries(entries) => {
                // Local totals as a fallback until the summary response lands
                self.today_summary =
                    DaySummary::from_entries(Local::now().date_naive(), &entries);
                self.today_entries = entries;
                self.today_selection = self
                    .today_selection
                    .min(self.today_entries.len().saturating_sub(1));
            }
            RefreshResult::TodaySummary(summary) => {
                self.today_summary = summary;
            }
            RefreshResult::HistoryEntries(date, entries) => {
                // Ignore responses for a date the user has already navigated away from
                if date == self.history_date {
                    self.history_entries = entries;
                    self.history_selection = self
                        .history_selection
                        .min(self.history_entries.len().saturating_sub(1));
                }
            }
            RefreshResult::DailySummaries(rows) => {
                self.daily_summaries = rows;
                self.summaries_selection = self
                    .summaries_selection
                    .min(self.daily_summaries.len().saturating_sub(1));
            }
            RefreshResult::FoodLogged(foods) => {
                let names: Vec<&str> = foods.iter().map(|f| f.name.as_str()).collect();
                self.status_message = if names.is_empty() {
                    Some("No foods recognized".to_string())
                } else {
                    Some(format!("Logged: {}", names.join(", ")))
                };
            }
            RefreshResult::EntryCreated(entry) => {
                self.status_message = Some(format!(
                    "Added {} ({:.0} kcal)",
                    entry.name, entry.calories
                ));
            }
            RefreshResult::EntryDeleted(_) => {
                self.status_message = Some("Entry deleted".to_string());
            }
            RefreshResult::SearchResults(results) => {
                self.search_selection = 0;
                if results.is_empty() {
                    self.status_message = Some("No foods found".to_string());
                } else {
                    self.status_message = None;
                    if self.state == AppState::SearchingFood {
                        self.search_focus = SearchFocus::Results;
                    }
                }
                self.search_results = results;
            }
            RefreshResult::RefreshComplete => {
                // Only clear progress messages, preserve errors
                if let Some(ref msg) = self.status_message {
                    if !msg.starts_with("Error:") {
                        self.status_message = None;
                    }
                }
            }
            RefreshResult::Error(msg) => {
                error!(error = %msg, "Background task error");
                let user_message = if msg.to_lowercase().contains("unauthorized")
                    || msg.to_lowercase().contains("401")
                {
                    "Session expired. Please log in again.".to_string()
                } else if msg.to_lowercase().contains("network")
                    || msg.to_lowercase().contains("connect")
                {
                    "Network error. Check your connection.".to_string()
                } else {
                    format!("Error: {}", msg)
                };
                self.status_message = Some(user_message);
            }
        }
    }

    // =========================================================================
    // Navigation Helpers
    // =========================================================================

    /// Move the History tab one day back and refetch
    pub fn history_prev_day(&mut self) {
        if let Some(date) = self.history_date.pred_opt() {
            self.set_history_date(date);
        }
    }

    /// Move the History tab one day forward (never past today) and refetch
    pub fn history_next_day(&mut self) {
        let today = Local::now().date_naive();
        if let Some(date) = self.history_date.succ_opt() {
            if date <= today {
                self.set_history_date(date);
            }
        }
    }

    /// Jump the History tab to today
    pub fn history_jump_today(&mut self) {
        self.set_history_date(Local::now().date_naive());
    }

    /// Jump the History tab to an arbitrary date (used by the Summaries tab)
    pub fn set_history_date(&mut self, date: NaiveDate) {
        self.history_date = date;
        self.history_entries.clear();
        self.history_selection = 0;
        self.refresh_history();
    }

    /// The entry currently selected on the Today or History tab
    pub fn selected_entry(&self) -> Option<&FoodEntry> {
        match self.current_tab {
            Tab::Today => self.today_entries.get(self.today_selection),
            Tab::History => self.history_entries.get(self.history_selection),
            _ => None,
        }
    }

    /// Move the current tab's selection by a signed offset, clamped
    pub fn move_selection(&mut self, delta: isize) {
        let (selection, len) = match self.current_tab {
            Tab::Today => (&mut self.today_selection, self.today_entries.len()),
            Tab::History => (&mut self.history_selection, self.history_entries.len()),
            Tab::Summaries => (&mut self.summaries_selection, self.daily_summaries.len()),
            Tab::Dashboard => return,
        };
        if len == 0 {
            *selection = 0;
            return;
        }
        let new = selection.saturating_add_signed(delta).min(len - 1);
        *selection = new;
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Check if a food-description or search character should be accepted
pub fn can_add_query_char(current_len: usize, c: char) -> bool {
    current_len < MAX_QUERY_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn test_app() -> App {
        let store = Arc::new(MemoryTokenStore::new());
        let api = ApiClient::new("http://localhost:8000", store, || {}).unwrap();
        App::new(Config::default(), api, Arc::new(AtomicBool::new(false)))
    }

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Today.next(), Tab::History);
        assert_eq!(Tab::History.next(), Tab::Summaries);
        assert_eq!(Tab::Summaries.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.next(), Tab::Today); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        assert_eq!(Tab::Today.prev(), Tab::Dashboard); // Wraps around
        assert_eq!(Tab::Dashboard.prev(), Tab::Summaries);
        assert_eq!(Tab::Summaries.prev(), Tab::History);
        assert_eq!(Tab::History.prev(), Tab::Today);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        // Exceeds max length
        assert!(!can_add_username_char(50, 'a'));
        // Control characters rejected
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_query_char() {
        assert!(can_add_query_char(0, '2'));
        assert!(can_add_query_char(119, 'x'));
        assert!(!can_add_query_char(120, 'x'));
        assert!(!can_add_query_char(0, '\t'));
    }

    // -------------------------------------------------------------------------
    // Navigation Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_history_never_advances_past_today() {
        let mut app = test_app();
        app.history_jump_today();
        let today = app.history_date;
        app.history_next_day();
        assert_eq!(app.history_date, today);
    }

    #[tokio::test]
    async fn test_history_day_navigation() {
        let mut app = test_app();
        app.history_jump_today();
        let today = app.history_date;
        app.history_prev_day();
        assert_eq!(app.history_date, today.pred_opt().unwrap());
        app.history_next_day();
        assert_eq!(app.history_date, today);
    }

    #[tokio::test]
    async fn test_move_selection_clamps() {
        let mut app = test_app();
        app.current_tab = Tab::Today;
        // Empty list pins the selection at zero
        app.move_selection(5);
        assert_eq!(app.today_selection, 0);

        app.today_entries = serde_json::from_str(
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

        app.move_selection(10);
        assert_eq!(app.today_selection, 1);
        app.move_selection(-10);
        assert_eq!(app.today_selection, 0);
    }

    #[tokio::test]
    async fn test_selected_entry_follows_tab() {
        let mut app = test_app();
        app.current_tab = Tab::Dashboard;
        assert!(app.selected_entry().is_none());
        app.current_tab = Tab::Today;
        assert!(app.selected_entry().is_none());
    }
}
