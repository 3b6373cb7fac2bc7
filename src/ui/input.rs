//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{
    can_add_password_char, can_add_query_char, can_add_username_char, App, AppState, LoginFocus,
    RegisterFocus, SearchFocus, Tab, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::Registering => return handle_register_input(app, key).await,
        AppState::EnteringFood => {
            handle_food_input(app, key);
            return Ok(false);
        }
        AppState::SearchingFood => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.delete_selected_entry();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('1') => switch_tab(app, Tab::Today),
        KeyCode::Char('2') => switch_tab(app, Tab::History),
        KeyCode::Char('3') => switch_tab(app, Tab::Summaries),
        KeyCode::Char('4') => switch_tab(app, Tab::Dashboard),
        KeyCode::Left => switch_tab(app, app.current_tab.prev()),
        KeyCode::Right => switch_tab(app, app.current_tab.next()),

        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),

        KeyCode::Char('u') => {
            app.refresh_all_background();
            if app.current_tab == Tab::History {
                app.refresh_history();
            }
        }
        KeyCode::Char('a') => {
            app.food_input.clear();
            app.state = AppState::EnteringFood;
        }
        KeyCode::Char('/') | KeyCode::Char('s') => {
            app.search_input.clear();
            app.search_results.clear();
            app.search_selection = 0;
            app.search_focus = SearchFocus::Query;
            app.state = AppState::SearchingFood;
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if app.selected_entry().is_some() {
                app.state = AppState::ConfirmingDelete;
            }
        }
        KeyCode::Char('L') => {
            app.logout();
        }

        // History tab date navigation
        KeyCode::Char('h') | KeyCode::Char('[') if app.current_tab == Tab::History => {
            app.history_prev_day();
        }
        KeyCode::Char('l') | KeyCode::Char(']') if app.current_tab == Tab::History => {
            app.history_next_day();
        }
        KeyCode::Char('t') if app.current_tab == Tab::History => {
            app.history_jump_today();
        }

        // Summaries tab: drill into the selected day
        KeyCode::Enter if app.current_tab == Tab::Summaries => {
            if let Some(day) = app.daily_summaries.get(app.summaries_selection) {
                let date = day.date;
                app.set_history_date(date);
                app.current_tab = Tab::History;
            }
        }
        _ => {}
    }

    Ok(false)
}

/// Switch tab, lazily fetching the History tab's entries on first visit
fn switch_tab(app: &mut App, tab: Tab) {
    let entering_history = tab == Tab::History && app.current_tab != Tab::History;
    app.current_tab = tab;
    if entering_history && app.history_entries.is_empty() {
        app.refresh_history();
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Ctrl+R switches to the registration form
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.start_register();
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password => {
                app.login_focus = LoginFocus::Button;
            }
            LoginFocus::Button => {
                // On success the state flips to Normal; on failure
                // login_error is set for the overlay
                let _ = app.attempt_login().await;
                if app.state == AppState::Normal {
                    app.refresh_all_background();
                }
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.len(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }

    Ok(false)
}

async fn handle_register_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.start_login();
        }
        KeyCode::Down | KeyCode::Tab => {
            app.register_focus = match app.register_focus {
                RegisterFocus::Username => RegisterFocus::Password,
                RegisterFocus::Password => RegisterFocus::Confirm,
                RegisterFocus::Confirm => RegisterFocus::Button,
                RegisterFocus::Button => RegisterFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.register_focus = match app.register_focus {
                RegisterFocus::Username => RegisterFocus::Button,
                RegisterFocus::Password => RegisterFocus::Username,
                RegisterFocus::Confirm => RegisterFocus::Password,
                RegisterFocus::Button => RegisterFocus::Confirm,
            };
        }
        KeyCode::Enter => match app.register_focus {
            RegisterFocus::Username => app.register_focus = RegisterFocus::Password,
            RegisterFocus::Password => app.register_focus = RegisterFocus::Confirm,
            RegisterFocus::Confirm => app.register_focus = RegisterFocus::Button,
            RegisterFocus::Button => {
                let _ = app.attempt_register().await;
                if app.state == AppState::Normal {
                    app.refresh_all_background();
                }
            }
        },
        KeyCode::Backspace => match app.register_focus {
            RegisterFocus::Username => {
                app.register_username.pop();
            }
            RegisterFocus::Password => {
                app.register_password.pop();
            }
            RegisterFocus::Confirm => {
                app.register_confirm.pop();
            }
            RegisterFocus::Button => {}
        },
        KeyCode::Char(c) => match app.register_focus {
            RegisterFocus::Username => {
                if can_add_username_char(app.register_username.len(), c) {
                    app.register_username.push(c);
                }
            }
            RegisterFocus::Password => {
                if can_add_password_char(app.register_password.len(), c) {
                    app.register_password.push(c);
                }
            }
            RegisterFocus::Confirm => {
                if can_add_password_char(app.register_confirm.len(), c) {
                    app.register_confirm.push(c);
                }
            }
            RegisterFocus::Button => {}
        },
        _ => {}
    }

    Ok(false)
}

fn handle_food_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.food_input.clear();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.submit_food_log();
        }
        KeyCode::Backspace => {
            app.food_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_query_char(app.food_input.len(), c) {
                app.food_input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match app.search_focus {
        SearchFocus::Query => match key.code {
            KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            KeyCode::Enter => {
                app.run_search();
            }
            KeyCode::Tab | KeyCode::Down if !app.search_results.is_empty() => {
                app.search_focus = SearchFocus::Results;
            }
            KeyCode::Backspace => {
                app.search_input.pop();
            }
            KeyCode::Char(c) => {
                if can_add_query_char(app.search_input.len(), c) {
                    app.search_input.push(c);
                }
            }
            _ => {}
        },
        SearchFocus::Results => match key.code {
            KeyCode::Esc | KeyCode::Tab => {
                app.search_focus = SearchFocus::Query;
            }
            KeyCode::Up => {
                app.search_selection = app.search_selection.saturating_sub(1);
            }
            KeyCode::Down => {
                app.search_selection = (app.search_selection + 1)
                    .min(app.search_results.len().saturating_sub(1));
            }
            KeyCode::Enter => {
                app.log_selected_search_result();
            }
            _ => {}
        },
    }
}
