use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, RegisterFocus, SearchFocus, Tab};
use crate::utils::truncate;

use super::styles;
use super::tabs::{dashboard, history, summaries, today};

// ASCII banner shared by the login/register/quit overlays
const BANNER: [&str; 3] = [
    "     ╔╦╗╔═╗╔═╗╦═╗╔═╗╦  ╔═╗╔═╗",
    "     ║║║╠═╣║  ╠╦╝║ ║║  ║ ║║ ╦",
    "     ╩ ╩╩ ╩╚═╝╩╚═╚═╝╩═╝╚═╝╚═╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::Registering => render_register_overlay(frame, app),
        AppState::EnteringFood => render_food_input_overlay(frame, app),
        AppState::SearchingFood => render_search_overlay(frame, app),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, _app: &App, area: Rect) {
    let title = "  macrolog";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = vec![
        ("[1] Today", app.current_tab == Tab::Today),
        ("[2] History", app.current_tab == Tab::History),
        ("[3] Summaries", app.current_tab == Tab::Summaries),
        ("[4] Dashboard", app.current_tab == Tab::Dashboard),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Today => today::render(frame, app, area),
        Tab::History => history::render(frame, app, area),
        Tab::Summaries => summaries::render(frame, app, area),
        Tab::Dashboard => dashboard::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.current_tab {
        Tab::Today => "[a]dd | [/]search | [d]elete | [u]pdate | [q]uit",
        Tab::History => "[h/l] day | [t]oday | [d]elete | [u]pdate | [q]uit",
        _ => "[a]dd | [/]search | [u]pdate | [q]uit",
    };

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if let Some(ref username) = app.config.last_username {
        format!(" {} ", username)
    } else {
        String::from(" ")
    };
    let right_text = format!(" {} ", shortcuts);

    let padding = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Overlays
// ============================================================================

fn banner_lines() -> Vec<Line<'static>> {
    BANNER
        .iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect()
}

/// Render a text input field in the `Label: [value▌]` form used by all
/// overlay forms.
fn input_field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(format!("{} [", label), styles::muted_style()),
        Span::styled(format!("{:<20}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = banner_lines();
    help_text.extend(vec![
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-4       ", styles::help_key_style()),
            Span::styled("Switch tabs", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ←/→       ", styles::help_key_style()),
            Span::styled("Prev/next tab", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓       ", styles::help_key_style()),
            Span::styled("Navigate list", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  a         ", styles::help_key_style()),
            Span::styled("Log food (\"2 eggs and toast\")", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  /         ", styles::help_key_style()),
            Span::styled("Search the food database", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  d         ", styles::help_key_style()),
            Span::styled("Delete selected entry", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  u         ", styles::help_key_style()),
            Span::styled("Update data from the server", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  L         ", styles::help_key_style()),
            Span::styled("Log out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" History Tab", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  h/l [/]   ", styles::help_key_style()),
            Span::styled("Day back/forward", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  t         ", styles::help_key_style()),
            Span::styled("Jump to today", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = banner_lines();
    lines.push(Line::from(""));

    lines.push(input_field_line(
        "Username:",
        app.login_username.clone(),
        app.login_focus == LoginFocus::Username,
    ));
    lines.push(input_field_line(
        "Password:",
        "*".repeat(app.login_password.len().min(20)),
        app.login_focus == LoginFocus::Password,
    ));
    lines.push(Line::from(""));
    lines.push(button_line("Login", app.login_focus == LoginFocus::Button));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Ctrl+R", styles::help_key_style()),
        Span::styled(" create account   ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" quit", styles::muted_style()),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_register_overlay(frame: &mut Frame, app: &App) {
    let height = if app.register_error.is_some() { 16 } else { 14 };
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = banner_lines();
    lines.push(Line::from(Span::styled(
        "           Create an account",
        styles::muted_style(),
    )));
    lines.push(Line::from(""));

    lines.push(input_field_line(
        "Username:",
        app.register_username.clone(),
        app.register_focus == RegisterFocus::Username,
    ));
    lines.push(input_field_line(
        "Password:",
        "*".repeat(app.register_password.len().min(20)),
        app.register_focus == RegisterFocus::Password,
    ));
    lines.push(input_field_line(
        "Confirm: ",
        "*".repeat(app.register_confirm.len().min(20)),
        app.register_focus == RegisterFocus::Confirm,
    ));
    lines.push(Line::from(""));
    lines.push(button_line(
        "Register",
        app.register_focus == RegisterFocus::Button,
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Esc", styles::help_key_style()),
        Span::styled(" back to login", styles::muted_style()),
    ]));

    if let Some(ref error) = app.register_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_food_input_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(60, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            " Describe what you ate:",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" > ", styles::muted_style()),
            Span::styled(
                format!("{}▌", app.food_input),
                styles::list_item_style(),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " e.g. \"2 eggs and a slice of toast\"",
            styles::muted_style(),
        )),
        Line::from(vec![
            Span::styled(" Enter", styles::help_key_style()),
            Span::styled(" log   ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Log Food ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_search_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(64, 18, frame.area());
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    // Query line
    let query_focused = app.search_focus == SearchFocus::Query;
    let cursor = if query_focused { "▌" } else { "" };
    let query_line = Line::from(vec![
        Span::styled(" Search: ", styles::muted_style()),
        Span::styled(
            format!("{}{}", app.search_input, cursor),
            if query_focused {
                styles::selected_style()
            } else {
                styles::list_item_style()
            },
        ),
    ]);
    let query_block = Block::default()
        .title(" Food Database ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(query_focused))
        .style(Style::default());
    frame.render_widget(Clear, chunks[0]);
    frame.render_widget(Paragraph::new(query_line).block(query_block), chunks[0]);

    // Results list
    let results_focused = app.search_focus == SearchFocus::Results;
    let items: Vec<ListItem> = app
        .search_results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let style = if i == app.search_selection && results_focused {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(vec![
                Line::from(Span::styled(truncate(&result.name, 58), style)),
                Line::from(Span::styled(
                    format!("   {}", result.macros_label()),
                    styles::muted_style(),
                )),
            ])
        })
        .collect();

    let hint = if app.search_results.is_empty() {
        " Enter to search "
    } else {
        " Enter logs one serving for today "
    };
    let results_block = Block::default()
        .title(hint)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(results_focused))
        .style(Style::default());

    let list = List::new(items).block(results_block);
    let mut state = ListState::default();
    if results_focused && !app.search_results.is_empty() {
        state.select(Some(app.search_selection));
    }
    frame.render_widget(Clear, chunks[1]);
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(50, 8, frame.area());
    frame.render_widget(Clear, area);

    let name = app
        .selected_entry()
        .map(|e| truncate(&e.name, 36))
        .unwrap_or_else(|| "this entry".to_string());

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   Delete \"{}\"?", name),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm Delete ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::error_style())
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = banner_lines();
    lines.extend(vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
