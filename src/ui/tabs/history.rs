use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::DaySummary;
use crate::ui::styles;
use crate::ui::tabs::today::render_entry_table;
use crate::utils::date_label;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let title = format!(
        " {} ({} entries) - [h]/[l] change day, [t]oday ",
        date_label(app.history_date),
        app.history_entries.len()
    );
    render_entry_table(
        frame,
        &app.history_entries,
        app.history_selection,
        &title,
        chunks[0],
    );
    render_day_totals(frame, app, chunks[1]);
}

fn render_day_totals(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.history_entries.is_empty() {
        Line::from(Span::styled(
            " No entries for this day",
            styles::muted_style(),
        ))
    } else {
        // Historical days have no live summary endpoint call; totals come
        // from the entries themselves
        let summary = DaySummary::from_entries(app.history_date, &app.history_entries);
        Line::from(vec![
            Span::styled(" Totals: ", styles::highlight_style()),
            Span::styled(
                format!("{:.0} kcal", summary.total_calories),
                styles::list_item_style(),
            ),
            Span::styled("   Protein ", styles::protein_style()),
            Span::raw(format!("{:.1}g", summary.total_protein_g)),
            Span::styled("   Carbs ", styles::carbs_style()),
            Span::raw(format!("{:.1}g", summary.total_carbs_g)),
            Span::styled("   Fat ", styles::fat_style()),
            Span::raw(format!("{:.1}g", summary.total_fat_g)),
        ])
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(line).block(block), area);
}
