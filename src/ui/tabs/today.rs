use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::models::FoodEntry;
use crate::ui::styles;
use crate::utils::truncate;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let title = format!(" Today ({} entries) ", app.today_entries.len());
    render_entry_table(
        frame,
        &app.today_entries,
        app.today_selection,
        &title,
        chunks[0],
    );
    render_totals(frame, app, chunks[1]);
}

/// Entry table shared with the History tab.
pub fn render_entry_table(
    frame: &mut Frame,
    entries: &[FoodEntry],
    selection: usize,
    title: &str,
    area: Rect,
) {
    let header_cells = [
        Cell::from("Time"),
        Cell::from("Food"),
        Cell::from("Grams"),
        Cell::from("kcal"),
        Cell::from("Protein"),
        Cell::from("Carbs"),
        Cell::from("Fat"),
    ];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i == selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(entry.time_display()),
                Cell::from(truncate(&entry.name, 32)),
                Cell::from(format!("{:.0}", entry.weight_g)),
                Cell::from(format!("{:.0}", entry.calories)),
                Cell::from(format!("{:.1}g", entry.protein_g)),
                Cell::from(format!("{:.1}g", entry.carbs_g)),
                Cell::from(format!("{:.1}g", entry.fat_g)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(6),  // Time "08:15"
        Constraint::Fill(1),    // Food name
        Constraint::Length(7),  // Grams
        Constraint::Length(7),  // kcal
        Constraint::Length(8),  // Protein
        Constraint::Length(8),  // Carbs
        Constraint::Length(8),  // Fat
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title.to_string())
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    let mut state = TableState::default();
    if !entries.is_empty() {
        state.select(Some(selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_totals(frame: &mut Frame, app: &App, area: Rect) {
    let summary = &app.today_summary;

    let line = if app.today_entries.is_empty() {
        Line::from(Span::styled(
            " Nothing logged yet - [a]dd food or [/] search the database",
            styles::muted_style(),
        ))
    } else {
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
