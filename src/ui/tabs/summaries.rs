use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::date_label;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header_cells = [
        Cell::from("Date"),
        Cell::from("kcal"),
        Cell::from("Protein"),
        Cell::from("Carbs"),
        Cell::from("Fat"),
        Cell::from("Split (P/C/F)"),
    ];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .daily_summaries
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let style = if i == app.summaries_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let split = day.macro_split();
            Row::new(vec![
                Cell::from(date_label(day.date)),
                Cell::from(format!("{:.0}", day.total_calories)),
                Cell::from(format!("{:.1}g", day.total_protein)),
                Cell::from(format!("{:.1}g", day.total_carbs)),
                Cell::from(format!("{:.1}g", day.total_fat)),
                Cell::from(format!(
                    "{}% / {}% / {}%",
                    split.protein_pct(),
                    split.carbs_pct(),
                    split.fat_pct()
                )),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(18), // Date: "Wed Mar 14, 2024"
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let title = format!(
        " Daily Summaries ({} days) - [Enter] view in History ",
        app.daily_summaries.len()
    );

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    let mut state = TableState::default();
    if !app.daily_summaries.is_empty() {
        state.select(Some(app.summaries_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
