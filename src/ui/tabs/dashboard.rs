use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

/// Dashboard: today's totals plus the macro-calorie breakdown chart.
/// Each macro's share of the calorie total renders as a proportional bar
/// (4 kcal/g for protein and carbs, 9 kcal/g for fat).
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Totals
            Constraint::Length(3), // Protein bar
            Constraint::Length(3), // Carbs bar
            Constraint::Length(3), // Fat bar
            Constraint::Min(0),
        ])
        .split(area);

    render_totals(frame, app, chunks[0]);

    let summary = &app.today_summary;
    let split = summary.macro_split();

    render_macro_bar(
        frame,
        chunks[1],
        "Protein",
        styles::protein_style(),
        split.protein_pct(),
        split.protein_kcal,
        summary.total_protein_g,
    );
    render_macro_bar(
        frame,
        chunks[2],
        "Carbs",
        styles::carbs_style(),
        split.carbs_pct(),
        split.carbs_kcal,
        summary.total_carbs_g,
    );
    render_macro_bar(
        frame,
        chunks[3],
        "Fat",
        styles::fat_style(),
        split.fat_pct(),
        split.fat_kcal,
        summary.total_fat_g,
    );
}

fn render_totals(frame: &mut Frame, app: &App, area: Rect) {
    let summary = &app.today_summary;

    let lines = vec![
        Line::from(vec![
            Span::styled(" Calories today: ", styles::highlight_style()),
            Span::styled(
                format!("{:.0} kcal", summary.total_calories),
                styles::title_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Entries: ", styles::muted_style()),
            Span::raw(format!("{}", app.today_entries.len())),
        ]),
        Line::from(Span::styled(
            " Calorie share by macro (protein/carbs 4 kcal/g, fat 9 kcal/g):",
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .title(" Dashboard ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_macro_bar(
    frame: &mut Frame,
    area: Rect,
    name: &str,
    style: Style,
    pct: u16,
    kcal: f64,
    grams: f64,
) {
    let label = format!("{}% ({:.0} kcal, {:.1}g)", pct, kcal, grams);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(format!(" {} ", name))
                .title_style(style)
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .gauge_style(style)
        .percent(pct.min(100))
        .label(label);

    frame.render_widget(gauge, area);
}
