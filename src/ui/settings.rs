use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::{ui::Theme, App, SettingsField};

pub fn render_settings(app: &App, area: Rect, buf: &mut Buffer) {
    let form = &app.settings_form;
    // preview the scheme being edited
    let theme = Theme::new(form.draft.dark_mode);
    Block::default().style(theme.base()).render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Fields
            Constraint::Length(1), // Validation error
            Constraint::Length(3), // Instructions
        ])
        .split(area);

    Paragraph::new(Span::styled("Settings", theme.bold().fg(theme.accent)))
        .block(Block::default().borders(Borders::ALL).style(theme.base()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let rows: Vec<Row> = SettingsField::ALL
        .iter()
        .map(|&field| {
            let selected = field == form.field;
            let marker = if selected { "›" } else { " " };
            let value = if selected {
                format!("◀ {} ▶", form.value_text(field))
            } else {
                form.value_text(field)
            };
            let style = if selected {
                theme.bold().fg(theme.accent)
            } else {
                theme.base()
            };
            Row::new(vec![
                Cell::from(marker),
                Cell::from(field.label()),
                Cell::from(value),
            ])
            .style(style)
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(20),
            Constraint::Min(10),
        ],
    )
    .block(Block::default().borders(Borders::ALL).style(theme.base()))
    .render(chunks[1], buf);

    if let Some(error) = &form.error {
        Paragraph::new(Span::styled(error.as_str(), theme.bold().fg(theme.bad)))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    Paragraph::new(Line::from(Span::styled(
        "↑/↓ field   ←/→ change   (enter) save   (esc) cancel",
        theme.dim().add_modifier(Modifier::ITALIC),
    )))
    .block(Block::default().borders(Borders::ALL).style(theme.base()))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);
}
