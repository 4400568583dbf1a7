pub mod glyph;
pub mod screen;
pub mod settings;

use eyetest::{controller::RoundOutcome, diagnosis::Diagnosis, ROUNDS_PER_SESSION};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::App;
use glyph::GlyphCanvas;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

/// Screen colors for the light and dark schemes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub good: Color,
    pub bad: Color,
    pub warn: Color,
}

impl Theme {
    pub fn new(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                bg: Color::Black,
                fg: Color::White,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                good: Color::Green,
                bad: Color::Red,
                warn: Color::Yellow,
            }
        } else {
            Self {
                bg: Color::White,
                fg: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
                good: Color::Green,
                bad: Color::Red,
                warn: Color::Rgb(200, 120, 0),
            }
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    fn bold(&self) -> Style {
        self.base().add_modifier(Modifier::BOLD)
    }

    fn dim(&self) -> Style {
        self.base().fg(self.dim)
    }

    fn diagnosis(&self, diagnosis: Diagnosis) -> Style {
        let color = match diagnosis {
            Diagnosis::Poor => self.bad,
            Diagnosis::Average => self.warn,
            Diagnosis::Good => self.accent,
            Diagnosis::Excellent => self.good,
        };
        self.bold().fg(color)
    }
}

pub fn draw(app: &mut App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn paint_background(theme: &Theme, area: Rect, buf: &mut Buffer) {
    Block::default().style(theme.base()).render(area, buf);
}

/// Regions of the test screen; also used to hit-test mouse clicks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestLayout {
    pub header: Rect,
    pub timer: Rect,
    pub stimuli: Rect,
    pub cursor: Rect,
    pub footer: Rect,
}

pub fn test_layout(area: Rect) -> TestLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // round + instruction
            Constraint::Length(1), // countdown
            Constraint::Min(1),    // letters
            Constraint::Length(1), // cursor / numbers
            Constraint::Length(2), // feedback + keys
        ])
        .split(area);

    TestLayout {
        header: chunks[0],
        timer: chunks[1],
        stimuli: chunks[2],
        cursor: chunks[3],
        footer: chunks[4],
    }
}

/// Equal-width slot for the letter at `index`, centered as a group within `stimuli`.
pub fn slot_rect(stimuli: Rect, n: usize, index: usize) -> Rect {
    if n == 0 || index >= n {
        return Rect::default();
    }
    let n = n as u16;
    let width = stimuli.width / n;
    if width == 0 {
        return Rect::default();
    }
    let pad = (stimuli.width - width * n) / 2;
    Rect::new(
        stimuli.x + pad + width * index as u16,
        stimuli.y,
        width,
        stimuli.height,
    )
}

pub fn slot_at(stimuli: Rect, n: usize, column: u16, row: u16) -> Option<usize> {
    (0..n).find(|&i| {
        let slot = slot_rect(stimuli, n, i);
        slot.width > 0
            && column >= slot.x
            && column < slot.right()
            && row >= slot.y
            && row < slot.bottom()
    })
}

pub fn render_welcome(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = Theme::new(app.settings.dark_mode);
    paint_background(&theme, area, buf);

    let settings = &app.settings;
    let summary = format!(
        "{} letters · {}s per round · {} · {} mode",
        settings.num_letters,
        settings.time_limit_secs,
        settings.difficulty,
        if settings.dark_mode { "dark" } else { "light" }
    );
    let rules = [
        format!("{ROUNDS_PER_SESSION} rounds. Odd rounds: pick the LARGEST letter."),
        "Even rounds: pick the SMALLEST letter.".to_string(),
        "Answer before the countdown runs out.".to_string(),
    ];
    let keys = "(enter) start   (c)onfigure   (esc) quit";

    let content_width = rules
        .iter()
        .map(|l| l.width())
        .chain([summary.width(), keys.width()])
        .max()
        .unwrap_or(0) as u16
        + 4;

    let mut lines = vec![
        Line::from(Span::styled("Eye Test", theme.bold().fg(theme.accent))),
        Line::from(""),
    ];
    lines.extend(rules.iter().map(|r| Line::from(Span::styled(r.clone(), theme.base()))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(summary, theme.dim())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        keys,
        theme.base().add_modifier(Modifier::ITALIC),
    )));

    let height = lines.len() as u16 + 2;
    let width = content_width.min(area.width);
    let boxed = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height.min(area.height),
    );

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).style(theme.base()))
        .alignment(Alignment::Center)
        .render(boxed, buf);
}

pub fn render_test(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = Theme::new(app.settings.dark_mode);
    paint_background(&theme, area, buf);

    let Some(round) = app.controller.round() else {
        return;
    };
    let layout = test_layout(area);

    let target = if round.target_is_largest {
        "LARGEST"
    } else {
        "SMALLEST"
    };
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Round {}/{}", round.round_index, ROUNDS_PER_SESSION),
            theme.dim(),
        )),
        Line::from(vec![
            Span::styled("Select the ", theme.base()),
            Span::styled(target, theme.bold().fg(theme.accent)),
            Span::styled(" letter", theme.base()),
        ]),
    ])
    .alignment(Alignment::Center);
    header.render(layout.header, buf);

    let limit = app.settings.time_limit_secs.max(1) as f64;
    let ratio = (app.controller.remaining_display_secs() / limit).clamp(0.0, 1.0);
    let gauge_color = if round.remaining_secs <= 3 {
        theme.bad
    } else {
        theme.accent
    };
    Gauge::default()
        .gauge_style(Style::default().fg(gauge_color).bg(theme.bg))
        .ratio(ratio)
        .label(Span::styled(
            format!("Time left: {} seconds", round.remaining_secs),
            theme.bold(),
        ))
        .render(layout.timer, buf);

    let n = round.stimuli.len();
    let max_size = app.controller.palette().largest().unwrap_or(1);
    for (i, stimulus) in round.stimuli.iter().enumerate() {
        let slot = slot_rect(layout.stimuli, n, i);
        GlyphCanvas::new(stimulus, max_size, theme.bg).render(slot, buf);

        let label = if i == app.cursor {
            format!("▲{}", i + 1)
        } else {
            (i + 1).to_string()
        };
        let style = if i == app.cursor {
            theme.bold().fg(theme.accent)
        } else {
            theme.dim()
        };
        let label_area = Rect::new(slot.x, layout.cursor.y, slot.width, layout.cursor.height);
        Paragraph::new(Span::styled(label, style))
            .alignment(Alignment::Center)
            .render(label_area, buf);
    }

    let feedback = match app.last_outcome {
        Some(RoundOutcome::Correct) => Span::styled("✓ correct", theme.bold().fg(theme.good)),
        Some(RoundOutcome::Incorrect) => Span::styled("✗ wrong", theme.bold().fg(theme.bad)),
        Some(RoundOutcome::TimedOut) => Span::styled("⏱ time's up", theme.bold().fg(theme.warn)),
        None => Span::raw(""),
    };
    Paragraph::new(vec![
        Line::from(feedback),
        Line::from(Span::styled(
            "←/→ move   (enter) select   (1-9) pick   click a letter   (esc) abandon",
            theme.dim().add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center)
    .render(layout.footer, buf);
}

pub fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let theme = Theme::new(app.settings.dark_mode);
    paint_background(&theme, area, buf);

    let Some(result) = app.controller.session_result() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Your score: {:.1}%", result.percentage),
            theme.bold(),
        )),
        Line::from(Span::styled(
            format!("{}/{} correct", result.score, result.rounds),
            theme.base(),
        )),
        Line::from(Span::styled(
            format!("Total time: {}", result.humanized_time()),
            theme.base(),
        )),
    ];
    if let Some(best) = app.previous_best {
        lines.push(Line::from(Span::styled(
            format!("Previous best: {best:.1}%"),
            theme.dim(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        result.diagnosis.headline(),
        theme.diagnosis(result.diagnosis),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(result.diagnosis.advice(), theme.base())));
    if let Some(notice) = &app.share_notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(notice.as_str(), theme.bold())));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Results")
                .style(theme.base()),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        "(t)weet   (r)etake   (n)ew session   (esc)ape",
        theme.dim().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);
}
