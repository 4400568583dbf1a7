//! Letters drawn at a true relative size.
//!
//! Terminal text has a single size, so each stimulus is painted from a 5x7
//! bitmap onto a braille canvas. All slots share one scale, derived from the
//! largest palette size, so the on-screen sizes keep their ratios.

use eyetest::stimulus::Stimulus;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Points},
        Widget,
    },
};

pub const GLYPH_COLS: usize = 5;
pub const GLYPH_ROWS: usize = 7;

/// Top row first; bit 4 is the leftmost column.
const FONT: [[u8; GLYPH_ROWS]; 26] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // B
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // C
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110], // D
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // F
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // G
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // M
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // W
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // X
    [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // Z
];

pub fn bitmap(symbol: char) -> Option<&'static [u8; GLYPH_ROWS]> {
    let upper = symbol.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        FONT.get((upper as u8 - b'A') as usize)
    } else {
        None
    }
}

/// Lit cells as (column, row) with row 0 at the top.
pub fn lit_cells(symbol: char) -> Vec<(usize, usize)> {
    let Some(rows) = bitmap(symbol) else {
        return Vec::new();
    };
    let mut cells = Vec::new();
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_COLS {
            if bits & (1 << (GLYPH_COLS - 1 - col)) != 0 {
                cells.push((col, row));
            }
        }
    }
    cells
}

/// Canvas points filling `symbol` at height `size`, horizontally centered on
/// `origin.0` and standing on the baseline `origin.1`, sampled every `step` units.
pub fn glyph_points(symbol: char, size: f64, origin: (f64, f64), step: f64) -> Vec<(f64, f64)> {
    if size <= 0.0 || step <= 0.0 {
        return Vec::new();
    }
    let pixel = size / GLYPH_ROWS as f64;
    let left = origin.0 - pixel * GLYPH_COLS as f64 / 2.0;
    let samples = (pixel / step).ceil().max(1.0) as usize;

    let mut points = Vec::new();
    for (col, row) in lit_cells(symbol) {
        let x0 = left + col as f64 * pixel;
        let y0 = origin.1 + (GLYPH_ROWS - 1 - row) as f64 * pixel;
        for sx in 0..samples {
            for sy in 0..samples {
                points.push((
                    x0 + (sx as f64 + 0.5) / samples as f64 * pixel,
                    y0 + (sy as f64 + 0.5) / samples as f64 * pixel,
                ));
            }
        }
    }
    points
}

/// Canvas units per braille dot so the largest glyph fits `area`.
pub fn units_per_dot(area: Rect, max_size: u16) -> f64 {
    let dots_x = f64::from(area.width) * 2.0;
    let dots_y = f64::from(area.height) * 4.0;
    let need_y = f64::from(max_size) * 1.15;
    let need_x = f64::from(max_size) * GLYPH_COLS as f64 / GLYPH_ROWS as f64 * 1.2;
    (need_y / dots_y).max(need_x / dots_x)
}

pub struct GlyphCanvas<'a> {
    stimulus: &'a Stimulus,
    max_size: u16,
    background: Color,
}

impl<'a> GlyphCanvas<'a> {
    pub fn new(stimulus: &'a Stimulus, max_size: u16, background: Color) -> Self {
        Self {
            stimulus,
            max_size,
            background,
        }
    }
}

impl Widget for GlyphCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.max_size == 0 {
            return;
        }
        let unit = units_per_dot(area, self.max_size);
        let x_bound = f64::from(area.width) * 2.0 * unit;
        let y_bound = f64::from(area.height) * 4.0 * unit;
        let baseline = (y_bound - f64::from(self.max_size)) / 2.0;

        let points = glyph_points(
            self.stimulus.symbol,
            f64::from(self.stimulus.size),
            (x_bound / 2.0, baseline),
            unit,
        );
        let rgb = self.stimulus.color;
        let color = Color::Rgb(rgb.r, rgb.g, rgb.b);

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(self.background)
            .x_bounds([0.0, x_bound])
            .y_bounds([0.0, y_bound])
            .paint(|ctx| {
                ctx.draw(&Points {
                    coords: &points,
                    color,
                });
            })
            .render(area, buf);
    }
}
