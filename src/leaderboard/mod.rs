//! Leaderboard formatting.
//!
//! Sorts a team table by score, keeps the top rows and renders them as a
//! fixed-width text table, as chat-sized text chunks, or as a PNG.

use std::cmp::Reverse;
use std::io::Cursor;

use font8x8::legacy::BASIC_LEGACY;
use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;

use crate::models::{PlayerTally, Score, TeamTable};

const HEADERS: [&str; 6] = ["Rank", "Name", "Win", "Draw", "Loss", "Score"];
const COLUMN_GAP: &str = "  ";

// Image layout, in pixels
const GLYPH_SIZE: u32 = 8;
const SCALE: u32 = 2;
const LINE_GAP: u32 = 6;
const PADDING: u32 = 16;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FOREGROUND: Rgb<u8> = Rgb([32, 32, 32]);

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// One displayed leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-based display position
    pub rank: usize,
    pub name: String,
    pub tally: PlayerTally,
    pub score: Score,
}

/// A sorted, truncated view of a team table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    pub team: String,
    pub rows: Vec<LeaderboardRow>,
}

/// All rows of a table, best first. Equal scores are ordered by name.
fn ranked(table: &TeamTable) -> Vec<LeaderboardRow> {
    let mut rows: Vec<(&str, &PlayerTally, Score)> = table.rows().collect();
    rows.sort_by_key(|&(name, _, score)| (Reverse(score), name));
    rows.into_iter()
        .enumerate()
        .map(|(i, (name, tally, score))| LeaderboardRow {
            rank: i + 1,
            name: name.to_string(),
            tally: *tally,
            score,
        })
        .collect()
}

impl Leaderboard {
    /// Top `limit` players of `table`.
    pub fn from_table(table: &TeamTable, limit: usize) -> Self {
        let mut rows = ranked(table);
        rows.truncate(limit);
        Self {
            team: table.team.clone(),
            rows,
        }
    }

    /// Full-table position of one player (case-insensitive).
    pub fn position_of(table: &TeamTable, player: &str) -> Option<LeaderboardRow> {
        let player = player.to_lowercase();
        ranked(table).into_iter().find(|row| row.name == player)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a fixed-width text table.
    pub fn render_text(&self) -> String {
        self.lines().join("\n")
    }

    /// Rendered lines, split into groups of at most `lines_per_chunk` lines
    /// and `max_chars` characters. A line longer than `max_chars` gets a
    /// chunk of its own.
    pub fn chunks(&self, lines_per_chunk: usize, max_chars: usize) -> Vec<String> {
        let lines_per_chunk = lines_per_chunk.max(1);
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_lines = 0;

        for line in self.lines() {
            let len = line.chars().count();
            let fits = current_lines < lines_per_chunk
                && current.chars().count() + 1 + len <= max_chars;
            if current_lines > 0 && !fits {
                chunks.push(std::mem::take(&mut current));
                current_lines = 0;
            }
            if current_lines > 0 {
                current.push('\n');
            }
            current.push_str(&line);
            current_lines += 1;
        }
        if current_lines > 0 {
            chunks.push(current);
        }
        chunks
    }

    fn lines(&self) -> Vec<String> {
        let cells: Vec<[String; 6]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.rank.to_string(),
                    row.name.clone(),
                    row.tally.wins.to_string(),
                    row.tally.draws.to_string(),
                    row.tally.losses.to_string(),
                    row.score.to_string(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let format_line = |cells: [&str; 6]| -> String {
            cells
                .iter()
                .zip(widths)
                .enumerate()
                .map(|(col, (cell, width))| {
                    // Name is the only left-aligned column
                    if col == 1 {
                        format!("{:<width$}", cell, width = width)
                    } else {
                        format!("{:>width$}", cell, width = width)
                    }
                })
                .collect::<Vec<_>>()
                .join(COLUMN_GAP)
        };

        let mut lines = Vec::with_capacity(cells.len() + 2);
        lines.push(format_line(HEADERS));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP),
        );
        for row in &cells {
            lines.push(format_line(row.each_ref().map(String::as_str)));
        }
        lines
    }

    /// Rasterize the text table into a PNG.
    pub fn render_png(&self) -> Result<Vec<u8>, RenderError> {
        let lines = self.lines();
        let columns = lines
            .iter()
            .map(|l| l.chars().count() as u32)
            .max()
            .unwrap_or(0);
        let rows = lines.len() as u32;

        let cell = GLYPH_SIZE * SCALE;
        let width = columns * cell + 2 * PADDING;
        let height = rows * cell + rows.saturating_sub(1) * LINE_GAP + 2 * PADDING;

        let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
        for (line_no, line) in lines.iter().enumerate() {
            let y0 = PADDING + line_no as u32 * (cell + LINE_GAP);
            for (col, ch) in line.chars().enumerate() {
                let x0 = PADDING + col as u32 * cell;
                draw_glyph(&mut canvas, ch, x0, y0);
            }
        }

        let mut bytes = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

fn draw_glyph(canvas: &mut RgbImage, ch: char, x0: u32, y0: u32) {
    let index = if ch.is_ascii() { ch as usize } else { '?' as usize };
    for (dy, bits) in BASIC_LEGACY[index].iter().enumerate() {
        for dx in 0..GLYPH_SIZE {
            if bits & (1 << dx) == 0 {
                continue;
            }
            for sy in 0..SCALE {
                for sx in 0..SCALE {
                    canvas.put_pixel(
                        x0 + dx * SCALE + sx,
                        y0 + dy as u32 * SCALE + sy,
                        FOREGROUND,
                    );
                }
            }
        }
    }
}
