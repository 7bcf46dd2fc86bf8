//! PGN game parsing.
//!
//! Only the tag-pair header of each game is read: the two player names
//! and the result. Movetext is ignored.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::models::{GameRecord, GameResult};

/// Separator Lichess puts between games in a multi-game PGN export.
pub const GAME_SEPARATOR: &str = "\n\n\n";

static TAG_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\[([A-Za-z0-9_]+)\s+"((?:[^"\\]|\\.)*)"\]\s*$"#).unwrap());

/// Errors for a single malformed game.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing or empty [{0}] tag")]
    MissingTag(&'static str),

    #[error("Unknown result token: {0:?}")]
    UnknownResult(String),
}

/// Split a multi-game PGN export into per-game blocks, dropping empty ones.
pub fn split_games(body: &str) -> Vec<String> {
    body.replace("\r\n", "\n")
        .split(GAME_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse one game's headers into a [`GameRecord`].
pub fn parse_game(pgn: &str) -> Result<GameRecord, ParseError> {
    let mut white = None;
    let mut black = None;
    let mut result = None;

    for caps in TAG_PAIR.captures_iter(pgn) {
        let value = unescape(&caps[2]);
        match &caps[1] {
            "White" => white = Some(value),
            "Black" => black = Some(value),
            "Result" => result = Some(value),
            _ => {}
        }
    }

    let white = white
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingTag("White"))?;
    let black = black
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingTag("Black"))?;
    let result: GameResult = result.ok_or(ParseError::MissingTag("Result"))?.parse()?;

    Ok(GameRecord::new(&white, &black, result))
}

/// Parse every block, skipping the ones that fail.
pub fn parse_games<S: AsRef<str>>(blocks: &[S]) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        match parse_game(block.as_ref()) {
            Ok(game) => games.push(game),
            Err(e) => debug!("Skipping game #{}: {}", i + 1, e),
        }
    }
    games
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
