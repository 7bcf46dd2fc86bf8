//! # Lichess Leaderboard
//!
//! Chat bot that builds per-team leaderboards from Lichess Swiss tournaments.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (games, tallies, team tables)
//! - **pgn**: Game header parsing
//! - **calculate**: Per-tournament win/draw/loss tabulation
//! - **aggregate**: Incremental per-team aggregation and in-process state
//! - **leaderboard**: Sorting and rendering (text chunks, PNG)
//! - **lichess**: Lichess API client
//! - **fetch**: HTTP fetching
//! - **bot**: Chat commands and the Discord transport
//! - **config**: Configuration loading and validation

pub mod aggregate;
pub mod bot;
pub mod calculate;
pub mod config;
pub mod cooldown;
pub mod fetch;
pub mod leaderboard;
pub mod lichess;
pub mod models;
pub mod pgn;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
