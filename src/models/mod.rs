//! Core data models for the leaderboard bot.

mod game;
mod ids;
mod stats;

pub use game::*;
pub use ids::*;
pub use stats::*;
