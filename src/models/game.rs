//! The outcome of one tournament game between two players.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pgn::ParseError;

/// Outcome of a single game, from the PGN `Result` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
}

impl GameResult {
    /// The PGN token for this result.
    pub fn as_pgn(&self) -> &'static str {
        match self {
            GameResult::WhiteWin => "1-0",
            GameResult::BlackWin => "0-1",
            GameResult::Draw => "1/2-1/2",
        }
    }
}

impl FromStr for GameResult {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1-0" => Ok(GameResult::WhiteWin),
            "0-1" => Ok(GameResult::BlackWin),
            "1/2-1/2" => Ok(GameResult::Draw),
            other => Err(ParseError::UnknownResult(other.to_string())),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_pgn())
    }
}

/// A parsed game. Player names are lowercased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub white: String,
    pub black: String,
    pub result: GameResult,
}

impl GameRecord {
    pub fn new(white: &str, black: &str, result: GameResult) -> Self {
        Self {
            white: white.to_lowercase(),
            black: black.to_lowercase(),
            result,
        }
    }

    /// Winner and loser names, or `None` for a draw.
    pub fn decisive(&self) -> Option<(&str, &str)> {
        match self.result {
            GameResult::WhiteWin => Some((&self.white, &self.black)),
            GameResult::BlackWin => Some((&self.black, &self.white)),
            GameResult::Draw => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_from_pgn_tokens() {
        assert_eq!("1-0".parse::<GameResult>().unwrap(), GameResult::WhiteWin);
        assert_eq!("0-1".parse::<GameResult>().unwrap(), GameResult::BlackWin);
        assert_eq!("1/2-1/2".parse::<GameResult>().unwrap(), GameResult::Draw);
    }

    #[test]
    fn test_game_result_rejects_unfinished() {
        let err = "*".parse::<GameResult>().unwrap_err();
        assert!(matches!(err, ParseError::UnknownResult(ref s) if s == "*"));
    }

    #[test]
    fn test_game_result_display_matches_pgn() {
        for result in [GameResult::WhiteWin, GameResult::BlackWin, GameResult::Draw] {
            assert_eq!(result.to_string().parse::<GameResult>().unwrap(), result);
        }
    }

    #[test]
    fn test_game_record_lowercases_names() {
        let game = GameRecord::new("Magnus", "HIKARU", GameResult::Draw);
        assert_eq!(game.white, "magnus");
        assert_eq!(game.black, "hikaru");
    }

    #[test]
    fn test_game_record_decisive() {
        let white_win = GameRecord::new("a", "b", GameResult::WhiteWin);
        assert_eq!(white_win.decisive(), Some(("a", "b")));

        let black_win = GameRecord::new("a", "b", GameResult::BlackWin);
        assert_eq!(black_win.decisive(), Some(("b", "a")));

        let draw = GameRecord::new("a", "b", GameResult::Draw);
        assert_eq!(draw.decisive(), None);
    }
}
