//! Chat command parsing.

use thiserror::Error;

pub const PREFIX: char = '!';

pub const TABLE_USAGE: &str = "!tabelle <team_name> <top output>";
pub const POINTS_USAGE: &str = "!punkte <spieler_name> <team_name>";
pub const REFRESH_USAGE: &str = "!refresh <team_name>";

/// Errors for recognised commands with bad arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Verwendung: {0}")]
    Usage(&'static str),

    #[error("Ungültige Anzahl '{0}'. Bitte eine Zahl größer 0 angeben.")]
    InvalidTop(String),
}

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Hello,
    Commands,
    Table { team: String, top: Option<usize> },
    Points { player: String, team: String },
    Refresh { team: String },
}

impl Command {
    /// Parse a message. Returns `None` for anything that is not one of our
    /// commands, so ordinary chat is ignored.
    ///
    /// Team names may contain spaces. For `!tabelle` a trailing number is
    /// taken as the row count.
    pub fn parse(content: &str) -> Option<Result<Self, CommandError>> {
        let mut words = content.split_whitespace();
        let name = words.next()?.strip_prefix(PREFIX)?;
        let args: Vec<&str> = words.collect();

        let command = match name.to_lowercase().as_str() {
            "hello" => Ok(Command::Hello),
            "commands" => Ok(Command::Commands),
            "tabelle" => parse_table(&args),
            "punkte" => match args.split_first() {
                Some((player, team)) if !team.is_empty() => Ok(Command::Points {
                    player: player.to_string(),
                    team: team.join(" "),
                }),
                _ => Err(CommandError::Usage(POINTS_USAGE)),
            },
            "refresh" => {
                if args.is_empty() {
                    Err(CommandError::Usage(REFRESH_USAGE))
                } else {
                    Ok(Command::Refresh {
                        team: args.join(" "),
                    })
                }
            }
            _ => return None,
        };
        Some(command)
    }

    /// Whether the command is subject to the per-user cooldown.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Command::Table { .. } | Command::Points { .. } | Command::Refresh { .. }
        )
    }
}

fn parse_table(args: &[&str]) -> Result<Command, CommandError> {
    match args {
        [] => Err(CommandError::Usage(TABLE_USAGE)),
        [team] => Ok(Command::Table {
            team: team.to_string(),
            top: None,
        }),
        [team @ .., last] => {
            if !last.chars().all(|c| c.is_ascii_digit() || c == '-') {
                return Ok(Command::Table {
                    team: args.join(" "),
                    top: None,
                });
            }
            match last.parse::<usize>() {
                Ok(top) if top > 0 => Ok(Command::Table {
                    team: team.join(" "),
                    top: Some(top),
                }),
                _ => Err(CommandError::InvalidTop(last.to_string())),
            }
        }
    }
}

/// Help text listing every command.
pub fn help_text(cache_ttl: &str) -> String {
    format!(
        "```\n\
         {:<34} -  Gibt die top <top output> Tabelle für Team <team_name> aus\n\
         {:<34} -  Gibt den Score und die Position für Spieler <spieler_name> im Team <team_name> aus\n\
         {:<34} -  Aktualisiert Daten für Team <team_name>. Daten sind gecached für {}\n\
         ```",
        TABLE_USAGE, POINTS_USAGE, REFRESH_USAGE, cache_ttl
    )
}
