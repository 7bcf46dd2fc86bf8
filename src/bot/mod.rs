//! Chat front end.
//!
//! [`Bot`] turns chat commands into aggregator calls and posts the answers
//! through a [`ChatChannel`]. The Discord transport lives in [`discord`].

pub mod command;
pub mod discord;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::{AggregateError, ProgressSink, TeamAggregator};
use crate::config::{BotConfig, ConfigError, OutputFormat};
use crate::cooldown::CooldownGate;
use crate::fetch::FetchError;
use crate::leaderboard::{Leaderboard, RenderError};
use crate::models::{TeamRef, TeamTable};

pub use command::{Command, CommandError};

/// Errors from the chat transport.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Discord(#[from] serenity::Error),

    #[error("Chat transport error: {0}")]
    Transport(String),
}

/// Errors while handling one command.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// Handle to a message the bot posted, for editing it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub u64);

/// Where command replies go.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    async fn post(&self, text: &str) -> Result<MessageRef, ChatError>;

    async fn edit(&self, message: MessageRef, text: &str) -> Result<(), ChatError>;

    async fn send_image(&self, filename: &str, png: Vec<u8>) -> Result<MessageRef, ChatError>;
}

/// Posts the first progress line and edits that message for the rest.
pub struct ChannelProgress<'a> {
    channel: &'a dyn ChatChannel,
    message: Option<MessageRef>,
}

impl<'a> ChannelProgress<'a> {
    pub fn new(channel: &'a dyn ChatChannel) -> Self {
        Self {
            channel,
            message: None,
        }
    }
}

#[async_trait]
impl<'a> ProgressSink for ChannelProgress<'a> {
    async fn report(&mut self, text: &str) {
        let result = match self.message {
            Some(message) => self.channel.edit(message, text).await,
            None => match self.channel.post(text).await {
                Ok(message) => {
                    self.message = Some(message);
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };
        if let Err(e) = result {
            warn!("Failed to send progress update: {}", e);
        }
    }
}

/// Runtime settings for [`Bot`], resolved from [`BotConfig`].
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub cooldown: Duration,
    pub cache_ttl: Duration,
    /// Cache lifetime as configured, shown in the help text
    pub cache_ttl_label: String,
    pub default_top: usize,
    pub chunk_lines: usize,
    pub output: OutputFormat,
}

impl BotSettings {
    pub fn from_config(config: &BotConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            cooldown: config.cooldown()?,
            cache_ttl: config.cache_ttl()?,
            cache_ttl_label: config.cache_ttl.clone(),
            default_top: config.default_top,
            chunk_lines: config.chunk_lines,
            output: config.output,
        })
    }
}

/// User-facing text for an aggregation failure.
pub fn error_message(error: &AggregateError) -> String {
    match error {
        AggregateError::UnknownTeam(fragment) => {
            format!("Kein Team gefunden für '{}'.", fragment)
        }
        AggregateError::RefreshInProgress(team) => format!(
            "Daten für Team {} werden bereits abgefragt. Bitte warten...",
            team
        ),
        AggregateError::Fetch(FetchError::RateLimited {
            retry_after_secs, ..
        }) => format!(
            "Lichess begrenzt gerade die Anfragen. Bitte in {} Sekunden erneut versuchen.",
            retry_after_secs
        ),
        AggregateError::Fetch(_) => {
            "Lichess ist gerade nicht erreichbar. Bitte später erneut versuchen.".to_string()
        }
        AggregateError::TournamentFetch {
            tournament, merged, ..
        } => format!(
            "Turnier {} konnte nicht geladen werden. {} neue Turniere wurden übernommen, \
             der Rest folgt beim nächsten !refresh.",
            tournament, merged
        ),
    }
}

/// Discord's per-message character limit.
pub const MESSAGE_LIMIT: usize = 2000;

const CODE_FENCE: &str = "```";

/// Wrap text in a code block.
fn code_block(text: &str) -> String {
    format!("{}\n{}\n{}", CODE_FENCE, text, CODE_FENCE)
}

/// Characters left for table text once the code fences are added.
fn code_block_capacity() -> usize {
    MESSAGE_LIMIT - code_block("").chars().count()
}

/// Command handler shared by every chat connection.
pub struct Bot {
    aggregator: TeamAggregator,
    cooldown: CooldownGate,
    settings: BotSettings,
}

impl Bot {
    pub fn new(aggregator: TeamAggregator, settings: BotSettings) -> Self {
        Self {
            aggregator,
            cooldown: CooldownGate::new(settings.cooldown),
            settings,
        }
    }

    /// Handle one incoming message. Non-command messages are ignored.
    ///
    /// Only transport failures are returned; everything else is answered
    /// in the channel.
    pub async fn handle(
        &self,
        user_id: &str,
        mention: &str,
        content: &str,
        channel: &dyn ChatChannel,
    ) -> Result<(), ChatError> {
        let command = match Command::parse(content) {
            None => return Ok(()),
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                channel.post(&e.to_string()).await?;
                return Ok(());
            }
        };

        if command.is_rate_limited() {
            if let Err(remaining) = self.cooldown.check(user_id) {
                let seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                channel
                    .post(&format!(
                        "{}: {} Sekunden Timeout verbleibend",
                        mention, seconds
                    ))
                    .await?;
                return Ok(());
            }
        }

        info!("Command from {}: {:?}", user_id, command);

        match self.run(command, mention, channel).await {
            Ok(()) => Ok(()),
            Err(BotError::Chat(e)) => Err(e),
            Err(BotError::Aggregate(e)) => {
                warn!("Command failed: {}", e);
                channel.post(&error_message(&e)).await?;
                Ok(())
            }
            Err(BotError::Render(e)) => {
                warn!("Rendering failed: {}", e);
                channel
                    .post("Die Tabelle konnte nicht als Bild erstellt werden.")
                    .await?;
                Ok(())
            }
        }
    }

    async fn run(
        &self,
        command: Command,
        mention: &str,
        channel: &dyn ChatChannel,
    ) -> Result<(), BotError> {
        match command {
            Command::Hello => {
                channel.post(&format!("Hello {}", mention)).await?;
            }
            Command::Commands => {
                channel
                    .post(&command::help_text(&self.settings.cache_ttl_label))
                    .await?;
            }
            Command::Table { team, top } => {
                let team = self.aggregator.resolve(&team).await?;
                let table = self.load_table(&team, channel).await?;
                let top = top.unwrap_or(self.settings.default_top);
                self.post_table(&team, &table, top, channel).await?;
            }
            Command::Points { player, team } => {
                let team = self.aggregator.resolve(&team).await?;
                let table = self.load_table(&team, channel).await?;
                let player = player.to_lowercase();
                let text = match Leaderboard::position_of(&table, &player) {
                    Some(row) => format!(
                        "Statistiken für {}. Win: {}  Draw: {}  Loss: {}  Punkte: {}  Platz: {}/{}",
                        row.name,
                        row.tally.wins,
                        row.tally.draws,
                        row.tally.losses,
                        row.score,
                        row.rank,
                        table.len()
                    ),
                    None => format!(
                        "Spieler {} hat noch nicht in einem Turnier von Team {} teilgenommen.",
                        player, team.name
                    ),
                };
                channel.post(&text).await?;
            }
            Command::Refresh { team } => {
                let team = self.aggregator.resolve(&team).await?;
                let mut progress = ChannelProgress::new(channel);
                let report = self.aggregator.refresh_team(&team, &mut progress).await?;
                let text = if report.up_to_date() {
                    format!("Daten für Team {} sind bereits aktuell.", team.name)
                } else {
                    format!(
                        "Daten für Team {} wurden aktualisiert ({} neue Turniere).",
                        team.name, report.new_tournaments
                    )
                };
                channel.post(&text).await?;
            }
        }
        Ok(())
    }

    /// Cached table, or a refreshed one with progress posted to `channel`.
    async fn load_table(
        &self,
        team: &TeamRef,
        channel: &dyn ChatChannel,
    ) -> Result<TeamTable, BotError> {
        if self.aggregator.store().is_refreshing(&team.name) {
            return Err(AggregateError::RefreshInProgress(team.name.clone()).into());
        }
        if let Some(table) = self.aggregator.fresh_table(team, self.settings.cache_ttl) {
            return Ok(table);
        }

        channel
            .post(&format!(
                "Hole Daten für Team {} live von Lichess. Das kann etwas dauern.",
                team.name
            ))
            .await?;
        let mut progress = ChannelProgress::new(channel);
        let (table, _) = self
            .aggregator
            .table_for(team, self.settings.cache_ttl, &mut progress)
            .await?;
        Ok(table)
    }

    async fn post_table(
        &self,
        team: &TeamRef,
        table: &TeamTable,
        top: usize,
        channel: &dyn ChatChannel,
    ) -> Result<(), BotError> {
        let board = Leaderboard::from_table(table, top);
        if board.is_empty() {
            channel
                .post(&format!(
                    "Für Team {} liegen noch keine Spielergebnisse vor.",
                    team.name
                ))
                .await?;
            return Ok(());
        }

        channel.post("Hier sind die Spielergebnisse:").await?;
        match self.settings.output {
            OutputFormat::Text => {
                for chunk in board.chunks(self.settings.chunk_lines, code_block_capacity()) {
                    channel.post(&code_block(&chunk)).await?;
                }
            }
            OutputFormat::Image => {
                let png = board.render_png()?;
                channel
                    .send_image(&format!("{}.png", team.id), png)
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{TeamStore, TournamentSource};
    use crate::models::TournamentId;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Post(String),
        Edit(u64, String),
        Image(String),
    }

    #[derive(Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<Sent>>,
    }

    impl RecordingChannel {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn posts(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::Post(text) => Some(text),
                    _ => None,
                })
                .collect()
        }

        fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl ChatChannel for RecordingChannel {
        async fn post(&self, text: &str) -> Result<MessageRef, ChatError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push(Sent::Post(text.to_string()));
            Ok(MessageRef(sent.len() as u64))
        }

        async fn edit(&self, message: MessageRef, text: &str) -> Result<(), ChatError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Edit(message.0, text.to_string()));
            Ok(())
        }

        async fn send_image(&self, filename: &str, png: Vec<u8>) -> Result<MessageRef, ChatError> {
            assert_eq!(&png[..4], b"\x89PNG");
            let mut sent = self.sent.lock().unwrap();
            sent.push(Sent::Image(filename.to_string()));
            Ok(MessageRef(sent.len() as u64))
        }
    }

    struct FailingChannel;

    #[async_trait]
    impl ChatChannel for FailingChannel {
        async fn post(&self, _text: &str) -> Result<MessageRef, ChatError> {
            Err(ChatError::Transport("offline".to_string()))
        }

        async fn edit(&self, _message: MessageRef, _text: &str) -> Result<(), ChatError> {
            Err(ChatError::Transport("offline".to_string()))
        }

        async fn send_image(&self, _filename: &str, _png: Vec<u8>) -> Result<MessageRef, ChatError> {
            Err(ChatError::Transport("offline".to_string()))
        }
    }

    fn pgn(white: &str, black: &str, result: &str) -> String {
        format!(
            "[White \"{}\"]\n[Black \"{}\"]\n[Result \"{}\"]\n\n1. e4 {}",
            white, black, result, result
        )
    }

    struct StaticSource {
        team: TeamRef,
        games: HashMap<TournamentId, Vec<String>>,
        order: Vec<TournamentId>,
        unavailable: bool,
    }

    impl StaticSource {
        fn new(tournaments: &[(&str, Vec<String>)]) -> Self {
            Self {
                team: TeamRef::new("sf-berlin", "Schachfreunde Berlin"),
                games: tournaments
                    .iter()
                    .map(|(id, games)| (TournamentId::from(*id), games.clone()))
                    .collect(),
                order: tournaments.iter().map(|(id, _)| TournamentId::from(*id)).collect(),
                unavailable: false,
            }
        }
    }

    #[async_trait]
    impl TournamentSource for StaticSource {
        async fn resolve_team(&self, fragment: &str) -> Result<Option<TeamRef>, FetchError> {
            if self.unavailable {
                return Err(FetchError::HttpStatus {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                });
            }
            Ok(self
                .team
                .name
                .to_lowercase()
                .contains(&fragment.to_lowercase())
                .then(|| self.team.clone()))
        }

        async fn list_tournaments(&self, _team: &TeamRef) -> Result<Vec<TournamentId>, FetchError> {
            Ok(self.order.clone())
        }

        async fn fetch_games(&self, tournament: &TournamentId) -> Result<Vec<String>, FetchError> {
            Ok(self.games.get(tournament).cloned().unwrap_or_default())
        }
    }

    fn settings() -> BotSettings {
        BotSettings {
            cooldown: Duration::ZERO,
            cache_ttl: Duration::from_secs(3600),
            cache_ttl_label: "1h".to_string(),
            default_top: 10,
            chunk_lines: 40,
            output: OutputFormat::Text,
        }
    }

    fn bot_with(source: StaticSource, settings: BotSettings) -> Bot {
        let aggregator = TeamAggregator::new(Arc::new(source), Arc::new(TeamStore::new()));
        Bot::new(aggregator, settings)
    }

    fn sample_source() -> StaticSource {
        StaticSource::new(&[
            ("t1", vec![pgn("A", "B", "1-0"), pgn("A", "C", "1/2-1/2")]),
            ("t2", vec![pgn("C", "B", "1-0")]),
        ])
    }

    #[tokio::test]
    async fn test_hello_and_chat_ignored() {
        let bot = bot_with(sample_source(), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "good game everyone", &channel)
            .await
            .unwrap();
        assert!(channel.sent().is_empty());

        bot.handle("1", "<@1>", "!hello", &channel).await.unwrap();
        assert_eq!(channel.posts(), vec!["Hello <@1>"]);
    }

    #[tokio::test]
    async fn test_commands_lists_help() {
        let bot = bot_with(sample_source(), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!commands", &channel).await.unwrap();
        let posts = channel.posts();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].contains("!tabelle"));
        assert!(posts[0].contains("gecached für 1h"));
    }

    #[tokio::test]
    async fn test_table_fetches_then_serves_cache() {
        let bot = bot_with(sample_source(), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!tabelle berlin", &channel)
            .await
            .unwrap();

        let sent = channel.sent();
        assert_eq!(
            sent[0],
            Sent::Post(
                "Hole Daten für Team Schachfreunde Berlin live von Lichess. Das kann etwas dauern."
                    .to_string()
            )
        );
        assert_eq!(sent[1], Sent::Post("Fortschritt: 1/2".to_string()));
        assert_eq!(sent[2], Sent::Edit(2, "Fortschritt: 2/2".to_string()));
        assert_eq!(sent[3], Sent::Post("Hier sind die Spielergebnisse:".to_string()));
        let Sent::Post(table) = &sent[4] else {
            panic!("expected table post, got {:?}", sent[4]);
        };
        assert!(table.starts_with("```\nRank"));
        assert!(table.ends_with("\n```"));
        // a: 1.5, c: 1.5, b: 0.0
        let rows: Vec<&str> = table.lines().skip(3).take(3).collect();
        assert!(rows[0].contains(" a "));
        assert!(rows[1].contains(" c "));
        assert!(rows[2].contains(" b "));
        assert_eq!(sent.len(), 5);

        channel.clear();
        bot.handle("1", "<@1>", "!tabelle berlin 1", &channel)
            .await
            .unwrap();
        let posts = channel.posts();
        assert_eq!(posts[0], "Hier sind die Spielergebnisse:");
        assert_eq!(posts[1].lines().count(), 5);
    }

    #[tokio::test]
    async fn test_table_chunks_long_output() {
        let games: Vec<String> = (0..30)
            .map(|i| pgn(&format!("w{:02}", i), &format!("b{:02}", i), "1-0"))
            .collect();
        let source = StaticSource::new(&[("t1", games)]);
        let bot = bot_with(
            source,
            BotSettings {
                chunk_lines: 20,
                ..settings()
            },
        );
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!tabelle berlin 60", &channel)
            .await
            .unwrap();

        let posts = channel.posts();
        let start = posts
            .iter()
            .position(|p| p == "Hier sind die Spielergebnisse:")
            .unwrap();
        let chunks = &posts[start + 1..];
        // 2 header lines + 60 rows in chunks of 20
        assert_eq!(chunks.len(), 4);
        for chunk in chunks {
            assert!(chunk.lines().count() <= 22);
        }
    }

    #[tokio::test]
    async fn test_table_chunks_fit_message_limit() {
        let games: Vec<String> = (0..20)
            .map(|i| {
                pgn(
                    &format!("player_name_long_{:03}", 2 * i),
                    &format!("player_name_long_{:03}", 2 * i + 1),
                    "1-0",
                )
            })
            .collect();
        let bot = bot_with(StaticSource::new(&[("t1", games)]), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!tabelle berlin 40", &channel)
            .await
            .unwrap();

        let posts = channel.posts();
        let start = posts
            .iter()
            .position(|p| p == "Hier sind die Spielergebnisse:")
            .unwrap();
        let chunks = &posts[start + 1..];
        assert!(chunks.len() >= 2);
        for chunk in chunks {
            assert!(chunk.chars().count() <= MESSAGE_LIMIT);
            assert!(chunk.starts_with("```\n") && chunk.ends_with("\n```"));
        }
        let rows: usize = chunks
            .iter()
            .map(|c| c.lines().filter(|l| l.contains("player_name_long_")).count())
            .sum();
        assert_eq!(rows, 40);
    }

    #[tokio::test]
    async fn test_table_as_image() {
        let bot = bot_with(
            sample_source(),
            BotSettings {
                output: OutputFormat::Image,
                ..settings()
            },
        );
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!tabelle berlin", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.sent().last(),
            Some(&Sent::Image("sf-berlin.png".to_string()))
        );
    }

    #[tokio::test]
    async fn test_table_empty_team() {
        let bot = bot_with(StaticSource::new(&[]), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!tabelle berlin", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.posts().last().map(String::as_str),
            Some("Für Team Schachfreunde Berlin liegen noch keine Spielergebnisse vor.")
        );
    }

    #[tokio::test]
    async fn test_points_found_and_missing() {
        let bot = bot_with(sample_source(), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!punkte C berlin", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.posts().last().map(String::as_str),
            Some("Statistiken für c. Win: 1  Draw: 1  Loss: 0  Punkte: 1.5  Platz: 2/3")
        );

        bot.handle("1", "<@1>", "!punkte Zed berlin", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.posts().last().map(String::as_str),
            Some("Spieler zed hat noch nicht in einem Turnier von Team Schachfreunde Berlin teilgenommen.")
        );
    }

    #[tokio::test]
    async fn test_refresh_reports_outcome() {
        let bot = bot_with(sample_source(), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!refresh berlin", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.posts().last().map(String::as_str),
            Some("Daten für Team Schachfreunde Berlin wurden aktualisiert (2 neue Turniere).")
        );

        bot.handle("1", "<@1>", "!refresh berlin", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.posts().last().map(String::as_str),
            Some("Daten für Team Schachfreunde Berlin sind bereits aktuell.")
        );
    }

    #[tokio::test]
    async fn test_unknown_team_message() {
        let bot = bot_with(sample_source(), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!tabelle hamburg", &channel)
            .await
            .unwrap();
        assert_eq!(channel.posts(), vec!["Kein Team gefunden für 'hamburg'."]);
    }

    #[tokio::test]
    async fn test_upstream_failure_message() {
        let mut source = sample_source();
        source.unavailable = true;
        let bot = bot_with(source, settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!refresh berlin", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.posts(),
            vec!["Lichess ist gerade nicht erreichbar. Bitte später erneut versuchen."]
        );
    }

    #[tokio::test]
    async fn test_refresh_in_progress_message() {
        let bot = bot_with(sample_source(), settings());
        let channel = RecordingChannel::default();
        let _guard = bot
            .aggregator
            .store()
            .try_begin_refresh("Schachfreunde Berlin")
            .unwrap();

        bot.handle("1", "<@1>", "!tabelle berlin", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.posts(),
            vec!["Daten für Team Schachfreunde Berlin werden bereits abgefragt. Bitte warten..."]
        );
    }

    #[tokio::test]
    async fn test_cooldown_blocks_second_command() {
        let bot = bot_with(
            sample_source(),
            BotSettings {
                cooldown: Duration::from_secs(30),
                ..settings()
            },
        );
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!refresh berlin", &channel)
            .await
            .unwrap();
        channel.clear();

        bot.handle("1", "<@1>", "!punkte a berlin", &channel)
            .await
            .unwrap();
        let posts = channel.posts();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].starts_with("<@1>: "));
        assert!(posts[0].ends_with(" Sekunden Timeout verbleibend"));

        // Other users and ungated commands are unaffected
        channel.clear();
        bot.handle("1", "<@1>", "!hello", &channel).await.unwrap();
        bot.handle("2", "<@2>", "!punkte a berlin", &channel)
            .await
            .unwrap();
        assert_eq!(channel.posts()[0], "Hello <@1>");
        assert!(channel.posts()[1].starts_with("Statistiken für a."));
    }

    #[tokio::test]
    async fn test_usage_error_posted() {
        let bot = bot_with(sample_source(), settings());
        let channel = RecordingChannel::default();

        bot.handle("1", "<@1>", "!tabelle berlin 0", &channel)
            .await
            .unwrap();
        assert_eq!(
            channel.posts(),
            vec![CommandError::InvalidTop("0".to_string()).to_string()]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_returned() {
        let bot = bot_with(sample_source(), settings());
        let result = bot.handle("1", "<@1>", "!hello", &FailingChannel).await;
        assert!(matches!(result, Err(ChatError::Transport(_))));
    }

    #[tokio::test]
    async fn test_progress_failures_do_not_abort() {
        let mut progress = ChannelProgress::new(&FailingChannel);
        progress.report("Fortschritt: 1/1").await;
        assert!(progress.message.is_none());
    }

    #[test]
    fn test_settings_from_config() {
        let settings = BotSettings::from_config(&BotConfig::default()).unwrap();
        assert_eq!(settings.cooldown, Duration::from_secs(30));
        assert_eq!(settings.cache_ttl, Duration::from_secs(86400));
        assert_eq!(settings.cache_ttl_label, "24h");
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let messages = [
            error_message(&AggregateError::UnknownTeam("x".to_string())),
            error_message(&AggregateError::RefreshInProgress("x".to_string())),
            error_message(&AggregateError::Fetch(FetchError::RateLimited {
                host: "lichess.org".to_string(),
                retry_after_secs: 60,
            })),
            error_message(&AggregateError::Fetch(FetchError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            })),
            error_message(&AggregateError::TournamentFetch {
                tournament: TournamentId::from("t1"),
                merged: 2,
                source: FetchError::HttpStatus {
                    status: 500,
                    message: "Internal Server Error".to_string(),
                },
            }),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(messages[2].contains("60 Sekunden"));
    }
}
