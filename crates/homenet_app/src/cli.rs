use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use homenet_core::EntityKind;

use crate::platform::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "homenet")]
#[command(about = "Terminal client for the homenet media tracker", long_about = None)]
pub struct Cli {
    /// Server root, e.g. http://localhost:8080. Overrides the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Client config file (RON).
    #[arg(long, global = true, default_value = "homenet_client.ron")]
    pub config: PathBuf,

    /// Log level: DEBUG, INFO, WARN or ERROR. Remembered for next time.
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Where log lines go. Overrides the config file.
    #[arg(long = "log-to", global = true, value_enum)]
    pub log_to: Option<LogDestination>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive AI chat. Lines are sent as prompts; /stop cancels the
    /// pending answer, /clear clears the transcript, /quit exits.
    Chat,
    /// Movie and TV show board controls.
    Board {
        #[arg(value_enum)]
        kind: BoardKind,
        #[command(subcommand)]
        action: BoardAction,
    },
}

impl Command {
    /// Preference key holding this command's log level.
    pub fn log_level_key(&self) -> &'static str {
        match self {
            Command::Chat => homenet_core::AI_LOG_LEVEL_KEY,
            Command::Board { kind, .. } => EntityKind::from(*kind).log_level_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoardKind {
    Movie,
    Tvshow,
}

impl From<BoardKind> for EntityKind {
    fn from(kind: BoardKind) -> Self {
        match kind {
            BoardKind::Movie => EntityKind::Movie,
            BoardKind::Tvshow => EntityKind::TvShow,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum BoardAction {
    /// Show every card and the count.
    List,
    /// Delete one entry after confirmation.
    Delete {
        id: u64,
        /// Skip the confirmation question.
        #[arg(long)]
        yes: bool,
    },
    /// Pick a random entry.
    Random,
    /// Add an entry.
    Add(AddArgs),
    /// Edit an entry; fields not given keep their current values.
    Edit(EditArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[command(flatten)]
    pub details: DetailArgs,
    /// Mark as available now (movies) or in an active season (TV shows).
    #[arg(long)]
    pub flag: bool,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: u64,
    #[arg(long)]
    pub title: Option<String>,
    #[command(flatten)]
    pub details: DetailArgs,
    /// Set the availability / active-season flag.
    #[arg(long, conflicts_with = "no_flag")]
    pub flag: bool,
    /// Clear the availability / active-season flag.
    #[arg(long)]
    pub no_flag: bool,
}

#[derive(Debug, Default, Args)]
pub struct DetailArgs {
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub streaming: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long = "imdb")]
    pub imdb_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{BoardAction, BoardKind, Cli, Command};

    #[test]
    fn parses_board_delete_with_global_flags() {
        let cli = Cli::try_parse_from([
            "homenet", "board", "movie", "delete", "7", "--yes", "--log", "DEBUG",
        ])
        .unwrap();
        assert_eq!(cli.log.as_deref(), Some("DEBUG"));
        match cli.command {
            Command::Board {
                kind: BoardKind::Movie,
                action: BoardAction::Delete { id: 7, yes: true },
            } => {}
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_flag_options_conflict() {
        let result = Cli::try_parse_from([
            "homenet", "board", "tvshow", "edit", "3", "--flag", "--no-flag",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn log_level_key_follows_command() {
        let chat = Cli::try_parse_from(["homenet", "chat"]).unwrap();
        assert_eq!(chat.command.log_level_key(), "ai_log_level");
        let board = Cli::try_parse_from(["homenet", "board", "tvshow", "list"]).unwrap();
        assert_eq!(board.command.log_level_key(), "tv_shows_board_log_level");
    }
}
