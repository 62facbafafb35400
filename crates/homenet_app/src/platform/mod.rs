//! Terminal platform: wires the CLI, config, logging, engine and core together.
pub mod app;
pub mod effects;
pub mod logging;
pub mod persistence;
pub mod render;

use std::io;

use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn, resolve_log_level, LogLevel};
use homenet_engine::EngineHandle;

use crate::cli::{Cli, Command};
use app::App;
use effects::EffectRunner;
use persistence::{load_config, PrefsStore, PREFS_FILENAME};

pub fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli.config)?;
    if let Some(base_url) = cli.base_url.clone() {
        config.base_url = base_url;
    }
    let destination = cli.log_to.unwrap_or(config.log_to);

    let key = cli.command.log_level_key();
    let mut prefs = PrefsStore::load(PREFS_FILENAME);
    let resolved = resolve_log_level(cli.log.as_deref(), prefs.log_level(key), LogLevel::Info);
    logging::initialize(destination, resolved.level.unwrap_or_default().to_filter());
    match resolved.persist_value() {
        Some(value) => {
            engine_info!("Log level set to: {}", value);
            prefs.set_log_level(key, value);
        }
        None => engine_warn!("Invalid log level: {}", resolved.raw),
    }

    engine_info!("Using server {}", config.base_url);
    let engine = EngineHandle::new(config.client_settings()).context("failed to start engine")?;
    let mut app = App::new(EffectRunner::new(engine));
    let mut stdout = io::stdout();

    let result = match cli.command {
        Command::Chat => app::run_chat(&mut app, app::spawn_stdin_reader(), &mut stdout),
        Command::Board { kind, action } => app::run_board(
            &mut app,
            kind.into(),
            action,
            &mut stdout,
            &mut app::confirm_on_terminal,
        ),
    };
    app.shutdown();
    result
}
