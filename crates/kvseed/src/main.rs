#![warn(clippy::pedantic, clippy::expect_used, clippy::unwrap_used)]

mod color;
mod error;
mod input;
mod logging;
mod output;
mod run;
mod settings;

use std::{
    io::{stdout, ErrorKind, IsTerminal, Write},
    pin::pin,
};

use clap::Parser;
use futures::StreamExt as _;
use kvseed_commands::command::Cli;
use kvseed_config::Config;
use kvseed_consul::Client;
use kvseed_core::{parse_str, KvStore, MemoryStore, ParsedLine};

use crate::{
    color::Theme,
    error::{KvseedError, KvseedResult},
    output::CommandOutput,
    settings::Settings,
};

async fn emit<S: KvStore>(
    store: &S,
    settings: &Settings,
    parsed: Vec<ParsedLine>,
    out: &mut dyn Write,
    theme: Option<&Theme>,
) -> KvseedResult<()> {
    let mut rows = pin!(run::run(store, &settings.prefix, parsed));

    while let Some(row) = rows.next().await {
        if settings.json {
            row.write_json(out)?;
        } else {
            row.write(out, theme)?;
        }

        match out.flush() {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(cli.config_file.as_ref()).map_err(KvseedError::Config)?;
    let settings = Settings::resolve(cli, loaded.config.clone())?;

    logging::setup_logging(settings.log_dir.clone(), settings.log_level);
    loaded.log();

    let source = input::read(&settings.input).await?;
    let parsed: Vec<ParsedLine> = parse_str(&source, &settings.prefix).collect();

    tracing::debug!(input = %settings.input, lines = parsed.len(), "Parsed properties");

    let stdout = stdout();
    let theme = stdout.is_terminal().then(Theme::default);
    let mut out = stdout.lock();

    if settings.dry_run {
        let store = MemoryStore::new();
        emit(&store, &settings, parsed, &mut out, theme.as_ref()).await?;

        let notice = CommandOutput::message("dry-run", "Dry run: nothing was written to the store");
        if settings.json {
            notice.write_json(&mut out).map_err(KvseedError::from)?;
        } else {
            notice.write(&mut out, theme.as_ref()).map_err(KvseedError::from)?;
        }
    } else {
        let client = Client::new(settings.client.clone()).map_err(KvseedError::from)?;
        emit(&client, &settings, parsed, &mut out, theme.as_ref()).await?;
    }

    Ok(())
}
