use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bikeshare::Config;
use bikeshare::app::{OneShot, Session, TerminalPrompter};

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }
    if let Some(page_size) = cli.page_size {
        config = config.with_page_size(page_size);
    }
    config.validate()?;

    let stdout = io::stdout();
    let mut session = Session::new(config, TerminalPrompter, stdout.lock());

    match cli.city {
        Some(city) => session
            .run_once(
                city,
                OneShot {
                    month: cli.month,
                    day: cli.day,
                    json: cli.json,
                    rows: cli.rows,
                },
            )
            .with_context(|| format!("analysis of {city} failed")),
        None => session.run().context("session ended with an error"),
    }
}
