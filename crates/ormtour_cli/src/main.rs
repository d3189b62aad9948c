//! CLI entry point for the account tour.
//!
//! # Responsibility
//! - Open the engine named by `--url`, run the tour, print what it saw.
//! - Keep output deterministic for quick local sanity checks.

use clap::Parser;
use ormtour_core::{
    core_version, default_log_level, flush_logs, init_logging, open_engine, run_tour,
    EngineConfig, LogConfig, LogLevel,
};
use std::path::PathBuf;

mod render;

#[derive(Debug, Parser)]
#[command(name = "ormtour", version = core_version())]
#[command(about = "Walk through users and addresses stored in SQLite", long_about = None)]
struct Cli {
    /// Engine URL: sqlite:// (memory) or sqlite:///<path>
    #[arg(long, default_value = "sqlite://")]
    url: String,

    /// Log every SQL statement, mirrored to stderr
    #[arg(long)]
    echo: bool,

    /// Print the report as JSON instead of debug representations
    #[arg(long)]
    json: bool,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Absolute directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let result = execute(cli);
    flush_logs();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let log_config = LogConfig {
        level: cli.log_level.unwrap_or_else(default_log_level),
        log_dir: cli
            .log_dir
            .unwrap_or_else(|| std::env::temp_dir().join("ormtour-logs")),
        mirror_to_stderr: cli.echo,
    };
    init_logging(&log_config)?;

    let mut conn = open_engine(&EngineConfig {
        url: cli.url,
        echo: cli.echo,
    })?;
    let report = run_tour(&mut conn)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::render_report(&report));
    }

    log::info!("event=cli_exit module=cli status=ok");
    Ok(())
}
