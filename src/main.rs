//! `jar-sizer` — walk a Maven repository and record the on-disk size of every artifact.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]) and apply CLI overrides.
//! 3. Open the sink: MySQL from the `MYSQL_*` environment ([`sink::mysql`]), or a dry run.
//! 4. Walk ([`walker`]) → classify ([`classifier`]) → dispatch ([`dispatcher`]),
//!    wired together by [`collector`].
//! 5. Render the report ([`report`]).
//! 6. Exit `0` (clean) or `1` (at least one artifact could not be recorded).

mod classifier;
mod cli;
mod collector;
mod config;
mod dispatcher;
mod error;
mod models;
mod progress;
mod report;
mod sink;
mod walker;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use classifier::Classifier;
use cli::{Cli, CollectArgs, Command, ReportFormat};
use collector::Collector;
use config::{load_config, Config, DatabaseConfig};
use dispatcher::Dispatcher;
use error::ConfigError;
use progress::{ProgressMode, ProgressReporter};
use sink::dry_run::DryRunSink;
use sink::mysql::MySqlSink;
use walker::Walker;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let Command::Collect(args) = cli.command;

    init_tracing(args.verbose, args.quiet);

    let cwd = std::env::current_dir()?;
    let mut config = load_config(&cwd, args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    if !args.root.is_dir() {
        return Err(ConfigError::InvalidRoot(args.root.clone()).into());
    }

    let progress = if args.quiet || args.report == ReportFormat::Json {
        ProgressMode::Silent
    } else {
        args.progress.into()
    };
    let reporter = ProgressReporter::new(
        progress,
        Duration::from_millis(config.scan.progress_interval_ms),
    )
    .with_noun(noun(&config.scan.suffix));
    let dispatcher = Dispatcher::new(config.scan.concurrency).with_reporter(reporter);
    let classifier = Classifier::new(config.scan.suffix.clone(), config.scan.anchor.clone());

    // The sink is opened before the walker lists anything, so missing
    // credentials fail the run up front.
    let summary = if args.dry_run {
        let collector =
            Collector::new(classifier, dispatcher, DryRunSink).strict(config.scan.strict);
        collector.run(&args.root, walker(&args, &config)).await
    } else {
        let db = DatabaseConfig::from_env(&config.database)?;
        let sink = MySqlSink::connect(&db)
            .await
            .with_context(|| format!("failed to connect to {}:{}", db.host, db.port))?;
        let collector = Collector::new(classifier, dispatcher, sink).strict(config.scan.strict);
        let summary = collector.run(&args.root, walker(&args, &config)).await;
        collector.sink().close().await;
        summary
    };

    match args.report {
        ReportFormat::Terminal => report::terminal::render(&summary, args.verbose, args.quiet)?,
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    if !summary.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("jar_sizer=debug,warn")
        } else if quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("jar_sizer=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}

fn apply_overrides(config: &mut Config, args: &CollectArgs) {
    let scan = &mut config.scan;
    if let Some(k) = args.concurrency {
        scan.concurrency = k;
    }
    if let Some(seed) = args.seed {
        scan.seed = Some(seed);
    }
    if let Some(anchor) = &args.anchor {
        scan.anchor = anchor.clone();
    }
    if let Some(suffix) = &args.suffix {
        scan.suffix = suffix.clone();
    }
    if let Some(ms) = args.interval_ms {
        scan.progress_interval_ms = ms;
    }
    scan.strict |= args.strict;

    if let Some(table) = &args.table {
        config.database.table = table.clone();
    }
}

fn walker(args: &CollectArgs, config: &Config) -> Walker {
    match config.scan.seed {
        Some(seed) => Walker::with_seed(&args.root, seed),
        None => Walker::new(&args.root),
    }
}

/// `.jar` → `jars`, for progress lines.
fn noun(suffix: &str) -> String {
    let ext = suffix.trim_start_matches('.');
    if ext.is_empty() {
        "files".to_string()
    } else {
        format!("{}s", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noun() {
        assert_eq!(noun(".jar"), "jars");
        assert_eq!(noun("war"), "wars");
        assert_eq!(noun(""), "files");
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "jar-sizer", "collect", "repo", "-j", "3", "--anchor", "maven2", "--table", "libs",
            "--strict",
        ])
        .unwrap();
        let Command::Collect(args) = cli.command;

        let mut config = Config::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.scan.concurrency, 3);
        assert_eq!(config.scan.anchor, "maven2");
        assert_eq!(config.scan.suffix, ".jar");
        assert_eq!(config.database.table, "libs");
        assert!(config.scan.strict);
    }
}
