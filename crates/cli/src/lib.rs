pub mod commands;
pub mod viacep;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use expoquote_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing::Level;

use crate::commands::export::{Channel, ExportArgs};

#[derive(Debug, Parser)]
#[command(
    name = "expoquote",
    about = "Exhibition stand quote toolkit",
    long_about = "Inspect the stand catalog, summarize and search stored quotes, render quote documents, and look up postal codes.",
    after_help = "Examples:\n  expoquote catalog\n  expoquote summary --input quotes.json\n  expoquote export --input quotes.json --id MPB-000001 --channel chat --link"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to load instead of expoquote.toml")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, catalog integrity, and postal endpoint settings")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List catalog categories and items")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Aggregate dashboard figures over a quotes file")]
    Summary {
        #[arg(long, help = "JSON array of stored quotes")]
        input: PathBuf,
        #[arg(long, default_value_t = 5, help = "How many top cities and items to report")]
        top: usize,
    },
    #[command(about = "Search stored quotes by client, event, or id")]
    List {
        #[arg(long, help = "JSON array of stored quotes")]
        input: PathBuf,
        #[arg(long, help = "Case-insensitive text matched against client, event, and id")]
        search: Option<String>,
        #[arg(long, help = "Only quotes with this status (hot|warm|cold)")]
        status: Option<String>,
    },
    #[command(about = "Render one stored quote for a delivery channel")]
    Export {
        #[arg(long, help = "JSON array of stored quotes")]
        input: PathBuf,
        #[arg(long, help = "Quote id, e.g. MPB-000001")]
        id: String,
        #[arg(long, value_enum, default_value = "printable")]
        channel: Channel,
        #[arg(long, help = "Print a wa.me or mailto link instead of the text")]
        link: bool,
        #[arg(long, help = "Issue date printed on the document (YYYY-MM-DD), defaults to today")]
        issued_on: Option<NaiveDate>,
    },
    #[command(about = "Resolve a postal code to an address")]
    Lookup {
        #[arg(help = "Postal code; punctuation is ignored")]
        code: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    // Commands report config failures themselves; logging falls back to defaults.
    let logging_config = AppConfig::load(options.clone()).unwrap_or_default();
    init_logging(&logging_config);

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(&options, json) }
        }
        Command::Catalog { json } => commands::catalog::run(&options, json),
        Command::Summary { input, top } => commands::summary::run(&input, top),
        Command::List { input, search, status } => {
            commands::list::run(&input, search, status.as_deref())
        }
        Command::Export { input, id, channel, link, issued_on } => commands::export::run(
            &options,
            ExportArgs { input, id, channel, link, issued_on },
        ),
        Command::Lookup { code } => commands::lookup::run(&options, &code),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber. Logs go to stderr so stdout stays parseable.
pub fn init_logging(config: &AppConfig) {
    let level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);

    // A second install (e.g. from tests) keeps the first subscriber.
    let _ = match config.logging.format {
        LogFormat::Compact => subscriber.compact().try_init(),
        LogFormat::Pretty => subscriber.pretty().try_init(),
        LogFormat::Json => subscriber.json().try_init(),
    };
}
