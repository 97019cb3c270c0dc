//! Binary entrypoint for the dmjournal CLI.
//!
//! Commands:
//! - `start` - run the bot on the console transport (stdin in, stdout out)
//! - `init` - write a starter `config.toml`
//! - `status` - print a JSON summary of the journal database
//!
//! See the library crate docs for module-level details: `dmjournal::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::sync::Arc;
use tokio::sync::mpsc;

use dmjournal::bot::JournalBot;
use dmjournal::config::Config;
use dmjournal::storage::SledJournalStore;
use dmjournal::transport::{console, ChannelSink};

#[derive(Parser)]
#[command(name = "dmjournal")]
#[command(about = "A personal journal bot driven through direct messages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console transport
    Start,
    /// Write a default configuration file
    Init,
    /// Show journal database statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            let config = Config::load(&cli.config).await?;
            init_logging(Some(&config), cli.verbose);
            info!("Starting dmjournal v{}", env!("CARGO_PKG_VERSION"));

            let db_path = config.storage.journal_db_path();
            let store = Arc::new(SledJournalStore::open(&db_path)?);
            info!("Journal database at {}", db_path.display());

            let (sink, outgoing) = ChannelSink::pair();
            let (events_tx, events_rx) = mpsc::unbounded_channel();
            let writer = console::spawn_writer(outgoing);
            console::spawn_reader(config.console.default_user.clone(), events_tx);

            let mut bot = JournalBot::new(config, store, Arc::new(sink));
            bot.run(events_rx).await?;
            // the bot owned the last sink handle and the store; dropping it flushes
            // sled and lets the writer drain what is left
            drop(bot);
            let clean = console::join_writer(writer).await;
            // stdin may still be parked in a blocking read after Ctrl-C
            std::process::exit(if clean { 0 } else { 1 });
        }
        Commands::Init => {
            init_logging(None, cli.verbose);
            info!("Initializing new dmjournal configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(Some(&config), cli.verbose);
            let db_path = config.storage.journal_db_path();
            let store = SledJournalStore::open(&db_path)?;
            let stats = store.statistics()?;
            let payload = serde_json::json!({
                "bot": config.bot.name,
                "command_prefix": config.bot.command_prefix,
                "database": db_path.display().to_string(),
                "total_entries": stats.total_entries,
                "total_users": stats.total_users,
            });
            println!("{}", payload);
        }
    }

    Ok(())
}

fn init_logging(config: Option<&Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity raises the configured level, never lowers it
    let configured = config
        .map(|c| c.logging.level_filter())
        .unwrap_or(log::LevelFilter::Info);
    let level = match verbosity {
        0 => configured,
        1 => configured.max(log::LevelFilter::Debug),
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    let log_file = config
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    match log_file {
        Some(f) => {
            let file = std::sync::Mutex::new(f);
            // Console output is for interactive use only; when stdout is redirected the
            // file is the single log destination.
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
