use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reverie::cli::commands::ai::EntryInput;
use reverie::constants::input::DEFAULT_EXCERPT_CHARS;

/// Validate an output format argument
fn parse_format(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "text" | "json" => Ok(s.to_lowercase()),
        _ => Err(format!("Invalid format '{}'. Valid values: text, json", s)),
    }
}

#[derive(Parser)]
#[command(name = "reverie")]
#[command(
    version,
    about = "Reflection questions and entry enhancement for your journal"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        short,
        global = true,
        help = "Use this config file instead of the global/project chain"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate reflection questions from the end of an entry
    Questions {
        #[arg(help = "Entry text (reads --file or stdin when omitted)")]
        text: Option<String>,
        #[arg(long, help = "Read the entry from a file")]
        file: Option<PathBuf>,
        #[arg(
            long,
            default_value_t = DEFAULT_EXCERPT_CHARS,
            help = "Characters from the end of the entry sent as the excerpt"
        )]
        max_excerpt_chars: usize,
        #[arg(short = 'f', long, default_value = "text", value_parser = parse_format, help = "Output format: text, json")]
        format: String,
    },

    /// Rewrite an entry for coherence, keeping its voice
    Enhance {
        #[arg(help = "Entry text (reads --file or stdin when omitted)")]
        text: Option<String>,
        #[arg(long, help = "Read the entry from a file")]
        file: Option<PathBuf>,
        #[arg(long, help = "Writing style (natural, concise, descriptive, reflective)")]
        style: Option<String>,
    },

    /// Work an answer to a reflection question into an entry
    InsertAnswer {
        #[arg(long, help = "The question that was asked")]
        question: String,
        #[arg(long, help = "The writer's answer")]
        answer: String,
        #[arg(help = "Entry text (reads --file or stdin when omitted)")]
        text: Option<String>,
        #[arg(long, help = "Read the entry from a file")]
        file: Option<PathBuf>,
    },

    /// Enhance an entry, then generate questions about it
    Reflect {
        #[arg(help = "Entry text (reads --file or stdin when omitted)")]
        text: Option<String>,
        #[arg(long, help = "Read the entry from a file")]
        file: Option<PathBuf>,
        #[arg(long, help = "Writing style (natural, concise, descriptive, reflective)")]
        style: Option<String>,
        #[arg(short = 'f', long, default_value = "text", value_parser = parse_format, help = "Output format: text, json")]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = parse_format,
            help = "Output format: text (TOML), json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write the default configuration, templates included
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
    /// Set the custom instructions prepended to every prompt (empty clears)
    Instructions {
        text: String,
        #[arg(long, short, help = "Store in the global config")]
        global: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mReverie encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reverie::cli::Output::new().error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    // Logs go to stderr so generated text on stdout can be piped
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Questions {
            text,
            file,
            max_excerpt_chars,
            format,
        } => {
            reverie::cli::commands::ai::questions(
                EntryInput { text, file },
                max_excerpt_chars,
                &format,
                config_path,
            )?;
        }
        Commands::Enhance { text, file, style } => {
            reverie::cli::commands::ai::enhance(
                EntryInput { text, file },
                style.as_deref(),
                config_path,
            )?;
        }
        Commands::InsertAnswer {
            question,
            answer,
            text,
            file,
        } => {
            reverie::cli::commands::ai::insert_answer(
                EntryInput { text, file },
                &question,
                &answer,
                config_path,
            )?;
        }
        Commands::Reflect {
            text,
            file,
            style,
            format,
        } => {
            reverie::cli::commands::ai::reflect(
                EntryInput { text, file },
                style.as_deref(),
                &format,
                config_path,
            )?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                reverie::cli::commands::config::show(&format, config_path)?;
            }
            ConfigAction::Path => {
                reverie::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    reverie::cli::commands::config::init_global(force)?;
                } else {
                    reverie::cli::commands::config::init_project(force)?;
                }
            }
            ConfigAction::Instructions { text, global } => {
                reverie::cli::commands::config::instructions(&text, global)?;
            }
        },
    }

    Ok(())
}
