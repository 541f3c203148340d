//! Jsonbind CLI - command-line access to jsonbind path resolution
//!
//! This is the main entry point for the `jsonbind` binary, providing commands
//! for resolving candidate paths in JSON documents and inspecting the read
//! options a configuration produces.

mod cli;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use error::Result;
use jsonbind_core::Environment;
use logging::LoggingConfig;
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    if let Err(e) = init_logging(&cli) {
        eprintln!("{}", error::format_error(&e, cli.use_color()));
    }

    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
fn run(cli: Cli) -> Result<()> {
    let options = handlers::load_options(cli.config.as_deref())?;
    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::info!(
        verbosity = cli.verbosity_level(),
        fail_fast = options.fail_fast,
        max_depth = options.max_depth,
        "Executing command"
    );

    match cli.command {
        Commands::Lookup(args) => handlers::handle_lookup(args, &Environment::new(options), &mut output),
        Commands::Config => handlers::handle_config(&options, cli.config.as_deref(), &mut output),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_env();

    // Quiet mode only logs errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
