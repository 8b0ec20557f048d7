//! sqlvet command-line interface

mod check;
mod codes;
mod output;

use clap::{Parser, Subcommand};
use output::{ColorMode, OutputFormat};
use std::path::PathBuf;

/// sqlvet command-line tool
#[derive(Parser)]
#[command(name = "sqlvet")]
#[command(author, version, about = "Semantic validation of parsed SQL query trees", long_about = None)]
struct Cli {
    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate JSON-encoded query trees against a catalog
    Check {
        /// Query tree files (JSON)
        files: Vec<PathBuf>,

        /// Catalog file (JSON)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Validation configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Strict mode (warnings as errors)
        #[arg(short, long)]
        strict: bool,
    },

    /// List diagnostic codes
    Codes,

    /// Describe one diagnostic code
    Explain {
        /// Code name (COLUMN_NOT_FOUND) or id (SQLV0100)
        code: String,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(cli.color);
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            files,
            catalog,
            config,
            format,
            strict,
        } => {
            let config = check::CheckConfig {
                catalog,
                config,
                files,
                format,
                strict,
            };
            check::check(config)
        }

        Commands::Codes => {
            codes::list();
            Ok(true)
        }

        Commands::Explain { code } => codes::explain(&code).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}
