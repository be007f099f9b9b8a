//! traitclass - CLI

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use traitclass::util::config::{load_user_config, UserConfig};
use traitclass::util::logger::{self, LogLevel};
use traitclass::{load_model, NAME, VERSION};

/// Inspect trait compositions declared in schema files
#[derive(Parser, Debug)]
#[command(name = "traitclass")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the composition report for every host in a schema
    Inspect {
        /// Schema file (.ron or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Fail when any host leaves required operations unimplemented
    Check {
        /// Schema file (.ron or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print one host's linearization
    Mro {
        /// Schema file (.ron or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Host type name
        #[arg(value_name = "HOST")]
        host: String,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = load_user_config().unwrap_or_else(|e| {
        eprintln!("[WARN] {}; using defaults", e);
        UserConfig::default()
    });

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log.effective_level()
    };
    logger::init_with_level(level);

    let default_format = config.schema.default_format;
    match args.command {
        Commands::Inspect { file, json } => {
            let model = load_model(&file, default_format)?;
            let report = model.report(config.report.show_private);
            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render(config.report.colors));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { file } => {
            let model = load_model(&file, default_format)?;
            let report = model.report(false);
            let mut failed = false;
            for host in report.abstract_hosts() {
                warn!(
                    "{} leaves required operations unimplemented: {}",
                    host.name,
                    host.required.join(", ")
                );
                failed = true;
            }
            if failed {
                return Ok(ExitCode::FAILURE);
            }
            info!("{}: {} hosts OK", file.display(), report.hosts.len());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Mro { file, host } => {
            let model = load_model(&file, default_format)?;
            let host = model.host(&host)?;
            let composite = host.trait_class();
            println!("{} -> {}", composite.name(), composite.mro_names().join(" -> "));
            Ok(ExitCode::SUCCESS)
        }
    }
}
