mod aggregate;
mod commands;
mod config;
mod errors;
mod keys;
mod lifecycle;
mod ownership;
mod paths;
mod signer;
mod template;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dnssecctl")]
#[command(version)]
#[command(about = "DNSSEC zone signing orchestrator for BIND", long_about = None)]
struct Cli {
    /// Base directory where the signed zone files are stored
    #[arg(short = 'b', long, global = true)]
    base_dir: Option<PathBuf>,

    /// Re-sign interval for cron, in minutes
    #[arg(short = 'r', long, global = true)]
    resign_time: Option<u64>,

    /// Path to the dnssec-keygen tool
    #[arg(short = 'k', long, global = true)]
    dnssec_keygen: Option<String>,

    /// Path to the dnssec-signzone tool
    #[arg(short = 's', long, global = true)]
    dnssec_signzone: Option<String>,

    /// Path to the rndc tool
    #[arg(short = 'c', long, global = true)]
    rndc: Option<String>,

    /// Owner of the generated files
    #[arg(short = 'u', long, global = true)]
    user: Option<String>,

    /// Group of the generated files
    #[arg(short = 'g', long, global = true)]
    group: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize and sign zones from unsigned zone files
    Init {
        /// Unsigned source zone files, one per domain
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Re-sign zones whose signed file is older than the resign interval
    Cron,

    /// Freeze a zone, open its signed file in $EDITOR, then re-sign and thaw
    Edit {
        #[arg(required = true)]
        zones: Vec<String>,
    },

    /// Remove domains and all their artifacts
    Remove {
        #[arg(required = true)]
        zones: Vec<String>,
    },

    /// Freeze zones for local editing of the signed files
    Freeze {
        #[arg(required = true)]
        zones: Vec<String>,
    },

    /// Thaw zones, re-signing the ones that changed while frozen
    Thaw {
        #[arg(required = true)]
        zones: Vec<String>,
    },
}

impl Cli {
    /// CLI flags take precedence over the config file.
    fn apply_to(&self, config: &mut Config) {
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = base_dir.clone();
        }
        if let Some(resign_time) = self.resign_time {
            config.resign_time = resign_time;
        }
        if let Some(dnssec_keygen) = &self.dnssec_keygen {
            config.dnssec_keygen = dnssec_keygen.clone();
        }
        if let Some(dnssec_signzone) = &self.dnssec_signzone {
            config.dnssec_signzone = dnssec_signzone.clone();
        }
        if let Some(rndc) = &self.rndc {
            config.rndc = rndc.clone();
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if let Some(group) = &self.group {
            config.group = group.clone();
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.apply_to(&mut config);

    match cli.command {
        Commands::Init { files } => commands::init::execute(&config, files)?,
        Commands::Cron => commands::cron::execute(&config)?,
        Commands::Edit { zones } => commands::edit::execute(&config, zones)?,
        Commands::Remove { zones } => commands::remove::execute(&config, zones)?,
        Commands::Freeze { zones } => commands::freeze::execute(&config, zones)?,
        Commands::Thaw { zones } => commands::thaw::execute(&config, zones)?,
    }

    Ok(())
}
