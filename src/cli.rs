use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "apiscan")]
#[command(about = "Find where a codebase calls into a known API surface, and how")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a project for calls into the catalogued API
    Scan {
        /// Project directory to analyze
        #[arg(short, long)]
        directory: PathBuf,

        /// API catalog file (.json or .txt)
        #[arg(short = 'f', long)]
        functions_file: PathBuf,

        /// Output directory for the report and summary
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Number of parallel workers (0 = half the available cores)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Show which module a catalogued name resolves to
    Resolve {
        /// API catalog file (.json or .txt)
        #[arg(short = 'f', long)]
        functions_file: PathBuf,

        /// Callable name to look up
        name: String,
    },
}

impl Cli {
    pub fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Scan { directory, functions_file, output_dir, workers } => {
                engine.scan(&directory, &functions_file, output_dir, workers)?;
                Ok(())
            }
            Commands::Resolve { functions_file, name } => {
                engine.resolve(&functions_file, &name)
            }
        }
    }
}
