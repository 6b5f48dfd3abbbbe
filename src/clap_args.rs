use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Verbose mode (-v, --verbose)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example configuration file
    Init {
        #[arg(short, long, default_value = "leaf.toml")]
        path: PathBuf,
    },

    /// Print the energy summary table of every experiment
    Summary {
        /// Directory holding one sub-directory per experiment
        #[arg(short, long)]
        results_dir: Option<PathBuf>,
    },

    /// Print the summary table and write all charts
    Plot {
        /// Directory holding one sub-directory per experiment
        #[arg(short, long)]
        results_dir: Option<PathBuf>,

        /// Experiments to draw in the smoothed comparison chart
        #[arg(long, num_args = 1..)]
        compare: Option<Vec<String>>,

        /// Also draw the smoothed comparison in the terminal
        #[arg(long)]
        preview: bool,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
