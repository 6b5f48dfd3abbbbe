use anyhow::Context;
use colored::Colorize;
use leaf_analysis::{
    clap_args::{self, Commands},
    config::Config,
};
use tracing::{info, subscriber::set_global_default, Subscriber};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = clap_args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    init_subscriber(get_subscriber(level.to_string()))?;

    let config = match &args.config {
        Some(path) => Config::try_from_path(path)?,
        None => Config::default(),
    };

    match args.command {
        Commands::Init { path } => {
            Config::write_example_to_file(&path)?;
            println!(
                "{} {}",
                "Wrote example configuration to".green(),
                path.display()
            );
        }

        Commands::Summary { results_dir } => {
            let results_dir = results_dir.unwrap_or_else(|| config.results_dir.clone());
            leaf_analysis::print_summary(&config, &results_dir)?;
        }

        Commands::Plot {
            results_dir,
            compare,
            preview,
        } => {
            let results_dir = results_dir.unwrap_or_else(|| config.results_dir.clone());
            let compare = compare.unwrap_or_else(|| config.comparison.experiments.clone());
            leaf_analysis::plot(&config, &results_dir, &compare, preview)?;
            info!("Done");
        }
    }

    Ok(())
}

fn get_subscriber(env_filter: String) -> impl Subscriber + Sync + Send {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .finish()
}

fn init_subscriber(subscriber: impl Subscriber + Sync + Send) -> anyhow::Result<()> {
    set_global_default(subscriber).context("Failed to set subscriber")
}
