pub mod charts;
pub mod clap_args;
pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod smoothing;
pub mod summary;

use comparison::{ComparisonMatrix, SmoothedSeries};
use config::{Catalogue, Config};
use data::dataset::ExperimentDataset;
use error::AnalysisError;
use smoothing::SavitzkyGolay;
use std::path::Path;
use summary::SummaryRow;
use tracing::info;

/// Everything derived from the loaded experiments, ready to be printed and drawn.
#[derive(Debug)]
pub struct Analysis {
    pub summary: Vec<SummaryRow>,
    pub matrix: ComparisonMatrix,
    pub comparison: Vec<SmoothedSeries>,
}

/// Runs the aggregation pipeline over already loaded experiments.
///
/// `compare` lists the experiments of the smoothed comparison.
pub fn analyse(
    config: &Config,
    catalogue: &Catalogue,
    dataset: &ExperimentDataset,
    compare: &[String],
) -> Result<Analysis, AnalysisError> {
    let summary = summary::summary_rows(catalogue, dataset)?;
    let matrix = ComparisonMatrix::build(catalogue, dataset)?;

    let filter = SavitzkyGolay::from_config(&config.smoothing)?;
    let comparison = comparison::smoothed_comparison(
        catalogue,
        dataset,
        compare,
        &config.comparison.columns,
        &filter,
    )?;

    Ok(Analysis {
        summary,
        matrix,
        comparison,
    })
}

fn load(config: &Config, results_dir: &Path) -> anyhow::Result<(Catalogue, ExperimentDataset)> {
    let catalogue = config.catalogue()?;
    let dataset = data::loader::load_catalogue(results_dir, &catalogue)?;
    Ok((catalogue, dataset))
}

/// Loads every experiment and prints the summary table.
pub fn print_summary(config: &Config, results_dir: &Path) -> anyhow::Result<()> {
    let (catalogue, dataset) = load(config, results_dir)?;
    let rows = summary::summary_rows(&catalogue, &dataset)?;

    println!("Experiment results (Wh):");
    println!("{}", summary::render_summary(&rows));
    Ok(())
}

/// Loads every experiment, prints the summary table and writes all charts into `results_dir`.
pub fn plot(
    config: &Config,
    results_dir: &Path,
    compare: &[String],
    preview: bool,
) -> anyhow::Result<Analysis> {
    // parse the palette before any work is done
    let colors = charts::Colors::try_from_palette(&config.colors)?;

    let (catalogue, dataset) = load(config, results_dir)?;
    let analysis = analyse(config, &catalogue, &dataset, compare)?;

    println!("Experiment results (Wh):");
    println!("{}", summary::render_summary(&analysis.summary));

    let mut experiments = vec![];
    for exp in catalogue.iter() {
        experiments.push((exp.id.as_str(), dataset.get(&exp.id)?));
    }
    charts::write_all(
        results_dir,
        &experiments,
        &analysis.matrix,
        &analysis.comparison,
        &config.comparison.output,
        &colors,
    )?;

    if preview {
        charts::preview_comparison(&analysis.comparison);
    }

    info!("Wrote charts to {}", results_dir.display());
    Ok(analysis)
}
