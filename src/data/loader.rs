use crate::{
    config::Catalogue,
    data::{
        dataset::{ExperimentData, ExperimentDataset},
        TimeTable, TIME_COLUMN,
    },
    error::AnalysisError,
};
use anyhow::Context;
use itertools::Itertools;
use std::{io::Read, path::Path};
use tracing::{debug, info};

pub const INFRASTRUCTURE_FILE: &str = "infrastructure.csv";
pub const APPLICATIONS_FILE: &str = "applications.csv";

/// Reads a CSV table with a header row. The `time` column becomes the index, every other column
/// must be numeric.
pub fn read_table<R: Read>(reader: R) -> anyhow::Result<TimeTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if let Some(name) = headers.iter().duplicates().next() {
        return Err(AnalysisError::MalformedTable {
            reason: format!("column `{}` appears more than once in header", name),
        }
        .into());
    }
    let time_pos = headers
        .iter()
        .position(|h| h == TIME_COLUMN)
        .ok_or_else(|| AnalysisError::MalformedTable {
            reason: format!("no `{}` column in header", TIME_COLUMN),
        })?;

    let mut index = vec![];
    let mut columns: Vec<Vec<f64>> = vec![vec![]; headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        for (pos, field) in record.iter().enumerate() {
            let value = field
                .parse::<f64>()
                .map_err(|_| AnalysisError::MalformedTable {
                    reason: format!(
                        "value `{}` in column `{}` on row {} is not a number",
                        field,
                        &headers[pos],
                        line + 1
                    ),
                })?;

            if pos == time_pos {
                index.push(value);
            } else {
                columns[pos].push(value);
            }
        }
    }

    let mut table = TimeTable::new(index);
    for (pos, (name, values)) in headers.iter().zip(columns).enumerate() {
        if pos != time_pos {
            table.insert_column(name, values)?;
        }
    }

    Ok(table)
}

pub fn read_table_from_path(path: &Path) -> anyhow::Result<TimeTable> {
    let file = std::fs::File::open(path).context(format!("Unable to open {}", path.display()))?;
    read_table(file).context(format!("Unable to read table {}", path.display()))
}

/// Loads both tables of the experiment stored in `<results_dir>/<experiment_id>`.
pub fn load_experiment(results_dir: &Path, experiment_id: &str) -> anyhow::Result<ExperimentData> {
    let dir = results_dir.join(experiment_id);
    let infrastructure = read_table_from_path(&dir.join(INFRASTRUCTURE_FILE))?;
    let applications = read_table_from_path(&dir.join(APPLICATIONS_FILE))?;
    debug!(
        "Loaded experiment {} ({} infrastructure rows, {} application rows)",
        experiment_id,
        infrastructure.len(),
        applications.len()
    );

    Ok(ExperimentData::new(infrastructure, applications))
}

/// Loads every experiment in the catalogue, one after another, stopping at the first failure.
pub fn load_catalogue(results_dir: &Path, catalogue: &Catalogue) -> anyhow::Result<ExperimentDataset> {
    info!(
        "Loading {} experiments from {}",
        catalogue.len(),
        results_dir.display()
    );

    let mut dataset = ExperimentDataset::new();
    for experiment in catalogue.iter() {
        let data = load_experiment(results_dir, &experiment.id)
            .context(format!("Failed to load experiment {}", experiment.id))?;
        dataset.insert(&experiment.id, data);
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_column_becomes_the_index() -> anyhow::Result<()> {
        let csv = "time,taxis,cloud static,cloud dynamic\n0,3,0.0,10.5\n1,4,0.0,11.5\n2,4,0.0,12.0\n";
        let table = read_table(csv.as_bytes())?;

        assert_eq!(table.index(), &[0.0, 1.0, 2.0]);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["taxis", "cloud static", "cloud dynamic"]
        );
        assert_eq!(table.column("cloud dynamic")?, &[10.5, 11.5, 12.0]);
        assert!(!table.has_column("time"));
        Ok(())
    }

    #[test]
    fn tables_without_time_column_are_rejected() {
        let err = read_table("cloud dynamic\n1.0\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::MalformedTable { .. })
        ));
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let err = read_table("time,cloud dynamic\n0,lots\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("lots"));
    }

    #[test]
    fn repeated_header_names_are_rejected() {
        let csv = "time,taxis,fog static,fog static\n0,3,1.0,2.0\n";
        let err = read_table(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AnalysisError>(),
            Some(&AnalysisError::MalformedTable {
                reason: "column `fog static` appears more than once in header".to_string()
            })
        );
    }

    #[test]
    fn missing_experiment_directory_fails() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(load_experiment(dir.path(), "fog_1").is_err());
        Ok(())
    }
}
