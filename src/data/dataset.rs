use crate::{data::TimeTable, error::AnalysisError};
use std::collections::HashMap;

/// The two tables exported by a single simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentData {
    pub infrastructure: TimeTable,
    pub applications: TimeTable,
}
impl ExperimentData {
    pub fn new(infrastructure: TimeTable, applications: TimeTable) -> Self {
        Self {
            infrastructure,
            applications,
        }
    }
}

/// Loaded experiments keyed by experiment id.
///
/// The map is unordered on purpose; anything that needs a stable ordering walks the catalogue
/// and looks experiments up here.
#[derive(Debug, Default)]
pub struct ExperimentDataset {
    data: HashMap<String, ExperimentData>,
}
impl ExperimentDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, experiment_id: &str, data: ExperimentData) {
        self.data.insert(experiment_id.to_string(), data);
    }

    pub fn get(&self, experiment_id: &str) -> Result<&ExperimentData, AnalysisError> {
        self.data
            .get(experiment_id)
            .ok_or_else(|| AnalysisError::missing_experiment(experiment_id))
    }

    pub fn contains(&self, experiment_id: &str) -> bool {
        self.data.contains_key(experiment_id)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
impl FromIterator<(String, ExperimentData)> for ExperimentDataset {
    fn from_iter<T: IntoIterator<Item = (String, ExperimentData)>>(iter: T) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_experiments_are_reported() {
        let dataset = ExperimentDataset::new();
        assert_eq!(
            dataset.get("fog_4"),
            Err(AnalysisError::MissingExperiment {
                experiment: "fog_4".to_string()
            })
        );
    }

    #[test]
    fn experiments_can_be_looked_up_by_id() {
        let mut dataset = ExperimentDataset::new();
        dataset.insert(
            "cloud_only",
            ExperimentData::new(TimeTable::with_len(2), TimeTable::with_len(2)),
        );

        assert!(dataset.contains("cloud_only"));
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get("cloud_only").map(|d| d.infrastructure.len()), Ok(2));
    }
}
