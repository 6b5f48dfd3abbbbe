pub mod dataset;
pub mod loader;

use crate::error::AnalysisError;
use itertools::Itertools;

/// Name of the index column in every exported table.
pub const TIME_COLUMN: &str = "time";

/// Number of taxis on the map, written into the infrastructure table next to the power meters.
/// It is not a power reading and never takes part in energy sums.
pub const AUXILIARY_COLUMN: &str = "taxis";

/// Infrastructure power categories reported by the simulator's power meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfrastructureCategory {
    Cloud,
    FogDynamic,
    FogStatic,
    Wan,
    Wifi,
}
impl InfrastructureCategory {
    pub const ALL: [InfrastructureCategory; 5] = [
        InfrastructureCategory::Cloud,
        InfrastructureCategory::FogDynamic,
        InfrastructureCategory::FogStatic,
        InfrastructureCategory::Wan,
        InfrastructureCategory::Wifi,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            InfrastructureCategory::Cloud => "cloud dynamic",
            InfrastructureCategory::FogDynamic => "fog dynamic",
            InfrastructureCategory::FogStatic => "fog static",
            InfrastructureCategory::Wan => "wan dynamic",
            InfrastructureCategory::Wifi => "wifi dynamic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InfrastructureCategory::Cloud => "Cloud",
            InfrastructureCategory::FogDynamic => "Fog dynamic",
            InfrastructureCategory::FogStatic => "Fog static",
            InfrastructureCategory::Wan => "WAN",
            InfrastructureCategory::Wifi => "WiFi",
        }
    }

    /// Column names of all five categories, in declaration order.
    pub fn columns() -> Vec<String> {
        Self::ALL.iter().map(|c| c.column().to_string()).collect()
    }
}

/// Power meters of the infrastructure table, in the order the simulator exports them.
pub const INFRASTRUCTURE_METERS: [&str; 4] = ["cloud", "fog", "wifi", "wan"];

/// Every power column of the infrastructure table, a static and a dynamic one per meter.
pub fn meter_columns() -> Vec<String> {
    INFRASTRUCTURE_METERS
        .iter()
        .flat_map(|meter| [format!("{} static", meter), format!("{} dynamic", meter)])
        .collect()
}

/// The two applications deployed in the smart city scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Application {
    Cctv,
    Stm,
}
impl Application {
    pub const ALL: [Application; 2] = [Application::Cctv, Application::Stm];

    pub fn static_column(&self) -> &'static str {
        match self {
            Application::Cctv => "cctv static",
            Application::Stm => "stm static",
        }
    }

    pub fn dynamic_column(&self) -> &'static str {
        match self {
            Application::Cctv => "cctv dynamic",
            Application::Stm => "stm dynamic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Application::Cctv => "CCTV",
            Application::Stm => "STM",
        }
    }

    /// Short lowercase name, used for file names and palette keys.
    pub fn key(&self) -> &'static str {
        match self {
            Application::Cctv => "cctv",
            Application::Stm => "stm",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<f64>,
}

/// A table of numeric columns sharing a single time index (seconds since simulation start).
///
/// All columns have the same length as the index. Column order is the order in which the
/// columns were added, which for loaded tables is the order of the CSV header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeTable {
    index: Vec<f64>,
    columns: Vec<Column>,
}
impl TimeTable {
    pub fn new(index: Vec<f64>) -> Self {
        Self {
            index,
            columns: vec![],
        }
    }

    /// Builds a table indexed `0, 1, .., len - 1`.
    pub fn with_len(len: usize) -> Self {
        Self::new((0..len).map(|t| t as f64).collect())
    }

    /// Adds a column, replacing any existing column with the same name.
    pub fn with_column(mut self, name: &str, values: Vec<f64>) -> Result<Self, AnalysisError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    pub fn insert_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), AnalysisError> {
        if values.len() != self.index.len() {
            return Err(AnalysisError::MalformedTable {
                reason: format!(
                    "column `{}` has {} values but the index has {}",
                    name,
                    values.len(),
                    self.index.len()
                ),
            });
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64], AnalysisError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| AnalysisError::missing_column(name))
    }

    /// Sum over time of a single column.
    pub fn column_sum(&self, name: &str) -> Result<f64, AnalysisError> {
        Ok(self.column(name)?.iter().sum())
    }

    /// Row-wise sum of the given columns. Every column must exist.
    pub fn sum_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f64>, AnalysisError> {
        let columns = names
            .iter()
            .map(|name| self.column(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sums = vec![0_f64; self.len()];
        for column in columns {
            for (acc, value) in sums.iter_mut().zip_eq(column.iter()) {
                *acc += value;
            }
        }
        Ok(sums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_is_reported_by_name() {
        let table = TimeTable::with_len(3);
        assert_eq!(
            table.column("fog static"),
            Err(AnalysisError::MissingColumn {
                column: "fog static".to_string()
            })
        );
    }

    #[test]
    fn columns_must_match_the_index_length() {
        let res = TimeTable::with_len(3).with_column("cloud dynamic", vec![1.0, 2.0]);
        assert!(matches!(res, Err(AnalysisError::MalformedTable { .. })));
    }

    #[test]
    fn sum_columns_adds_rows_pointwise() -> anyhow::Result<()> {
        let table = TimeTable::with_len(3)
            .with_column("a", vec![1.0, 2.0, 3.0])?
            .with_column("b", vec![10.0, 20.0, 30.0])?
            .with_column("c", vec![100.0, 100.0, 100.0])?;

        assert_eq!(table.sum_columns(&["a", "b"])?, vec![11.0, 22.0, 33.0]);
        assert_eq!(table.column_sum("c")?, 300.0);
        assert!(table.sum_columns(&["a", "d"]).is_err());
        Ok(())
    }

    #[test]
    fn inserting_an_existing_column_replaces_it() -> anyhow::Result<()> {
        let table = TimeTable::with_len(2)
            .with_column("a", vec![1.0, 1.0])?
            .with_column("a", vec![2.0, 2.0])?;

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(table.column("a")?, &[2.0, 2.0]);
        Ok(())
    }
}
