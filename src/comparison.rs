use crate::{
    config::Catalogue,
    data::{dataset::ExperimentDataset, InfrastructureCategory, TimeTable, AUXILIARY_COLUMN},
    error::AnalysisError,
    metrics::{CategoryTotals, EnergyUnit},
    smoothing::SavitzkyGolay,
};
use itertools::izip;
use tracing::{debug, warn};

/// Energy per infrastructure category (kWh) for every experiment of the catalogue.
///
/// Sequences are parallel: the i-th element of every sequence belongs to the i-th experiment of
/// the catalogue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonMatrix {
    pub titles: Vec<String>,
    pub cloud: Vec<f64>,
    pub fog_dynamic: Vec<f64>,
    pub fog_static: Vec<f64>,
    pub wan: Vec<f64>,
    pub wifi: Vec<f64>,
    pub total: Vec<f64>,
}
impl ComparisonMatrix {
    /// Walks the catalogue in declared order and aggregates each experiment's infrastructure
    /// table in kilowatt-hours.
    pub fn build(
        catalogue: &Catalogue,
        dataset: &ExperimentDataset,
    ) -> Result<ComparisonMatrix, AnalysisError> {
        let mut matrix = ComparisonMatrix::default();

        for experiment in catalogue.iter() {
            let data = dataset.get(&experiment.id)?;
            let totals =
                CategoryTotals::from_table(&data.infrastructure, EnergyUnit::KilowattHours)?;
            debug!("{}: {:.3} kWh", experiment.title, totals.total());

            matrix.titles.push(experiment.title.clone());
            matrix.cloud.push(totals.cloud);
            matrix.fog_dynamic.push(totals.fog_dynamic);
            matrix.fog_static.push(totals.fog_static);
            matrix.wan.push(totals.wan);
            matrix.wifi.push(totals.wifi);
        }

        matrix.total = izip!(
            &matrix.cloud,
            &matrix.fog_static,
            &matrix.fog_dynamic,
            &matrix.wifi,
            &matrix.wan
        )
        .map(|(cloud, fog_static, fog_dynamic, wifi, wan)| {
            cloud + fog_static + fog_dynamic + wifi + wan
        })
        .collect();

        Ok(matrix)
    }

    pub fn series(&self, category: InfrastructureCategory) -> &[f64] {
        match category {
            InfrastructureCategory::Cloud => &self.cloud,
            InfrastructureCategory::FogDynamic => &self.fog_dynamic,
            InfrastructureCategory::FogStatic => &self.fog_static,
            InfrastructureCategory::Wan => &self.wan,
            InfrastructureCategory::Wifi => &self.wifi,
        }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Largest grand total, zero for an empty matrix.
    pub fn max_total(&self) -> f64 {
        self.total.iter().copied().fold(0.0, f64::max)
    }
}

/// Smoothed total power draw of one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedSeries {
    pub title: String,
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

/// Sums the given columns of an infrastructure table row by row.
///
/// Every column of the table except the taxi count must be listed, otherwise part of the
/// power draw would silently go missing from the series.
pub fn combined_series<S: AsRef<str>>(
    table: &TimeTable,
    columns: &[S],
) -> Result<Vec<f64>, AnalysisError> {
    if let Some(name) = table
        .column_names()
        .find(|name| *name != AUXILIARY_COLUMN && !columns.iter().any(|c| c.as_ref() == *name))
    {
        return Err(AnalysisError::UnexpectedColumn {
            column: name.to_string(),
        });
    }

    table.sum_columns(columns)
}

/// Builds the smoothed comparison series for the requested experiments.
///
/// Experiments come out in catalogue order. Requested ids that are not in the catalogue, or for
/// which no data was loaded, are skipped.
pub fn smoothed_comparison<S: AsRef<str>>(
    catalogue: &Catalogue,
    dataset: &ExperimentDataset,
    requested: &[S],
    columns: &[S],
    filter: &SavitzkyGolay,
) -> Result<Vec<SmoothedSeries>, AnalysisError> {
    for id in requested {
        let id = id.as_ref();
        if catalogue.find(id).is_none() {
            warn!("Experiment {} is not in the catalogue, skipping", id);
        } else if !dataset.contains(id) {
            warn!("No data loaded for experiment {}, skipping", id);
        }
    }

    catalogue
        .iter()
        .filter(|exp| requested.iter().any(|id| id.as_ref() == exp.id))
        .filter(|exp| dataset.contains(&exp.id))
        .map(|exp| -> Result<SmoothedSeries, AnalysisError> {
            let table = &dataset.get(&exp.id)?.infrastructure;
            let combined = combined_series(table, columns)?;
            let values = filter.apply(&combined)?;
            debug!("Smoothed {} samples of {}", values.len(), exp.title);

            Ok(SmoothedSeries {
                title: exp.title.clone(),
                time: table.index().to_vec(),
                values,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::ExperimentData;

    fn infrastructure(len: usize, cloud: f64) -> TimeTable {
        InfrastructureCategory::ALL
            .iter()
            .fold(TimeTable::with_len(len), |table, category| {
                let value = match category {
                    InfrastructureCategory::Cloud => cloud,
                    _ => 0.0,
                };
                table
                    .with_column(category.column(), vec![value; len])
                    .expect("column length matches")
            })
    }

    fn experiment(infrastructure: TimeTable) -> ExperimentData {
        let len = infrastructure.len();
        ExperimentData::new(infrastructure, TimeTable::with_len(len))
    }

    #[test]
    fn grand_total_follows_catalogue_order() -> anyhow::Result<()> {
        let catalogue = Catalogue::try_new(&["a", "b", "c"], &["A", "B", "C"])?;

        // inserted in reverse and with distinct totals so any reordering shows up
        let mut dataset = ExperimentDataset::new();
        dataset.insert("c", experiment(infrastructure(3600, 3000.0)));
        dataset.insert("b", experiment(infrastructure(3600, 2000.0)));
        dataset.insert("a", experiment(infrastructure(3600, 1000.0)));

        let matrix = ComparisonMatrix::build(&catalogue, &dataset)?;
        assert_eq!(matrix.titles, vec!["A", "B", "C"]);
        assert_eq!(matrix.cloud, vec![1.0, 2.0, 3.0]);
        assert_eq!(matrix.total, vec![1.0, 2.0, 3.0]);
        assert_eq!(matrix.max_total(), 3.0);
        Ok(())
    }

    #[test]
    fn two_experiments_of_two_kilowatt_hours() -> anyhow::Result<()> {
        let catalogue = Catalogue::try_new(&["fog_4", "fog_6"], &["Fog 4", "Fog 6"])?;
        let dataset = [
            ("fog_6".to_string(), experiment(infrastructure(3600, 2000.0))),
            ("fog_4".to_string(), experiment(infrastructure(3600, 2000.0))),
        ]
        .into_iter()
        .collect::<ExperimentDataset>();

        let matrix = ComparisonMatrix::build(&catalogue, &dataset)?;
        assert_eq!(matrix.total, vec![2.0, 2.0]);
        Ok(())
    }

    #[test]
    fn grand_total_is_the_sum_of_category_sequences() -> anyhow::Result<()> {
        let catalogue = Catalogue::try_new(&["x"], &["X"])?;
        let table = TimeTable::with_len(10)
            .with_column("cloud dynamic", vec![11.1; 10])?
            .with_column("fog dynamic", vec![22.2; 10])?
            .with_column("fog static", vec![33.3; 10])?
            .with_column("wan dynamic", vec![44.4; 10])?
            .with_column("wifi dynamic", vec![55.5; 10])?;
        let mut dataset = ExperimentDataset::new();
        dataset.insert("x", experiment(table));

        let matrix = ComparisonMatrix::build(&catalogue, &dataset)?;
        let sum: f64 = InfrastructureCategory::ALL
            .iter()
            .map(|c| matrix.series(*c)[0])
            .sum();
        assert!((matrix.total[0] - sum).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn missing_experiment_fails() -> anyhow::Result<()> {
        let catalogue = Catalogue::try_new(&["a", "b"], &["A", "B"])?;
        let mut dataset = ExperimentDataset::new();
        dataset.insert("a", experiment(infrastructure(10, 1.0)));

        assert_eq!(
            ComparisonMatrix::build(&catalogue, &dataset),
            Err(AnalysisError::MissingExperiment {
                experiment: "b".to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn combined_series_ignores_the_taxi_count() -> anyhow::Result<()> {
        let table = infrastructure(4, 10.0)
            .with_column("fog static", vec![1.0; 4])?
            .with_column(AUXILIARY_COLUMN, vec![250.0; 4])?;

        let combined = combined_series(&table, &InfrastructureCategory::columns())?;
        assert_eq!(combined, vec![11.0; 4]);
        Ok(())
    }

    #[test]
    fn combined_series_sums_every_exported_meter() -> anyhow::Result<()> {
        let csv = "time,taxis,cloud static,cloud dynamic,fog static,fog dynamic,wifi static,wifi dynamic,wan static,wan dynamic\n\
                   0,3,50,100,10,20,5,1,7,2\n\
                   1,4,50,100,10,20,5,1,7,2\n\
                   2,4,50,100,10,20,5,1,7,2\n";
        let table = crate::data::loader::read_table(csv.as_bytes())?;

        let combined = combined_series(&table, &crate::data::meter_columns())?;
        assert_eq!(combined, vec![195.0; 3]);
        Ok(())
    }

    #[test]
    fn combined_series_rejects_unlisted_columns() -> anyhow::Result<()> {
        let table = infrastructure(4, 10.0).with_column("cloud static", vec![5.0; 4])?;

        assert_eq!(
            combined_series(&table, &InfrastructureCategory::columns()),
            Err(AnalysisError::UnexpectedColumn {
                column: "cloud static".to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn combined_series_requires_every_listed_column() {
        let table = TimeTable::with_len(4)
            .with_column("cloud dynamic", vec![1.0; 4])
            .expect("column length matches");

        assert_eq!(
            combined_series(&table, &["cloud dynamic", "wan dynamic"]),
            Err(AnalysisError::MissingColumn {
                column: "wan dynamic".to_string()
            })
        );
    }

    #[test]
    fn smoothed_comparison_keeps_requested_experiments_in_catalogue_order() -> anyhow::Result<()>
    {
        let catalogue = Catalogue::try_new(&["a", "b", "c"], &["A", "B", "C"])?;
        let mut dataset = ExperimentDataset::new();
        dataset.insert("a", experiment(infrastructure(50, 100.0)));
        dataset.insert("c", experiment(infrastructure(50, 300.0)));

        let requested = ["c", "b", "a", "unknown"].map(String::from);
        let filter = SavitzkyGolay::new(11, 3)?;
        let series = smoothed_comparison(
            &catalogue,
            &dataset,
            &requested,
            &InfrastructureCategory::columns(),
            &filter,
        )?;

        let titles = series.iter().map(|s| s.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["A", "C"]);
        for s in series.iter() {
            assert_eq!(s.values.len(), 50);
            assert_eq!(s.time.len(), 50);
        }
        assert!(series[1].values.iter().all(|v| (v - 300.0).abs() < 1e-9));
        Ok(())
    }

    #[test]
    fn smoothed_comparison_rejects_short_series() -> anyhow::Result<()> {
        let catalogue = Catalogue::try_new(&["a"], &["A"])?;
        let mut dataset = ExperimentDataset::new();
        dataset.insert("a", experiment(infrastructure(100, 1.0)));

        let res = smoothed_comparison(
            &catalogue,
            &dataset,
            &["a".to_string()],
            &InfrastructureCategory::columns(),
            &SavitzkyGolay::new(3601, 3)?,
        );
        assert!(matches!(res, Err(AnalysisError::InvalidWindow { len: 100, .. })));
        Ok(())
    }
}
