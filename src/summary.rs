use crate::{
    config::Catalogue,
    data::dataset::ExperimentDataset,
    error::AnalysisError,
    metrics::{CategoryTotals, EnergyUnit, TruncatedTotals},
};
use colored::Colorize;
use term_table::{row, row::Row, rows, table_cell::*, Table, TableStyle};

/// One line of the summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub experiment: String,
    pub totals: TruncatedTotals,
}

/// Computes the watt-hour totals of every experiment in catalogue order.
pub fn summary_rows(
    catalogue: &Catalogue,
    dataset: &ExperimentDataset,
) -> Result<Vec<SummaryRow>, AnalysisError> {
    catalogue
        .iter()
        .map(|exp| -> Result<SummaryRow, AnalysisError> {
            let data = dataset.get(&exp.id)?;
            let totals = CategoryTotals::from_table(&data.infrastructure, EnergyUnit::WattHours)?;
            Ok(SummaryRow {
                experiment: exp.id.clone(),
                totals: totals.truncated(),
            })
        })
        .collect()
}

/// Renders the summary rows. Column order is fixed: Total, Cloud, Fog (d), Fog (s), WAN, WiFi.
pub fn render_summary(rows: &[SummaryRow]) -> String {
    let mut table = Table::builder()
        .rows(rows![row![
            TableCell::builder("Experiment".bold()).build(),
            TableCell::builder("Total".bold()).build(),
            TableCell::builder("Cloud".bold()).build(),
            TableCell::builder("Fog (d)".bold()).build(),
            TableCell::builder("Fog (s)".bold()).build(),
            TableCell::builder("WAN".bold()).build(),
            TableCell::builder("WiFi".bold()).build()
        ]])
        .style(TableStyle::rounded())
        .build();

    for summary in rows {
        let totals = &summary.totals;
        table.add_row(row![
            TableCell::new(summary.experiment.green()),
            TableCell::new(totals.total),
            TableCell::new(totals.cloud),
            TableCell::new(totals.fog_dynamic),
            TableCell::new(totals.fog_static),
            TableCell::new(totals.wan),
            TableCell::new(totals.wifi)
        ]);
    }

    table.render()
}
