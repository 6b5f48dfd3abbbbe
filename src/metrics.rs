use crate::{
    data::{InfrastructureCategory, TimeTable},
    error::AnalysisError,
};

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Energy unit a summed power series (one sample per second) is converted into.
///
/// The summary table reports watt-hours truncated to integers while the bar chart reports
/// kilowatt-hours with decimals, hence the two scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyUnit {
    WattHours,
    KilowattHours,
}
impl EnergyUnit {
    pub fn divisor(&self) -> f64 {
        match self {
            EnergyUnit::WattHours => SECONDS_PER_HOUR,
            EnergyUnit::KilowattHours => SECONDS_PER_HOUR * 1000.0,
        }
    }

    /// Converts a sum of per-second watt readings into this unit.
    pub fn from_watt_seconds(&self, watt_seconds: f64) -> f64 {
        watt_seconds / self.divisor()
    }
}

/// Energy consumed by each infrastructure category over a whole experiment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryTotals {
    pub cloud: f64,
    pub fog_dynamic: f64,
    pub fog_static: f64,
    pub wan: f64,
    pub wifi: f64,
}
impl CategoryTotals {
    /// Sums every category column of an infrastructure table and converts it to `unit`.
    pub fn from_table(table: &TimeTable, unit: EnergyUnit) -> Result<Self, AnalysisError> {
        let total = |category: InfrastructureCategory| -> Result<f64, AnalysisError> {
            Ok(unit.from_watt_seconds(table.column_sum(category.column())?))
        };

        Ok(CategoryTotals {
            cloud: total(InfrastructureCategory::Cloud)?,
            fog_dynamic: total(InfrastructureCategory::FogDynamic)?,
            fog_static: total(InfrastructureCategory::FogStatic)?,
            wan: total(InfrastructureCategory::Wan)?,
            wifi: total(InfrastructureCategory::Wifi)?,
        })
    }

    pub fn get(&self, category: InfrastructureCategory) -> f64 {
        match category {
            InfrastructureCategory::Cloud => self.cloud,
            InfrastructureCategory::FogDynamic => self.fog_dynamic,
            InfrastructureCategory::FogStatic => self.fog_static,
            InfrastructureCategory::Wan => self.wan,
            InfrastructureCategory::Wifi => self.wifi,
        }
    }

    /// Grand total over the five categories.
    pub fn total(&self) -> f64 {
        self.cloud + self.fog_dynamic + self.fog_static + self.wifi + self.wan
    }

    pub fn truncated(&self) -> TruncatedTotals {
        TruncatedTotals {
            total: truncate(self.total()),
            cloud: truncate(self.cloud),
            fog_dynamic: truncate(self.fog_dynamic),
            fog_static: truncate(self.fog_static),
            wan: truncate(self.wan),
            wifi: truncate(self.wifi),
        }
    }
}

/// Category totals with the fractional part dropped, as shown in the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TruncatedTotals {
    pub total: i64,
    pub cloud: i64,
    pub fog_dynamic: i64,
    pub fog_static: i64,
    pub wan: i64,
    pub wifi: i64,
}

/// Truncates toward zero.
pub fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
