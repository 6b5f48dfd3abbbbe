use crate::{data, error::AnalysisError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

static EXAMPLE_CONFIG: &str = include_str!("templates/leaf.toml");

// ******** ******** ********
// **    CONFIGURATION     **
// ******** ******** ********
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub results_dir: PathBuf,
    pub catalogue: CatalogueConfig,
    pub comparison: Comparison,
    pub smoothing: Smoothing,
    pub colors: Palette,
}
impl Default for Config {
    fn default() -> Self {
        Config {
            results_dir: PathBuf::from("../results"),
            catalogue: CatalogueConfig::default(),
            comparison: Comparison::default(),
            smoothing: Smoothing::default(),
            colors: Palette::default(),
        }
    }
}
impl Config {
    /// Writes the bundled example configuration to `path`. Fails if the file already exists.
    pub fn write_example_to_file(path: &Path) -> anyhow::Result<File> {
        let mut file = File::create_new(path)
            .context(format!("Unable to create config file {}", path.display()))?;
        file.write_all(EXAMPLE_CONFIG.as_bytes())?;
        Ok(file)
    }

    pub fn try_from_path(path: &Path) -> anyhow::Result<Config> {
        let config_str = fs::read_to_string(path)
            .context(format!("Unable to read config file {}", path.display()))?;
        Config::try_from_str(&config_str)
    }

    pub fn try_from_str(conf_str: &str) -> anyhow::Result<Config> {
        toml::from_str::<Config>(conf_str).map_err(|e| anyhow::anyhow!("TOML parsing error: {}", e))
    }

    /// Builds the experiment catalogue, checking that ids and titles line up.
    pub fn catalogue(&self) -> Result<Catalogue, AnalysisError> {
        Catalogue::try_new(&self.catalogue.experiments, &self.catalogue.titles)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogueConfig {
    pub experiments: Vec<String>,
    pub titles: Vec<String>,
}
impl Default for CatalogueConfig {
    fn default() -> Self {
        let experiments = [
            "cloud_only",
            "fog_1",
            "fog_2",
            "fog_3",
            "fog_4",
            "fog_5",
            "fog_6",
            "fog_6_shutdown5",
        ];
        let titles = [
            "Cloud only",
            "Fog 1",
            "Fog 2",
            "Fog 3",
            "Fog 4",
            "Fog 5",
            "Fog 6",
            "Fog 6s",
        ];

        CatalogueConfig {
            experiments: experiments.iter().map(|s| s.to_string()).collect(),
            titles: titles.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Comparison {
    pub experiments: Vec<String>,
    /// File stem of the comparison chart, written into the results directory.
    pub output: String,
    /// Columns summed into the combined series of each experiment.
    pub columns: Vec<String>,
}
impl Default for Comparison {
    fn default() -> Self {
        Comparison {
            experiments: vec!["fog_4".to_string(), "fog_6_shutdown5".to_string()],
            output: "fog4_vs_fog6s".to_string(),
            columns: data::meter_columns(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Smoothing {
    pub window: usize,
    pub order: usize,
}
impl Default for Smoothing {
    fn default() -> Self {
        Smoothing {
            window: 3601,
            order: 3,
        }
    }
}

/// Hex colour per infrastructure category and application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Palette {
    pub cloud: String,
    pub fog: String,
    pub fog_static: String,
    pub wan: String,
    pub wifi: String,
    pub cctv: String,
    pub stm: String,
}
impl Default for Palette {
    fn default() -> Self {
        Palette {
            cloud: "#34495e".to_string(),
            fog: "#e74c3c".to_string(),
            fog_static: "#c0392b".to_string(),
            wan: "#3498db".to_string(),
            wifi: "#2ecc71".to_string(),
            cctv: "#0c6f68".to_string(),
            stm: "#c9bc02".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    pub id: String,
    pub title: String,
}

/// Ordered, immutable list of the experiments known to the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    experiments: Vec<Experiment>,
}
impl Catalogue {
    pub fn try_new<S: AsRef<str>>(ids: &[S], titles: &[S]) -> Result<Self, AnalysisError> {
        if ids.len() != titles.len() {
            return Err(AnalysisError::ConfigMismatch {
                experiments: ids.len(),
                titles: titles.len(),
            });
        }

        let experiments = ids
            .iter()
            .zip(titles.iter())
            .map(|(id, title)| Experiment {
                id: id.as_ref().to_string(),
                title: title.as_ref().to_string(),
            })
            .collect();

        Ok(Catalogue { experiments })
    }

    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Experiment> {
        self.experiments.iter()
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    pub fn find(&self, experiment_id: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|exp| exp.id == experiment_id)
    }

    pub fn title_of(&self, experiment_id: &str) -> Option<&str> {
        self.find(experiment_id).map(|exp| exp.title.as_str())
    }
}
