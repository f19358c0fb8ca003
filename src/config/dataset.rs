use std::path::PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub csv_file: PathBuf,
    pub ema_lengths: Vec<usize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            csv_file: PathBuf::from("data/prices.csv"),
            ema_lengths: vec![5, 20, 50],
        }
    }
}
