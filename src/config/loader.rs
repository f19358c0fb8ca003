use crate::config::dataset::DatasetConfig;
use crate::config::ledger::LedgerConfig;
use crate::config::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
    pub dataset: DatasetConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layer `config/default`, the optional `config/<env>` file and
    /// `MARGINLEDGER__*` environment variables.
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("MARGINLEDGER").separator("__"))
            .build()?;

        config.try_deserialize::<AppConfig>()?.validated()
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        config.try_deserialize::<AppConfig>()?.validated()
    }

    fn validated(self) -> Result<Self> {
        if !(self.ledger.initial_balance.is_finite() && self.ledger.initial_balance > 0.0) {
            return Err(Error::ConfigError(format!(
                "ledger.initial_balance must be positive, got {}",
                self.ledger.initial_balance
            )));
        }
        if !(self.ledger.leverage.is_finite() && self.ledger.leverage >= 1.0) {
            return Err(Error::ConfigError(format!(
                "ledger.leverage must be >= 1, got {}",
                self.ledger.leverage
            )));
        }
        if self.dataset.ema_lengths.contains(&0) {
            return Err(Error::ConfigError("dataset.ema_lengths must be >= 1".to_string()));
        }
        Ok(self)
    }
}
