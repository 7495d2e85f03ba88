// src/config.rs

use crate::inventory::MalformedEntryPolicy;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub inventory_path: String,
    pub starting_balance: Decimal,
    /// Amount credited by a single deposit key press in the TUI.
    pub deposit_step: Decimal,
    /// Smallest coin the machine accepts; deposits are floored to a multiple of it.
    pub currency_unit: Decimal,
    pub malformed_entries: MalformedEntryPolicy,
    pub log_dir: String,
    pub log_filter: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("Settings").required(false))
            .add_source(Environment::with_prefix("VENDING").separator("__"));

        Self::from_builder(builder)
    }

    pub(crate) fn from_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config = builder
            .set_default("inventory_path", "data/inventory.json")?
            .set_default("starting_balance", "10.00")?
            .set_default("deposit_step", "1.00")?
            .set_default("currency_unit", "0.01")?
            .set_default("malformed_entries", "skip")?
            .set_default("log_dir", "logs")?
            .set_default("log_filter", "info")?
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.currency_unit < Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "currency_unit must not be negative, got {}",
                self.currency_unit
            )));
        }
        if self.deposit_step <= Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "deposit_step must be positive, got {}",
                self.deposit_step
            )));
        }
        Ok(())
    }
}
