use crate::error::{ForecastError, ForecastResult};
use crate::types::{Fraction, NonNegativeAmount};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `TAPPASS_FORECAST__`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub assumptions: AssumptionsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

// ─── Revenue Assumptions ────────────────────────────────────────────────────

/// Illustrative uplift rates applied on top of the campaign projection.
/// These are planning assumptions, not values derived from campaign inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct AssumptionsConfig {
    #[serde(default = "default_repeat_customer_rate")]
    pub repeat_customer_rate: f64,
    #[serde(default = "default_word_of_mouth_effect")]
    pub word_of_mouth_effect: f64,
}

pub const DEFAULT_REPEAT_CUSTOMER_RATE: Fraction = match Fraction::try_new(0.3) {
    Ok(rate) => rate,
    Err(_) => panic!("0.3 is a valid fraction"),
};
pub const DEFAULT_WORD_OF_MOUTH_EFFECT: f64 = 0.2;

fn default_repeat_customer_rate() -> f64 { DEFAULT_REPEAT_CUSTOMER_RATE.into_inner() }
fn default_word_of_mouth_effect() -> f64 { DEFAULT_WORD_OF_MOUTH_EFFECT }

impl Default for AssumptionsConfig {
    fn default() -> Self {
        Self {
            repeat_customer_rate: default_repeat_customer_rate(),
            word_of_mouth_effect: default_word_of_mouth_effect(),
        }
    }
}

// ─── Report Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u32,
    #[serde(default = "default_percentage_decimals")]
    pub percentage_decimals: u32,
}

fn default_currency_symbol() -> String { "$".to_string() }
fn default_currency_decimals() -> u32 { 2 }
fn default_percentage_decimals() -> u32 { 1 }

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
            percentage_decimals: default_percentage_decimals(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> ForecastResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional TOML file, with environment
    /// variables taking precedence over file values.
    pub fn load_from(path: Option<&Path>) -> ForecastResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("TAPPASS_FORECAST")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(file = ?path, ?config, "Configuration resolved");
        Ok(config)
    }

    /// Parse configuration from a TOML string (no environment overlay).
    pub fn from_toml_str(source: &str) -> ForecastResult<Self> {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded values and
    /// re-validate the result.
    pub fn with_overrides(
        mut self,
        repeat_customer_rate: Option<f64>,
        word_of_mouth_effect: Option<f64>,
    ) -> ForecastResult<Self> {
        if let Some(rate) = repeat_customer_rate {
            self.assumptions.repeat_customer_rate = rate;
        }
        if let Some(effect) = word_of_mouth_effect {
            self.assumptions.word_of_mouth_effect = effect;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ForecastResult<()> {
        Fraction::try_new(self.assumptions.repeat_customer_rate).map_err(|e| {
            ForecastError::Config(format!("assumptions.repeat_customer_rate: {e}"))
        })?;
        NonNegativeAmount::try_new(self.assumptions.word_of_mouth_effect).map_err(|e| {
            ForecastError::Config(format!("assumptions.word_of_mouth_effect: {e}"))
        })?;
        if self.report.currency_decimals > 6 || self.report.percentage_decimals > 6 {
            return Err(ForecastError::Config(
                "report decimals must not exceed 6".to_string(),
            ));
        }
        Ok(())
    }
}
