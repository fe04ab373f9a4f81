pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{ForecastError, ForecastResult};
pub use types::{guarded_div, round_to, Fraction, NonNegativeAmount};
