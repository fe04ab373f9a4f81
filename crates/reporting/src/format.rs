//! Display formatting for currency, percentages and counts.

use forecast_core::config::ReportConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    Count,
    Currency,
    /// A fraction rendered as a percentage (`0.25` -> `25.0%`).
    Percentage,
    /// A plain score or percentage figure, shown with two decimals.
    Score,
    Multiplier,
}

#[derive(Debug, Clone)]
pub struct DisplayFormatter {
    config: ReportConfig,
}

impl DisplayFormatter {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn format(&self, value: f64, format: MetricFormat) -> String {
        match format {
            MetricFormat::Count => self.format_count(value),
            MetricFormat::Currency => self.format_currency(value),
            MetricFormat::Percentage => self.format_percentage(value),
            MetricFormat::Score => format!("{value:.2}"),
            MetricFormat::Multiplier => format!("{value:.2}x"),
        }
    }

    pub fn format_currency(&self, value: f64) -> String {
        let decimals = self.config.currency_decimals as usize;
        let fixed = format!("{:.*}", decimals, value.abs());
        let rounds_to_zero = fixed.chars().all(|c| c == '0' || c == '.');
        let sign = if value < 0.0 && !rounds_to_zero { "-" } else { "" };
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };
        let mut out = format!("{sign}{}{}", self.config.currency_symbol, group_thousands(int_part));
        if let Some(frac) = frac_part {
            out.push('.');
            out.push_str(frac);
        }
        out
    }

    pub fn format_percentage(&self, fraction: f64) -> String {
        format!(
            "{:.*}%",
            self.config.percentage_decimals as usize,
            fraction * 100.0
        )
    }

    pub fn format_count(&self, value: f64) -> String {
        let rounded = format!("{:.0}", value.abs());
        let sign = if value < 0.0 && rounded != "0" { "-" } else { "" };
        format!("{sign}{}", group_thousands(&rounded))
    }
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self::new(&ReportConfig::default())
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
