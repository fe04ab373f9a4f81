//! Side-by-side comparison of named campaign scenarios.

use crate::campaign::{campaign_metrics_with, CampaignParameters, RevenueAssumptions};
use crate::format::MetricFormat;
use crate::report_builder::{CampaignReport, ReportRow, ReportType};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedScenario {
    pub name: String,
    pub parameters: CampaignParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub annual_net_revenue: f64,
    pub roi: f64,
    pub break_even_customers: u64,
    pub annual_new_customers: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    /// Best annual net revenue first; ties keep input order.
    pub ranked: Vec<ScenarioOutcome>,
}

impl ScenarioComparison {
    pub fn best(&self) -> Option<&ScenarioOutcome> {
        self.ranked.first()
    }

    pub fn to_report(&self) -> CampaignReport {
        let mut report = CampaignReport::new(ReportType::ScenarioComparison, "Scenario Comparison");
        for outcome in &self.ranked {
            report.push_section(
                outcome.name.clone(),
                vec![
                    ReportRow {
                        label: "Annual Net Revenue".into(),
                        value: outcome.annual_net_revenue,
                        format: MetricFormat::Currency,
                    },
                    ReportRow {
                        label: "ROI".into(),
                        value: outcome.roi,
                        format: MetricFormat::Percentage,
                    },
                    ReportRow {
                        label: "Annual New Customers".into(),
                        value: outcome.annual_new_customers as f64,
                        format: MetricFormat::Count,
                    },
                    ReportRow {
                        label: "Break-Even Customers".into(),
                        value: outcome.break_even_customers as f64,
                        format: MetricFormat::Count,
                    },
                ],
            );
        }
        report
    }
}

/// Run the campaign model for each scenario and rank the outcomes.
pub fn compare_scenarios(
    scenarios: &[NamedScenario],
    assumptions: &RevenueAssumptions,
) -> ScenarioComparison {
    let mut ranked: Vec<ScenarioOutcome> = scenarios
        .iter()
        .map(|s| {
            let data = campaign_metrics_with(&s.parameters, assumptions);
            ScenarioOutcome {
                name: s.name.clone(),
                annual_net_revenue: data.annual.net_revenue,
                roi: data.summary.roi,
                break_even_customers: data.break_even_analysis.required_new_customers_to_break_even,
                annual_new_customers: data.annual.new_customers,
            }
        })
        .collect();

    // Stable sort keeps input order for equal revenue.
    ranked.sort_by(|a, b| b.annual_net_revenue.total_cmp(&a.annual_net_revenue));

    info!(
        scenarios = ranked.len(),
        best = ranked.first().map(|o| o.name.as_str()).unwrap_or(""),
        "Scenarios compared"
    );

    ScenarioComparison { ranked }
}
