//! Report builder — lays out a projection as labelled, formatted rows that a
//! spreadsheet writer can place cell by cell, with CSV, JSON and plain-text
//! exports.

use crate::app_funnel::{self, AppCalculations, AppParameters};
use crate::campaign::{MarketingCampaignData, PeriodCalculations};
use crate::format::{DisplayFormatter, MetricFormat};
use chrono::{DateTime, Utc};
use forecast_core::ForecastResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    CampaignProjection,
    AppFunnel,
    ScenarioComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub value: f64,
    pub format: MetricFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignReport {
    pub report_id: Uuid,
    pub report_type: ReportType,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

// ─── Builders ───────────────────────────────────────────────────────────────

impl CampaignReport {
    pub fn new(report_type: ReportType, title: impl Into<String>) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            report_type,
            title: title.into(),
            generated_at: Utc::now(),
            sections: Vec::new(),
        }
    }

    pub fn push_section(&mut self, title: impl Into<String>, rows: Vec<ReportRow>) {
        self.sections.push(ReportSection {
            title: title.into(),
            rows,
        });
    }

    pub fn from_campaign(data: &MarketingCampaignData) -> Self {
        let mut report = Self::new(ReportType::CampaignProjection, "Stamp Campaign Projection");
        let s = &data.summary;

        report.push_section(
            "Summary",
            vec![
                row("Customers Acquired", s.customers_acquired as f64, MetricFormat::Count),
                row("Total Revenue", s.total_revenue, MetricFormat::Currency),
                row("Total Costs", s.total_costs, MetricFormat::Currency),
                row("Net Profit", s.net_profit, MetricFormat::Currency),
                row("ROI", s.roi, MetricFormat::Percentage),
                row("Cost per Acquisition", s.cost_per_acquisition, MetricFormat::Currency),
            ],
        );

        for period in [&data.weekly, &data.monthly, &data.annual] {
            report.push_section(period.period.label(), period_rows(period));
        }

        let extra = &data.additional_revenue_considerations;
        report.push_section(
            "Additional Revenue",
            vec![
                row(
                    "Repeat Customer Rate",
                    extra.repeat_customers.rate.into_inner(),
                    MetricFormat::Percentage,
                ),
                row(
                    "Repeat Customer Revenue",
                    extra.repeat_customers.additional_annual_revenue,
                    MetricFormat::Currency,
                ),
                row(
                    "Word of Mouth Effect",
                    extra.word_of_mouth.multiplier,
                    MetricFormat::Multiplier,
                ),
                row(
                    "Referred Customers",
                    extra.word_of_mouth.additional_annual_customers as f64,
                    MetricFormat::Count,
                ),
                row(
                    "Word of Mouth Revenue",
                    extra.word_of_mouth.additional_annual_revenue,
                    MetricFormat::Currency,
                ),
                row(
                    "Total Additional Revenue",
                    extra.total_additional_annual_revenue,
                    MetricFormat::Currency,
                ),
            ],
        );

        let be = &data.break_even_analysis;
        report.push_section(
            "Break-Even",
            vec![
                row(
                    "Required New Customers",
                    be.required_new_customers_to_break_even as f64,
                    MetricFormat::Count,
                ),
                row(
                    "Required Conversion Rate",
                    be.required_conversion_rate_to_break_even,
                    MetricFormat::Percentage,
                ),
                row("Break-Even Revenue", be.break_even_revenue, MetricFormat::Currency),
            ],
        );

        report
    }

    pub fn from_app(calc: &AppCalculations, params: &AppParameters) -> Self {
        let mut report = Self::new(ReportType::AppFunnel, "App Acquisition Funnel");

        report.push_section(
            "Users",
            vec![
                row("New Users", calc.projected_new_users as f64, MetricFormat::Count),
                row("Retained Users", calc.projected_retained_users as f64, MetricFormat::Count),
                row("Referred Users", calc.projected_referred_users as f64, MetricFormat::Count),
            ],
        );
        report.push_section(
            "Revenue",
            vec![
                row("Projected Revenue", calc.projected_app_revenue, MetricFormat::Currency),
                row("Acquisition Cost", calc.app_acquisition_cost, MetricFormat::Currency),
                row("Net Revenue", calc.net_app_revenue, MetricFormat::Currency),
                row("Lifetime Value", calc.user_lifetime_value, MetricFormat::Currency),
                row("Cost per User", calc.cost_per_user(), MetricFormat::Currency),
            ],
        );
        report.push_section(
            "Scores",
            vec![
                row("ROI (%)", app_funnel::roi(calc), MetricFormat::Score),
                row("Engagement Score", app_funnel::engagement_score(params), MetricFormat::Score),
                row("Efficiency Score", app_funnel::efficiency_score(calc), MetricFormat::Score),
            ],
        );

        report
    }

    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    /// Find a value by section and label.
    pub fn value(&self, section: &str, label: &str) -> Option<f64> {
        self.sections
            .iter()
            .find(|s| s.title == section)?
            .rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value)
    }

    // ─── Exports ────────────────────────────────────────────────────────────

    /// One line per row: `section,metric,value,format`. Values are raw
    /// numbers so the sheet can apply its own cell formats.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("section,metric,value,format\n");
        for section in &self.sections {
            for r in &section.rows {
                let format = serde_json::to_value(r.format)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_owned))
                    .unwrap_or_default();
                csv.push_str(&format!(
                    "{},{},{},{}\n",
                    quote(&section.title),
                    quote(&r.label),
                    r.value,
                    format
                ));
            }
        }
        csv
    }

    pub fn to_json(&self) -> ForecastResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text layout with formatted values, one block per section.
    pub fn render_table(&self, formatter: &DisplayFormatter) -> String {
        let label_width = self
            .sections
            .iter()
            .flat_map(|s| s.rows.iter().map(|r| r.label.len()))
            .max()
            .unwrap_or(0);

        let mut out = format!("{}\n{}\n", self.title, "=".repeat(self.title.len()));
        for section in &self.sections {
            out.push_str(&format!("\n{}\n{}\n", section.title, "-".repeat(section.title.len())));
            for r in &section.rows {
                out.push_str(&format!(
                    "  {:<width$}  {:>16}\n",
                    r.label,
                    formatter.format(r.value, r.format),
                    width = label_width
                ));
            }
        }
        out
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn row(label: &str, value: f64, format: MetricFormat) -> ReportRow {
    ReportRow {
        label: label.to_string(),
        value,
        format,
    }
}

fn period_rows(p: &PeriodCalculations) -> Vec<ReportRow> {
    vec![
        row("Recipients", p.recipients as f64, MetricFormat::Count),
        row("New Customers", p.new_customers as f64, MetricFormat::Count),
        row("Revenue from New Customers", p.revenue_from_new_customers, MetricFormat::Currency),
        row(
            "Total Revenue with New Customers",
            p.total_revenue_with_new_customers,
            MetricFormat::Currency,
        ),
        row("Cost", p.period_cost, MetricFormat::Currency),
        row("Net Revenue", p.net_revenue, MetricFormat::Currency),
    ]
}

fn quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_funnel::{calculate, AppMarketingData};
    use crate::campaign::{campaign_metrics, CampaignParameters};
    use forecast_core::Fraction;

    fn sample_data() -> MarketingCampaignData {
        let params =
            CampaignParameters::new(1000, 0.5, 500, Fraction::try_new(0.1).unwrap(), 2000.0, 50.0)
                .unwrap();
        campaign_metrics(&params)
    }

    #[test]
    fn test_campaign_report_sections() {
        let report = CampaignReport::from_campaign(&sample_data());
        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Summary", "Weekly", "Monthly", "Annual", "Additional Revenue", "Break-Even"]
        );
        assert_eq!(report.row_count(), 6 + 6 * 3 + 6 + 3);
        assert_eq!(report.value("Annual", "Net Revenue"), Some(104_000.0));
        assert_eq!(report.value("Summary", "ROI"), Some(4.0));
        assert_eq!(report.value("Summary", "Missing"), None);
    }

    #[test]
    fn test_csv_export() {
        let report = CampaignReport::from_campaign(&sample_data());
        let csv = report.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("section,metric,value,format"));
        assert_eq!(lines.next(), Some("Summary,Customers Acquired,50,count"));
        assert!(csv.contains("Monthly,Net Revenue,8000,currency\n"));
        assert_eq!(csv.lines().count(), report.row_count() + 1);
    }

    #[test]
    fn test_csv_quotes_labels() {
        let mut report = CampaignReport::new(ReportType::ScenarioComparison, "t");
        report.push_section("A, B", vec![row("say \"hi\"", 1.0, MetricFormat::Count)]);
        assert!(report.to_csv().contains("\"A, B\",\"say \"\"hi\"\"\",1,count"));
    }

    #[test]
    fn test_json_export() {
        let report = CampaignReport::from_campaign(&sample_data());
        let json = report.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["report_type"], "campaign_projection");
        assert_eq!(parsed["sections"][0]["rows"][0]["format"], "count");
    }

    #[test]
    fn test_render_table() {
        let report = CampaignReport::from_campaign(&sample_data());
        let text = report.render_table(&DisplayFormatter::default());
        assert!(text.starts_with("Stamp Campaign Projection\n"));
        assert!(text.contains("$104,000.00"));
        assert!(text.contains("400.0%"));
        assert!(text.contains("0.20x"));
    }

    #[test]
    fn test_app_report() {
        let data = AppMarketingData {
            campaign_reach: 10_000,
            install_rate: Fraction::try_new(0.05).unwrap(),
            cost_per_install: 2.0,
            monthly_revenue_per_user: 5.0,
        };
        let params = AppParameters {
            engagement_rate: Fraction::try_new(0.5).unwrap(),
            retention_rate: Fraction::try_new(0.4).unwrap(),
            referral_rate: Fraction::try_new(0.25).unwrap(),
            average_user_lifespan_months: 6.0,
        };
        let calc = calculate(&data, &params).unwrap();
        let report = CampaignReport::from_app(&calc, &params);

        assert_eq!(report.value("Users", "New Users"), Some(500.0));
        assert_eq!(report.value("Revenue", "Cost per User"), Some(2.0));
        assert_eq!(report.value("Scores", "Engagement Score"), Some(46.0));
        assert_eq!(report.value("Scores", "Efficiency Score"), Some(2.64));
        let text = report.render_table(&DisplayFormatter::default());
        assert!(text.contains("2.64"));
    }
}
