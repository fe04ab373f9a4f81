//! Campaign forecasting and reporting — stamp campaign projections, app
//! acquisition funnel scoring, scenario comparison and report export.

pub mod app_funnel;
pub mod campaign;
pub mod format;
pub mod report_builder;
pub mod scenario;

pub use app_funnel::{AppCalculations, AppMarketingData, AppParameters};
pub use campaign::{
    campaign_metrics, campaign_metrics_with, CampaignParameters, MarketingCampaignData,
    RevenueAssumptions,
};
pub use format::{DisplayFormatter, MetricFormat};
pub use report_builder::CampaignReport;
pub use scenario::{compare_scenarios, NamedScenario, ScenarioComparison};
