//! Campaign financial model — turns stamp-campaign inputs into weekly,
//! monthly and annual projections with break-even analysis.
//!
//! Everything here is a pure function of its arguments: no I/O, no shared
//! state. Zero denominators resolve to `0.0` through [`guarded_div`].

use forecast_core::config::{
    AssumptionsConfig, DEFAULT_REPEAT_CUSTOMER_RATE, DEFAULT_WORD_OF_MOUTH_EFFECT,
};
use forecast_core::types::ensure_non_negative;
use forecast_core::{guarded_div, ForecastResult, Fraction};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Inputs for a stamp campaign. Only constructible in a valid state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCampaignParameters")]
pub struct CampaignParameters {
    pub available_stamps: u64,
    pub cost_per_stamp: f64,
    pub weekly_target_recipients: u64,
    pub conversion_rate: Fraction,
    pub current_weekly_revenue: f64,
    pub average_customer_value: f64,
}

/// Unchecked wire shape, validated into [`CampaignParameters`].
#[derive(Debug, Clone, Deserialize)]
struct RawCampaignParameters {
    available_stamps: u64,
    cost_per_stamp: f64,
    weekly_target_recipients: u64,
    conversion_rate: Fraction,
    current_weekly_revenue: f64,
    average_customer_value: f64,
}

impl TryFrom<RawCampaignParameters> for CampaignParameters {
    type Error = forecast_core::ForecastError;

    fn try_from(raw: RawCampaignParameters) -> Result<Self, Self::Error> {
        CampaignParameters::new(
            raw.available_stamps,
            raw.cost_per_stamp,
            raw.weekly_target_recipients,
            raw.conversion_rate,
            raw.current_weekly_revenue,
            raw.average_customer_value,
        )
    }
}

impl CampaignParameters {
    pub fn new(
        available_stamps: u64,
        cost_per_stamp: f64,
        weekly_target_recipients: u64,
        conversion_rate: Fraction,
        current_weekly_revenue: f64,
        average_customer_value: f64,
    ) -> ForecastResult<Self> {
        Ok(Self {
            available_stamps,
            cost_per_stamp: ensure_non_negative("cost_per_stamp", cost_per_stamp)?,
            weekly_target_recipients,
            conversion_rate,
            current_weekly_revenue: ensure_non_negative(
                "current_weekly_revenue",
                current_weekly_revenue,
            )?,
            average_customer_value: ensure_non_negative(
                "average_customer_value",
                average_customer_value,
            )?,
        })
    }

    /// Weekly spend on stamps.
    pub fn weekly_cost(&self) -> f64 {
        self.available_stamps as f64 * self.cost_per_stamp
    }
}

/// Projection horizon. Scaling is flat multiplication of the weekly figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Weekly,
    Monthly,
    Annual,
}

impl Period {
    pub fn weeks(&self) -> u64 {
        match self {
            Period::Weekly => 1,
            Period::Monthly => 4,
            Period::Annual => 52,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Weekly => "Weekly",
            Period::Monthly => "Monthly",
            Period::Annual => "Annual",
        }
    }
}

/// Figures for one projection horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodCalculations {
    pub period: Period,
    pub recipients: u64,
    pub new_customers: u64,
    pub revenue_from_new_customers: f64,
    /// `current revenue + revenue_from_new_customers` for the period.
    pub total_revenue_with_new_customers: f64,
    pub period_cost: f64,
    /// `revenue_from_new_customers - period_cost`; the baseline revenue is
    /// not part of the net figure.
    pub net_revenue: f64,
}

impl PeriodCalculations {
    /// Scale weekly figures to another horizon. Counts saturate at
    /// `u64::MAX` instead of overflowing.
    pub fn scaled(weekly: &PeriodCalculations, period: Period) -> Self {
        let weeks = period.weeks();
        let factor = weeks as f64;
        Self {
            period,
            recipients: weekly.recipients.saturating_mul(weeks),
            new_customers: weekly.new_customers.saturating_mul(weeks),
            revenue_from_new_customers: weekly.revenue_from_new_customers * factor,
            total_revenue_with_new_customers: weekly.total_revenue_with_new_customers * factor,
            period_cost: weekly.period_cost * factor,
            net_revenue: weekly.net_revenue * factor,
        }
    }
}

/// Uplift from repeat visits of newly acquired customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatCustomerEffect {
    pub rate: Fraction,
    pub additional_annual_revenue: f64,
}

/// Uplift from referrals by newly acquired customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordOfMouthEffect {
    /// Referred customers per acquired customer.
    pub multiplier: f64,
    pub additional_annual_customers: u64,
    pub additional_annual_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalRevenueConsiderations {
    pub repeat_customers: RepeatCustomerEffect,
    pub word_of_mouth: WordOfMouthEffect,
    pub total_additional_annual_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenAnalysis {
    pub required_new_customers_to_break_even: u64,
    pub required_conversion_rate_to_break_even: f64,
    pub break_even_revenue: f64,
}

/// Headline weekly numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub customers_acquired: u64,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub net_profit: f64,
    /// Fraction, not percent: `4.0` means a 400% return.
    pub roi: f64,
    pub cost_per_acquisition: f64,
}

/// Complete projection for one set of campaign parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingCampaignData {
    pub parameters: CampaignParameters,
    pub summary: CampaignSummary,
    pub weekly: PeriodCalculations,
    pub monthly: PeriodCalculations,
    pub annual: PeriodCalculations,
    pub additional_revenue_considerations: AdditionalRevenueConsiderations,
    pub break_even_analysis: BreakEvenAnalysis,
}

/// Uplift assumptions applied by [`campaign_metrics_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueAssumptions {
    pub repeat_customer_rate: Fraction,
    pub word_of_mouth_effect: f64,
}

impl Default for RevenueAssumptions {
    fn default() -> Self {
        Self {
            repeat_customer_rate: DEFAULT_REPEAT_CUSTOMER_RATE,
            word_of_mouth_effect: DEFAULT_WORD_OF_MOUTH_EFFECT,
        }
    }
}

impl TryFrom<&AssumptionsConfig> for RevenueAssumptions {
    type Error = forecast_core::ForecastError;

    fn try_from(config: &AssumptionsConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            repeat_customer_rate: Fraction::try_new(config.repeat_customer_rate)?,
            word_of_mouth_effect: ensure_non_negative(
                "word_of_mouth_effect",
                config.word_of_mouth_effect,
            )?,
        })
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// `floor(target_audience * conversion_rate)`; never exceeds the audience.
pub fn customers_acquired(target_audience: u64, conversion_rate: Fraction) -> u64 {
    let acquired = (target_audience as f64 * conversion_rate.into_inner()).floor() as u64;
    acquired.min(target_audience)
}

/// Spend per acquired customer, `0.0` when nobody was acquired.
pub fn cost_per_acquisition(total_cost: f64, customers_acquired: u64) -> f64 {
    guarded_div(total_cost, customers_acquired as f64)
}

/// `(revenue - cost) / cost`, `0.0` when there is no cost.
pub fn roi(total_revenue: f64, total_cost: f64) -> f64 {
    guarded_div(total_revenue - total_cost, total_cost)
}

/// Customers needed for their lifetime value to cover `total_cost`, rounded
/// up. `0` when the lifetime value is zero.
pub fn break_even_customers(total_cost: f64, customer_lifetime_value: f64) -> u64 {
    guarded_div(total_cost, customer_lifetime_value).ceil().max(0.0) as u64
}

/// Revenue target implied by a cost and an expected return.
pub fn break_even_revenue(total_cost: f64, roi: f64) -> f64 {
    if roi > 0.0 {
        total_cost * (1.0 + roi)
    } else {
        total_cost
    }
}

/// Run the full model with the default uplift assumptions.
pub fn campaign_metrics(params: &CampaignParameters) -> MarketingCampaignData {
    campaign_metrics_with(params, &RevenueAssumptions::default())
}

/// Run the full model.
pub fn campaign_metrics_with(
    params: &CampaignParameters,
    assumptions: &RevenueAssumptions,
) -> MarketingCampaignData {
    let new_customers = customers_acquired(params.weekly_target_recipients, params.conversion_rate);
    let revenue_from_new = new_customers as f64 * params.average_customer_value;
    let weekly_cost = params.weekly_cost();

    let summary = CampaignSummary {
        customers_acquired: new_customers,
        total_revenue: revenue_from_new,
        total_costs: weekly_cost,
        net_profit: revenue_from_new - weekly_cost,
        roi: roi(revenue_from_new, weekly_cost),
        cost_per_acquisition: cost_per_acquisition(weekly_cost, new_customers),
    };

    let weekly = PeriodCalculations {
        period: Period::Weekly,
        recipients: params.weekly_target_recipients,
        new_customers,
        revenue_from_new_customers: revenue_from_new,
        total_revenue_with_new_customers: params.current_weekly_revenue + revenue_from_new,
        period_cost: weekly_cost,
        net_revenue: revenue_from_new - weekly_cost,
    };
    let monthly = PeriodCalculations::scaled(&weekly, Period::Monthly);
    let annual = PeriodCalculations::scaled(&weekly, Period::Annual);

    let additional_revenue_considerations =
        additional_revenue(&annual, params.average_customer_value, assumptions);
    let break_even_analysis = break_even_analysis(&annual, params.average_customer_value, summary.roi);

    debug!(
        customers = new_customers,
        weekly_net = weekly.net_revenue,
        annual_net = annual.net_revenue,
        roi = summary.roi,
        "Campaign projection computed"
    );

    MarketingCampaignData {
        parameters: params.clone(),
        summary,
        weekly,
        monthly,
        annual,
        additional_revenue_considerations,
        break_even_analysis,
    }
}

// -- internal helpers -------------------------------------------------------

fn additional_revenue(
    annual: &PeriodCalculations,
    average_customer_value: f64,
    assumptions: &RevenueAssumptions,
) -> AdditionalRevenueConsiderations {
    let repeat_revenue =
        annual.revenue_from_new_customers * assumptions.repeat_customer_rate.into_inner();

    let referred = (annual.new_customers as f64 * assumptions.word_of_mouth_effect).floor() as u64;
    let referral_revenue = referred as f64 * average_customer_value;

    AdditionalRevenueConsiderations {
        repeat_customers: RepeatCustomerEffect {
            rate: assumptions.repeat_customer_rate,
            additional_annual_revenue: repeat_revenue,
        },
        word_of_mouth: WordOfMouthEffect {
            multiplier: assumptions.word_of_mouth_effect,
            additional_annual_customers: referred,
            additional_annual_revenue: referral_revenue,
        },
        total_additional_annual_revenue: repeat_revenue + referral_revenue,
    }
}

fn break_even_analysis(
    annual: &PeriodCalculations,
    average_customer_value: f64,
    roi: f64,
) -> BreakEvenAnalysis {
    let required = break_even_customers(annual.period_cost, average_customer_value);
    BreakEvenAnalysis {
        required_new_customers_to_break_even: required,
        required_conversion_rate_to_break_even: guarded_div(
            required as f64,
            annual.recipients as f64,
        ),
        break_even_revenue: break_even_revenue(annual.period_cost, roi),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
