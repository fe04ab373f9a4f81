//! App acquisition funnel — projects installs, retention, referrals and
//! lifetime revenue for a mobile-app campaign, and scores the result.

use forecast_core::types::{ensure_non_negative, round_to};
use forecast_core::{guarded_div, ForecastError, ForecastResult, Fraction};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Campaign-side inputs: who is reached and what an install costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppMarketingData {
    pub campaign_reach: u64,
    pub install_rate: Fraction,
    pub cost_per_install: f64,
    pub monthly_revenue_per_user: f64,
}

/// Behavioural inputs describing how installed users act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppParameters {
    pub engagement_rate: Fraction,
    pub retention_rate: Fraction,
    pub referral_rate: Fraction,
    pub average_user_lifespan_months: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppCalculations {
    pub projected_new_users: u64,
    pub projected_retained_users: u64,
    pub projected_referred_users: u64,
    pub projected_app_revenue: f64,
    pub app_acquisition_cost: f64,
    pub net_app_revenue: f64,
    pub user_lifetime_value: f64,
}

impl AppMarketingData {
    pub fn validate(&self) -> ForecastResult<()> {
        ensure_non_negative("cost_per_install", self.cost_per_install)?;
        ensure_non_negative("monthly_revenue_per_user", self.monthly_revenue_per_user)?;
        Ok(())
    }
}

impl AppParameters {
    pub fn validate(&self) -> ForecastResult<()> {
        ensure_non_negative(
            "average_user_lifespan_months",
            self.average_user_lifespan_months,
        )?;
        Ok(())
    }
}

impl AppCalculations {
    /// Acquisition spend per new user, `0.0` without users.
    pub fn cost_per_user(&self) -> f64 {
        guarded_div(self.app_acquisition_cost, self.projected_new_users as f64)
    }

    /// Projected revenue per unit of acquisition spend, `0.0` without spend.
    pub fn revenue_per_dollar(&self) -> f64 {
        guarded_div(self.projected_app_revenue, self.app_acquisition_cost)
    }
}

/// Project the funnel. Both inputs are validated before any arithmetic runs.
pub fn calculate(data: &AppMarketingData, params: &AppParameters) -> ForecastResult<AppCalculations> {
    data.validate()?;
    params.validate()?;

    let new_users = floor_share(data.campaign_reach, data.install_rate);
    let retained_users = floor_share(new_users, params.retention_rate);
    let referred_users = floor_share(retained_users, params.referral_rate);

    let lifetime_value = data.monthly_revenue_per_user * params.average_user_lifespan_months;
    let revenue = retained_users.saturating_add(referred_users) as f64
        * lifetime_value
        * params.engagement_rate.into_inner();
    let acquisition_cost = new_users as f64 * data.cost_per_install;

    let calc = AppCalculations {
        projected_new_users: new_users,
        projected_retained_users: retained_users,
        projected_referred_users: referred_users,
        projected_app_revenue: revenue,
        app_acquisition_cost: acquisition_cost,
        net_app_revenue: revenue - acquisition_cost,
        user_lifetime_value: lifetime_value,
    };

    debug!(
        new_users,
        retained_users,
        referred_users,
        net = calc.net_app_revenue,
        "App funnel projected"
    );
    Ok(calc)
}

/// Parse and project in one step, for callers holding raw JSON.
pub fn calculate_from_json(data: &str, params: &str) -> ForecastResult<AppCalculations> {
    let data: AppMarketingData = serde_json::from_str(data)
        .map_err(|e| ForecastError::Validation(format!("app marketing data: {e}")))?;
    let params: AppParameters = serde_json::from_str(params)
        .map_err(|e| ForecastError::Validation(format!("app parameters: {e}")))?;
    calculate(&data, &params)
}

/// Return on acquisition spend as a percentage. `0.0` when nothing was spent.
pub fn roi(calc: &AppCalculations) -> f64 {
    guarded_div(calc.net_app_revenue, calc.app_acquisition_cost) * 100.0
}

/// Weighted engagement/retention score in `[0, 100]`, two decimals.
pub fn engagement_score(params: &AppParameters) -> f64 {
    let raw = (params.engagement_rate.into_inner() * 0.6 + params.retention_rate.into_inner() * 0.4) * 100.0;
    round_to(raw.clamp(0.0, 100.0), 2)
}

/// Blend of cheap acquisition (weight 0.4) and revenue per dollar spent
/// (weight 0.6), rounded to two decimals. Not bounded above: revenue per
/// dollar can exceed 1.
pub fn efficiency_score(calc: &AppCalculations) -> f64 {
    let cost_efficiency = (1.0 - calc.cost_per_user() / 100.0).max(0.0);
    round_to(cost_efficiency * 0.4 + calc.revenue_per_dollar() * 0.6, 2)
}

fn floor_share(total: u64, rate: Fraction) -> u64 {
    ((total as f64 * rate.into_inner()).floor() as u64).min(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(v: f64) -> Fraction {
        Fraction::try_new(v).unwrap()
    }

    fn sample_data() -> AppMarketingData {
        AppMarketingData {
            campaign_reach: 10_000,
            install_rate: rate(0.05),
            cost_per_install: 2.0,
            monthly_revenue_per_user: 5.0,
        }
    }

    fn sample_params() -> AppParameters {
        AppParameters {
            engagement_rate: rate(0.5),
            retention_rate: rate(0.4),
            referral_rate: rate(0.25),
            average_user_lifespan_months: 6.0,
        }
    }

    #[test]
    fn test_funnel_projection() {
        let calc = calculate(&sample_data(), &sample_params()).unwrap();

        assert_eq!(calc.projected_new_users, 500);
        assert_eq!(calc.projected_retained_users, 200);
        assert_eq!(calc.projected_referred_users, 50);
        assert!((calc.user_lifetime_value - 30.0).abs() < f64::EPSILON);
        // 250 users * 30 LTV * 0.5 engagement
        assert!((calc.projected_app_revenue - 3750.0).abs() < 1e-9);
        assert!((calc.app_acquisition_cost - 1000.0).abs() < f64::EPSILON);
        assert!((calc.net_app_revenue - 2750.0).abs() < 1e-9);
    }

    #[test]
    fn test_roi_percentage() {
        let calc = calculate(&sample_data(), &sample_params()).unwrap();
        assert!((roi(&calc) - 275.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_acquisition_cost_uses_sentinel() {
        let data = AppMarketingData {
            cost_per_install: 0.0,
            ..sample_data()
        };
        let calc = calculate(&data, &sample_params()).unwrap();

        assert!((calc.app_acquisition_cost).abs() < f64::EPSILON);
        let r = roi(&calc);
        assert!(r.is_finite());
        assert!(r.abs() < f64::EPSILON);

        // cost per user 0 -> full cost efficiency, revenue per dollar 0
        let score = efficiency_score(&calc);
        assert!(score.is_finite());
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_saturated_funnel_does_not_overflow() {
        let data = AppMarketingData {
            campaign_reach: u64::MAX,
            install_rate: Fraction::ONE,
            cost_per_install: 1.0,
            monthly_revenue_per_user: 1.0,
        };
        let params = AppParameters {
            engagement_rate: Fraction::ONE,
            retention_rate: Fraction::ONE,
            referral_rate: Fraction::ONE,
            average_user_lifespan_months: 1.0,
        };
        let calc = calculate(&data, &params).unwrap();

        assert_eq!(calc.projected_new_users, u64::MAX);
        assert_eq!(calc.projected_referred_users, u64::MAX);
        // retained + referred saturates at u64::MAX users
        assert!((calc.projected_app_revenue - u64::MAX as f64).abs() < 1.0);
        assert!(calc.net_app_revenue.is_finite());
    }

    #[test]
    fn test_engagement_score_bounds_and_rounding() {
        let mut params = sample_params();
        // 0.5 * 0.6 + 0.4 * 0.4 = 0.46
        assert!((engagement_score(&params) - 46.0).abs() < 1e-9);

        params.engagement_rate = Fraction::ONE;
        params.retention_rate = Fraction::ONE;
        assert!((engagement_score(&params) - 100.0).abs() < f64::EPSILON);

        params.engagement_rate = Fraction::ZERO;
        params.retention_rate = Fraction::ZERO;
        assert!((engagement_score(&params)).abs() < f64::EPSILON);

        params.engagement_rate = rate(0.333);
        params.retention_rate = rate(0.777);
        let score = engagement_score(&params);
        // 19.98 + 31.08
        assert!((score - 51.06).abs() < 1e-9);
        assert!((score * 100.0 - (score * 100.0).round()).abs() < 1e-6);
    }

    #[test]
    fn test_efficiency_score() {
        let calc = calculate(&sample_data(), &sample_params()).unwrap();
        // cost/user = 2 -> 0.98 * 0.4 = 0.392; rev/$ = 3.75 * 0.6 = 2.25
        assert!((efficiency_score(&calc) - 2.64).abs() < 1e-9);
    }

    #[test]
    fn test_expensive_users_floor_cost_efficiency() {
        let data = AppMarketingData {
            cost_per_install: 250.0,
            ..sample_data()
        };
        let calc = calculate(&data, &sample_params()).unwrap();
        // cost efficiency clamps to 0, only revenue per dollar remains
        let expected = round_to(calc.revenue_per_dollar() * 0.6, 2);
        assert!((efficiency_score(&calc) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_validation_fails_fast() {
        let data = AppMarketingData {
            cost_per_install: -1.0,
            ..sample_data()
        };
        let err = calculate(&data, &sample_params()).unwrap_err();
        assert!(matches!(err, ForecastError::Validation(_)));

        let params = AppParameters {
            average_user_lifespan_months: f64::NAN,
            ..sample_params()
        };
        assert!(calculate(&sample_data(), &params).is_err());
    }

    #[test]
    fn test_calculate_from_json_rejects_bad_rates() {
        let data = r#"{"campaign_reach": 1000, "install_rate": 0.1,
                       "cost_per_install": 1.0, "monthly_revenue_per_user": 3.0}"#;
        let params = r#"{"engagement_rate": 0.5, "retention_rate": 0.5,
                         "referral_rate": 0.1, "average_user_lifespan_months": 12}"#;
        let calc = calculate_from_json(data, params).unwrap();
        assert_eq!(calc.projected_new_users, 100);

        let bad = params.replace("\"retention_rate\": 0.5", "\"retention_rate\": 1.5");
        let err = calculate_from_json(data, &bad).unwrap_err();
        assert!(matches!(err, ForecastError::Validation(_)));
    }
}
