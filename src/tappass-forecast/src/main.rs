//! TapPass Forecast — campaign projection and app funnel calculator CLI.
//!
//! Reads campaign inputs from flags or JSON files, runs the forecast models
//! and prints the resulting report as a table, CSV or JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use forecast_core::config::AppConfig;
use forecast_core::Fraction;
use forecast_reporting::{
    app_funnel, campaign_metrics_with, compare_scenarios, AppMarketingData, AppParameters,
    CampaignParameters, CampaignReport, DisplayFormatter, NamedScenario, RevenueAssumptions,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "tappass-forecast")]
#[command(about = "Marketing campaign projections for the TapPass loyalty program")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "TAPPASS_FORECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Repeat-customer rate assumption (overrides config)
    #[arg(long, global = true)]
    repeat_customer_rate: Option<f64>,

    /// Word-of-mouth referral effect (overrides config)
    #[arg(long, global = true)]
    word_of_mouth_effect: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Project a stamp campaign over week, month and year
    Campaign(CampaignArgs),

    /// Project an app acquisition funnel and score it
    App(AppArgs),

    /// Compare named campaign scenarios from a JSON file
    Compare {
        /// JSON array of `{ "name": ..., "parameters": { ... } }`
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CampaignArgs {
    /// JSON file with campaign parameters (replaces the flags below)
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(long, required_unless_present = "input")]
    available_stamps: Option<u64>,

    #[arg(long, required_unless_present = "input")]
    cost_per_stamp: Option<f64>,

    #[arg(long, required_unless_present = "input")]
    weekly_target_recipients: Option<u64>,

    /// Fraction between 0 and 1
    #[arg(long, required_unless_present = "input")]
    conversion_rate: Option<f64>,

    #[arg(long, required_unless_present = "input")]
    current_weekly_revenue: Option<f64>,

    #[arg(long, required_unless_present = "input")]
    average_customer_value: Option<f64>,
}

#[derive(Args, Debug)]
struct AppArgs {
    /// JSON file with `{ "data": { ... }, "parameters": { ... } }`
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(long, required_unless_present = "input")]
    campaign_reach: Option<u64>,

    #[arg(long, required_unless_present = "input")]
    install_rate: Option<f64>,

    #[arg(long, required_unless_present = "input")]
    cost_per_install: Option<f64>,

    #[arg(long, required_unless_present = "input")]
    monthly_revenue_per_user: Option<f64>,

    #[arg(long, required_unless_present = "input")]
    engagement_rate: Option<f64>,

    #[arg(long, required_unless_present = "input")]
    retention_rate: Option<f64>,

    #[arg(long, default_value_t = 0.0)]
    referral_rate: f64,

    #[arg(long, required_unless_present = "input")]
    average_user_lifespan_months: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AppInput {
    data: AppMarketingData,
    parameters: AppParameters,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tappass_forecast=info,forecast_reporting=info".into());
    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration
    let config = AppConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_overrides(cli.repeat_customer_rate, cli.word_of_mouth_effect)
        .context("invalid command-line override")?;

    let assumptions = RevenueAssumptions::try_from(&config.assumptions)
        .context("invalid revenue assumptions")?;
    let formatter = DisplayFormatter::new(&config.report);

    info!(
        repeat_customer_rate = config.assumptions.repeat_customer_rate,
        word_of_mouth_effect = config.assumptions.word_of_mouth_effect,
        "Configuration loaded"
    );

    let report = match cli.command {
        Commands::Campaign(args) => {
            let params = campaign_params(args)?;
            let data = campaign_metrics_with(&params, &assumptions);
            CampaignReport::from_campaign(&data)
        }
        Commands::App(args) => {
            let input = app_input(args)?;
            let calc = app_funnel::calculate(&input.data, &input.parameters)?;
            CampaignReport::from_app(&calc, &input.parameters)
        }
        Commands::Compare { input } => {
            let scenarios: Vec<NamedScenario> = read_json(&input)?;
            compare_scenarios(&scenarios, &assumptions).to_report()
        }
    };

    debug!(report_id = %report.report_id, rows = report.row_count(), "Report built");

    let output = match cli.format {
        OutputFormat::Table => report.render_table(&formatter),
        OutputFormat::Csv => report.to_csv(),
        OutputFormat::Json => report.to_json()?,
    };
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}

fn campaign_params(args: CampaignArgs) -> Result<CampaignParameters> {
    if let Some(path) = args.input {
        return read_json(&path);
    }

    let params = CampaignParameters::new(
        require(args.available_stamps, "--available-stamps")?,
        require(args.cost_per_stamp, "--cost-per-stamp")?,
        require(args.weekly_target_recipients, "--weekly-target-recipients")?,
        Fraction::try_new(require(args.conversion_rate, "--conversion-rate")?)?,
        require(args.current_weekly_revenue, "--current-weekly-revenue")?,
        require(args.average_customer_value, "--average-customer-value")?,
    )?;
    Ok(params)
}

fn app_input(args: AppArgs) -> Result<AppInput> {
    if let Some(path) = args.input {
        return read_json(&path);
    }

    Ok(AppInput {
        data: AppMarketingData {
            campaign_reach: require(args.campaign_reach, "--campaign-reach")?,
            install_rate: Fraction::try_new(require(args.install_rate, "--install-rate")?)?,
            cost_per_install: require(args.cost_per_install, "--cost-per-install")?,
            monthly_revenue_per_user: require(
                args.monthly_revenue_per_user,
                "--monthly-revenue-per-user",
            )?,
        },
        parameters: AppParameters {
            engagement_rate: Fraction::try_new(require(args.engagement_rate, "--engagement-rate")?)?,
            retention_rate: Fraction::try_new(require(args.retention_rate, "--retention-rate")?)?,
            referral_rate: Fraction::try_new(args.referral_rate)?,
            average_user_lifespan_months: require(
                args.average_user_lifespan_months,
                "--average-user-lifespan-months",
            )?,
        },
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid input in {}", path.display()))
}

fn require<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.with_context(|| format!("missing {flag}"))
}
