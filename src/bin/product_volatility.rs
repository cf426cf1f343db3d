use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use product_volatility::config::AnalyticsConfig;
use product_volatility::models::ProductSeries;
use product_volatility::{analyze_batch, Result};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Formats log timestamps in the local timezone instead of UTC.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

fn main() -> ExitCode {
    // RUST_LOG controls the level (default "info"); logs go to stderr so stdout stays pure JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(LocalTimer)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(input_path) = args.get(1) else {
        let program = args.first().map(String::as_str).unwrap_or("product_volatility");
        error!("Usage: {} <products.json> [config.yaml]", program);
        return ExitCode::from(2);
    };

    match run(input_path, args.get(2).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ Critical Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(input_path: &str, config_path: Option<&str>) -> Result<()> {
    let cfg = load_config(config_path)?;

    let input = fs::read_to_string(input_path)?;
    let products: Vec<ProductSeries> = serde_json::from_str(&input)?;
    info!("🚀 Loaded {} products from {}", products.len(), input_path);

    let batch = analyze_batch(&products, &cfg);

    let title = products
        .iter()
        .map(|p| p.end_date)
        .max()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "empty batch".to_string());
    info!("\n{}", batch.distribution.generate_report(&title));

    println!("{}", serde_json::to_string_pretty(&batch.products)?);
    Ok(())
}

/// An explicit path must load; otherwise `config.yaml` is used when present, else the built-in tables.
fn load_config(path: Option<&str>) -> Result<AnalyticsConfig> {
    match path {
        Some(p) => AnalyticsConfig::load(p),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => AnalyticsConfig::load(DEFAULT_CONFIG_PATH),
        None => {
            info!("No config file given, using built-in policy tables.");
            Ok(AnalyticsConfig::default())
        }
    }
}
