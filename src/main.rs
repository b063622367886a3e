//! CLI entry point for the regional weather engine.
//!
//! Provides subcommands for analysing a weather snapshot into a regional
//! report, validating a snapshot on its own, and listing the region registry.

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use regional_weather_engine::analyzers::analyzer::{Pipeline, PipelineSettings};
use regional_weather_engine::analyzers::writetos3::publish_report;
use regional_weather_engine::config::Settings;
use regional_weather_engine::infra::cohere::CohereClient;
use regional_weather_engine::narrative::NarrativeAnalyzer;
use regional_weather_engine::output::{
    RunRecord, append_history, print_json, print_pretty, write_report,
};
use regional_weather_engine::registry::{Region, default_regions, load_regions};
use regional_weather_engine::services::text_generation::TextGenerator;
use regional_weather_engine::snapshot::load_snapshot;
use regional_weather_engine::usage::{CallPacer, UsageStore};
use regional_weather_engine::validation::validate;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "regional_weather_engine")]
#[command(about = "Regional weather analysis with confidence scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a weather snapshot and write the regional report
    Analyze {
        /// Snapshot JSON file
        #[arg(short, long)]
        input: String,

        /// Report JSON file to write
        #[arg(short, long, default_value = "data/weather-analysis.json")]
        output: String,

        /// Optional: region table JSON replacing the built-in regions
        #[arg(long)]
        regions: Option<String>,

        /// Optional: CSV file to append a run summary to
        #[arg(long)]
        history: Option<String>,

        /// Maximum number of regions analysed at once
        #[arg(short, long, default_value_t = 1)]
        concurrency: usize,

        /// Optional: S3 bucket name to upload the report to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress the report before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Validate a snapshot without analysing it
    Validate {
        /// Snapshot JSON file
        #[arg(short, long)]
        input: String,

        /// Optional: file to write the sanitized snapshot to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List the regions that would be analysed
    Regions {
        /// Optional: region table JSON replacing the built-in regions
        #[arg(long)]
        regions: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/regional_weather_engine.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("regional_weather_engine.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            regions,
            history,
            concurrency,
            s3_bucket,
            gzip,
        } => {
            let regions = select_regions(regions.as_deref())?;
            analyze(
                &input,
                &output,
                regions,
                history.as_deref(),
                concurrency,
                s3_bucket.as_deref(),
                gzip,
            )
            .await?;
        }
        Commands::Validate { input, output } => {
            let raw = load_snapshot(&input)?;
            let report = validate(&raw);
            print_json(&report)?;

            if !report.is_valid {
                for e in &report.errors {
                    error!(error = %e, "Validation error");
                }
                bail!("snapshot '{}' failed validation", input);
            }
            info!(
                warnings = report.warnings.len(),
                security_score = report.security_score,
                "Snapshot is valid"
            );
            if let (Some(path), Some(sanitized)) = (output, &report.sanitized) {
                write_report(&path, sanitized)?;
                info!(path = %path, "Sanitized snapshot written");
            }
        }
        Commands::Regions { regions } => {
            let regions = select_regions(regions.as_deref())?;
            for region in &regions {
                info!(
                    region_id = %region.id,
                    region_name = %region.name,
                    lat = region.center.latitude,
                    lng = region.center.longitude,
                    radius_km = region.radius_km,
                    priority_stations = %region.priority_stations.join(","),
                    "Region"
                );
                print_pretty(region);
            }
            info!(total = regions.len(), "Region list summary");
        }
    }

    Ok(())
}

fn select_regions(path: Option<&str>) -> Result<Vec<Region>> {
    match path {
        Some(path) => {
            let regions = load_regions(path)?;
            info!(path, count = regions.len(), "Loaded region table");
            Ok(regions)
        }
        None => Ok(default_regions()),
    }
}

/// Runs the full pipeline on one snapshot and persists the results.
///
/// Nothing is written when the snapshot fails to load or validate.
#[tracing::instrument(skip(regions, history, s3_bucket), fields(input, output, concurrency))]
async fn analyze(
    input: &str,
    output: &str,
    regions: Vec<Region>,
    history: Option<&str>,
    concurrency: usize,
    s3_bucket: Option<&str>,
    gzip: bool,
) -> Result<()> {
    let settings = Settings::from_env();
    let usage = Arc::new(UsageStore::load(
        &settings.usage_file,
        settings.daily_limit,
        Utc::now().date_naive(),
    ));

    let generator: Option<Arc<dyn TextGenerator>> = match CohereClient::from_settings(&settings)? {
        Some(client) => Some(Arc::new(client)),
        None => {
            warn!("COHERE_API_KEY not set, every region will use the fallback narrative");
            None
        }
    };
    info!(
        calls_today = usage.calls(),
        remaining = usage.remaining(),
        force = settings.force,
        "Text generation budget"
    );

    let narrator = NarrativeAnalyzer::new(
        generator,
        usage.clone(),
        CallPacer::new(settings.call_delay),
        settings.force,
    );
    let pipeline = Pipeline::new(
        regions,
        narrator,
        PipelineSettings {
            concurrency,
            ..Default::default()
        },
    );

    let raw = load_snapshot(input)?;
    let result = pipeline.run(&raw, Utc::now()).await;

    if let Err(e) = usage.save() {
        warn!(error = %e, "Failed to persist API usage");
    }
    let report = result?;

    write_report(output, &report)?;
    info!(
        path = output,
        confidence = %report.achieved_confidence,
        successful = report.successful_analyses,
        fallback = report.fallback_analyses,
        "Report written"
    );

    if let Some(path) = history {
        append_history(path, &RunRecord::from_report(&report))?;
    }

    if let Some(bucket) = s3_bucket {
        let config = aws_config::load_from_env().await;
        let client = aws_sdk_s3::Client::new(&config);
        info!(bucket = %bucket, gzip, "S3 upload enabled");
        publish_report(&client, bucket, &report, gzip).await?;
    }

    Ok(())
}
