//! # forecast_service
//!
//! Serve predictions over HTTP or run the pipeline from the command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use forecast_service::{router, AppState};
use sarima_forecast::export::export_forecast;
use sarima_forecast::metrics::forecast_accuracy;
use sarima_forecast::models::{ArimaOrder, OrderCandidate, SeasonalOrder};
use sarima_forecast::{pipeline, FileModelRegistry, ForecastConfig};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forecast_service")]
#[command(about = "SARIMA forecast of monthly alcohol-related accidents", long_about = None)]
struct Cli {
    /// JSON configuration file (environment variables and flags take precedence)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Overrides {
    /// Source CSV table
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Model document location
    #[arg(long, global = true)]
    model_path: Option<PathBuf>,

    /// First month of the test split (YYYY-MM-DD)
    #[arg(long, global = true)]
    cutoff: Option<chrono::NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Bind host (default: $HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (default: $PORT or 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Search the order grid and store the best model
    Retrain {
        /// Largest non-seasonal order
        #[arg(long)]
        max_order: Option<usize>,

        /// Largest seasonal order
        #[arg(long)]
        max_seasonal_order: Option<usize>,

        /// Fit candidates one after another
        #[arg(long)]
        sequential: bool,

        /// Refit the winner with stationarity and invertibility enforced
        #[arg(long)]
        enforce_final: bool,
    },

    /// Score the stored model on the test split
    Evaluate {
        /// Write actual and forecast values to this CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Fit one order and store it
    Fit {
        /// Non-seasonal order p,d,q
        #[arg(long, default_value = "2,1,2")]
        order: ArimaOrder,

        /// Seasonal order P,D,Q,s
        #[arg(long, default_value = "0,2,2,12")]
        seasonal: SeasonalOrder,
    },

    /// Predict a single month with the stored model
    Predict {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,
    },
}

impl Overrides {
    fn apply(self, mut config: ForecastConfig) -> ForecastConfig {
        if let Some(dataset) = self.dataset {
            config.dataset_path = dataset;
        }
        if let Some(model_path) = self.model_path {
            config.model_path = model_path;
        }
        if let Some(cutoff) = self.cutoff {
            config.cutoff = cutoff;
        }
        config
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "forecast_service=info,sarima_forecast=info,tower_http=info".into()
            }),
        )
        .init();
}

fn bind_address(host: Option<String>, port: Option<u16>) -> Result<SocketAddr> {
    let host = host
        .or_else(|| env::var("HOST").ok())
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port = match port {
        Some(port) => port,
        None => env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("PORT must be a valid number")?,
    };

    format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", host, port))
}

async fn serve(config: ForecastConfig, addr: SocketAddr) -> Result<()> {
    let app = router(AppState::from_config(config));

    tracing::info!("forecast_service v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ForecastConfig::load(cli.config.as_deref())?;
    let mut config = cli.overrides.apply(config);
    let registry = FileModelRegistry::new(&config.model_path);

    match cli.command {
        Commands::Serve { host, port } => {
            let addr = bind_address(host, port)?;
            serve(config, addr).await?;
        }
        Commands::Retrain {
            max_order,
            max_seasonal_order,
            sequential,
            enforce_final,
        } => {
            if let Some(max_order) = max_order {
                config.max_order = max_order;
            }
            if let Some(max_seasonal_order) = max_seasonal_order {
                config.max_seasonal_order = max_seasonal_order;
            }
            config.parallel &= !sequential;
            config.enforce_final_constraints |= enforce_final;

            let report = tokio::task::spawn_blocking(move || pipeline::retrain(&config, &registry))
                .await??;
            println!(
                "Best model {} with AIC {:.3} ({} candidates, {} skipped)",
                report.order, report.aic, report.evaluated, report.failed
            );
        }
        Commands::Evaluate { export } => {
            let (prepared, result) = pipeline::evaluate_persisted(&config, &registry)?;
            println!(
                "Mean absolute error over {} months: {:.3}",
                result.len(),
                result.mean_absolute_error()
            );
            print!("{}", forecast_accuracy(result.values(), prepared.test.values())?);

            if let Some(path) = export {
                let rows = export_forecast(&path, &prepared.full, &result)?;
                println!("Wrote {} rows to {}", rows, path.display());
            }
        }
        Commands::Fit { order, seasonal } => {
            let candidate = OrderCandidate::new(order, seasonal);
            let model = pipeline::fit_fixed(&config, candidate, &registry)?;
            println!("Stored {} with AIC {:.3}", candidate, model.aic());
        }
        Commands::Predict { year, month } => {
            let value = pipeline::predict_count(&registry, year, month)?;
            println!("{}-{:02}: {}", year, month, value);
        }
    }

    Ok(())
}
