use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use clap::{Parser, Subcommand};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod classification;
mod config;
mod db;
mod forecasting;
mod models;
mod routes;
mod services;
mod validation;

use config::AppConfig;

const DEFAULT_CONFIG_PATH: &str = "demandcast.toml";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub services: services::Services,
    pub registry: Arc<forecasting::ModelRegistry>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // One shared HTTP client for all outbound pipeline requests;
        // reqwest keeps per-host connection pools internally.
        let http_client = reqwest::Client::new();

        let db = Arc::new(db::DbPool::from_config(&config.database).await?);
        db.run_migrations().await?;

        // The pipeline handle is process-local; whoever initializes it
        // first wins, everyone else shares it.
        let chronos = forecasting::ChronosPipeline::global(
            http_client,
            config.forecasting.chronos.endpoint.clone(),
            Duration::from_secs(config.forecasting.chronos.timeout_secs),
        );

        let registry = Arc::new(forecasting::ModelRegistry::new(
            config.forecasting.croston_alpha,
            config.forecasting.min_max_floor,
            config.forecasting.min_max_ceiling,
            chronos,
        ));

        let services =
            services::Services::new(db.clone(), registry.clone(), config.forecasting.clone());

        Ok(Self {
            db,
            services,
            registry,
        })
    }
}

fn build_app(config: &AppConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .with_state(state)
}

#[derive(Parser)]
#[command(name = "demandcast", version, about = "SKU demand forecasting service")]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Run pending database migrations and exit.
    Migrate,
    /// Write a default configuration file.
    Init {
        /// Output path for the config file.
        #[arg(short, long)]
        output: Option<String>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Init { output, force }) => {
            run_init(output, force);
        }
        Some(Command::Migrate) => {
            run_migrate(args.config.as_deref()).await;
        }
        Some(Command::Serve) | None => {
            run_server(args.config.as_deref()).await;
        }
    }
}

fn load_config(explicit_path: Option<&str>) -> AppConfig {
    let path = explicit_path.unwrap_or(DEFAULT_CONFIG_PATH);
    if std::path::Path::new(path).exists() {
        match AppConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config from {path}: {e}");
                std::process::exit(1);
            }
        }
    } else if explicit_path.is_some() {
        eprintln!("Config file not found: {path}");
        std::process::exit(1);
    } else {
        AppConfig::default()
    }
}

fn init_tracing(config: &config::ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn run_init(output: Option<String>, force: bool) {
    let output_path = PathBuf::from(output.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()));

    if output_path.exists() && !force {
        eprintln!(
            "Config file already exists: {}\nUse --force to overwrite.",
            output_path.display()
        );
        std::process::exit(1);
    }

    let rendered = match AppConfig::default_toml() {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Failed to render default config: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::write(&output_path, rendered) {
        eprintln!("Failed to write config file: {e}");
        std::process::exit(1);
    }

    println!("Created config file: {}", output_path.display());
    println!();
    println!("To start the service, run:");
    println!("  demandcast serve --config {}", output_path.display());
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);
    init_tracing(&config.observability);

    let db = match db::DbPool::from_config(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = db.run_migrations().await {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }

    tracing::info!("Migrations complete");
}

async fn run_server(explicit_config_path: Option<&str>) {
    let config = load_config(explicit_config_path);
    init_tracing(&config.observability);

    tracing::info!(
        database = %config.database.path,
        chronos_endpoint = %config.forecasting.chronos.endpoint,
        "Starting demand forecasting service"
    );

    let state = AppState::new(config.clone())
        .await
        .expect("Failed to initialize application state");

    let app = build_app(&config, state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
