use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use via::{RoutesModuleRegistry, Via, ViaApp};
use via_bootstrap::{AppConfig, AppConfigProvider, CliArgs};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

mod site;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Adapter to make `AppConfigProvider` implement `via::ConfigProvider`.
struct ViaConfigAdapter(Arc<AppConfigProvider>);

impl via::ConfigProvider for ViaConfigAdapter {
    fn get_config_raw(&self, key: &str) -> Option<serde_json::Value> {
        via_bootstrap::ConfigProvider::get_config_raw(self.0.as_ref(), key)
    }
}

/// Via Server - serves the routes declared by the configured routes module
#[derive(Parser)]
#[command(name = "via-server")]
#[command(about = "Via Server - serves the routes declared by the configured routes module")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Routes module override (sets VIA_ROUTES_MODULE)
    #[arg(short, long)]
    routes_module: Option<String>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration, register routes and exit
    Check,
    /// List declared routes modules
    Modules,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        routes_module: cli.routes_module.clone(),
    };

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (APP__*) -> 4) CLI overrides
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    via_bootstrap::logging::init_logging(&logging_config, Path::new(&config.server.home_dir));

    tracing::info!("Via Server starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
        Commands::Modules => list_modules(),
    }
}

/// Discover routes modules and register the configured one on a fresh application.
fn build_app(config: &AppConfig) -> Result<ViaApp> {
    let modules = Arc::new(RoutesModuleRegistry::discover()?);
    let provider = Arc::new(ViaConfigAdapter(Arc::new(AppConfigProvider::new(
        config.clone(),
    ))));

    let mut app = ViaApp::new(provider, modules.clone());
    Via::new(modules)
        .init_app(&mut app)
        .context("Route registration failed")?;
    Ok(app)
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Registering routes…");
    let app = build_app(&config)?;
    tracing::info!(routes = app.route_count(), "Routes ready");

    let mut router = app
        .into_router()
        .layer(tower_http::trace::TraceLayer::new_for_http());
    if config.server.timeout_sec > 0 {
        router = router.layer(tower_http::timeout::TimeoutLayer::new(Duration::from_secs(
            config.server.timeout_sec,
        )));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = via_bootstrap::wait_for_shutdown().await {
                tracing::error!(error = %e, "Signal handling failed; shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("Via Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration…");
    let app = build_app(&config)?;
    println!("Configuration is valid");
    for (endpoint, path) in app.endpoints() {
        println!("{endpoint:<24} {path}");
    }
    Ok(())
}

fn list_modules() -> Result<()> {
    let modules = RoutesModuleRegistry::discover()?;
    for path in modules.paths() {
        println!("{path}");
    }
    Ok(())
}
