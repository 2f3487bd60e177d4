//! SLA Monitor process binary
//!
//! Loads configuration, builds the shared `Core`, exposes the read-only
//! HTTP surface over `sla-monitor-reader`, and drives the cycle scheduler
//! and maintenance loop for the lifetime of the process.

use std::path::PathBuf;
use std::sync::Arc;

use sla_monitor_registry::EndpointRegistry;
use sla_monitor_scheduler::{Core, CoreConfig};
use sla_monitor_server::{create_router, AppState};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Fatal startup error: invalid config, database unreachable. §6.
const EXIT_STARTUP_ERROR: i32 = 1;
/// Interrupted with a clean drain. §6.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => std::process::exit(0),
        Err(StartupOrRuntimeError::Startup(e)) => {
            eprintln!("fatal startup error: {e}");
            std::process::exit(EXIT_STARTUP_ERROR);
        }
        Err(StartupOrRuntimeError::Interrupted) => std::process::exit(EXIT_INTERRUPTED),
    }
}

enum StartupOrRuntimeError {
    Startup(anyhow::Error),
    Interrupted,
}

async fn run() -> Result<(), StartupOrRuntimeError> {
    let descriptor_path = std::env::var("ENDPOINT_DESCRIPTOR_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./endpoints.env"));

    let loaded = EndpointRegistry::load(&descriptor_path)
        .map_err(|e| StartupOrRuntimeError::Startup(anyhow::anyhow!(e)))?;

    init_tracing(&loaded.config.log_level, loaded.config.log_file.as_deref(), &loaded.config.node_env);

    tracing::info!(services = loaded.services.len(), "resolved endpoint registry");

    let pool = sla_monitor_storage::connect_and_migrate(&loaded.config.database_url)
        .await
        .map_err(|e| StartupOrRuntimeError::Startup(anyhow::anyhow!(e)))?;

    let core_config = CoreConfig {
        cycle_interval: loaded.config.cycle_interval,
        maintenance_interval: sla_monitor_scheduler::maintenance::DEFAULT_MAINTENANCE_INTERVAL,
        dispatcher: sla_monitor_dispatcher::DispatcherConfig {
            enabled: loaded.config.auto_detection.enabled,
            monitor_api_url: loaded.config.auto_detection.monitor_api_url.clone(),
            timeout: loaded.config.auto_detection.timeout,
        },
    };

    let core = Core::bootstrap(pool.clone(), loaded.services, core_config)
        .await
        .map_err(|e| StartupOrRuntimeError::Startup(anyhow::anyhow!(e)))?;
    let core = Arc::new(core);

    let state = AppState {
        pool,
        sla_target: loaded.config.sla_target,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true)))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    let addr = format!("0.0.0.0:{}", loaded.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StartupOrRuntimeError::Startup(anyhow::anyhow!(e)))?;
    tracing::info!(%addr, "sla-monitor-server listening");

    let core_for_loop = Arc::clone(&core);
    let core_run = tokio::spawn(async move { core_for_loop.run().await });

    let interrupted = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let interrupted_flag = Arc::clone(&interrupted);
    let cancel_for_signal = core.cancellation_token();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("shutdown signal received, draining in-flight probes");
        interrupted_flag.store(true, std::sync::atomic::Ordering::SeqCst);
        cancel_for_signal.cancel();
    });

    let server =
        axum::serve(listener, app).with_graceful_shutdown(core.cancellation_token().cancelled_owned());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "http server exited with an error");
    }

    core.shutdown();
    if let Err(e) = core_run.await {
        tracing::error!(error = %e, "core run loop task panicked");
    }

    if interrupted.load(std::sync::atomic::Ordering::SeqCst) {
        Err(StartupOrRuntimeError::Interrupted)
    } else {
        Ok(())
    }
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

fn init_tracing(log_level: &str, log_file: Option<&str>, node_env: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(path) = log_file {
        let path = PathBuf::from(path);
        let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
        let file_name = path.file_name().and_then(|f| f.to_str()).unwrap_or("sla-monitor.log");
        let appender = tracing_appender::rolling::never(directory, file_name);

        registry
            .with(tracing_subscriber::fmt::layer().with_writer(appender).json())
            .init();
    } else if node_env == "production" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
