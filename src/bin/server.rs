use std::{fs::OpenOptions, net::SocketAddr, process::ExitCode, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppState, Config, ConnectionPool, DisabledMailer, Mailer, SmtpMailer, build_router,
    graceful_shutdown, logging_middleware,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    let pool = match ConnectionPool::open(&config.db_path, config.pool_size) {
        Ok(pool) => pool,
        Err(error) => {
            tracing::error!(
                "Could not open database {}: {error}",
                config.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let mailer: Arc<dyn Mailer> = match config.smtp_config() {
        Some(smtp_config) => match SmtpMailer::new(&smtp_config) {
            Ok(mailer) => {
                tracing::info!(
                    "Sending summary emails through {}:{}",
                    smtp_config.host,
                    smtp_config.port
                );
                Arc::new(mailer)
            }
            Err(error) => {
                tracing::error!("Could not configure SMTP: {error}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            tracing::warn!("SMTP_HOST is not set, summary emails are disabled");
            Arc::new(DisabledMailer)
        }
    };

    let state = AppState::new(pool.clone(), mailer, config.pagination_config());
    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let addr = SocketAddr::from((config.host, config.port));
    tracing::info!("HTTP server listening on {addr}");

    let result = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await;

    pool.close();
    tracing::info!("Server stopped");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("Server error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logging() -> Result<(), std::io::Error> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
