use clap::Parser;
use jambcbt::{config, db, state::AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Sets up logging to stdout and a daily-rolled file
///
/// The returned guard must be held for the lifetime of the process so
/// buffered log lines are flushed on shutdown.
fn init_tracing(debug: bool) -> tracing_appender::non_blocking::WorkerGuard {
    let default_filter = if debug { "jambcbt=debug,info" } else { "jambcbt=info,warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file_appender = tracing_appender::rolling::daily("logs", "jambcbt.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(file_writer),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load environment variables
    if std::fs::metadata(".env").is_ok() {
        dotenv::dotenv().ok();
    }

    let args = config::CliArgs::parse();
    let _guard = init_tracing(args.debug);

    let config = config::get_config(args);

    // Initialize the database pool and bring the schema up to date
    let pool = Arc::new(db::init_pool(&config.database_url));
    {
        let mut conn = pool
            .get()
            .expect("Failed to get a database connection for migrations");
        jambcbt::run_migrations(&mut conn);
    }

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .expect("Invalid bind address");

    let state = Arc::new(AppState::new(config, pool));
    let app = jambcbt::create_app(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}
