use std::{env, fs::OpenOptions, net::SocketAddr, process::ExitCode, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use golden_eggs::{
    AppState, DEFAULT_INITIAL_BALANCE, DEFAULT_PARENT_PASSWORD, DEFAULT_PARENT_SESSION_DURATION,
    DEFAULT_TIMEZONE, RewardsConfig, build_router, graceful_shutdown,
};

const MAX_SESSION_MINUTES: i64 = 365 * 24 * 60;

/// The web server for the Golden Eggs rewards app.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The balance to start with when no balance has been saved yet.
    #[arg(long, default_value_t = DEFAULT_INITIAL_BALANCE)]
    initial_balance: u64,

    /// The password that opens the parent panel.
    #[arg(long, default_value = DEFAULT_PARENT_PASSWORD)]
    parent_password: String,

    /// How many minutes the parent panel stays unlocked for, at most one year.
    #[arg(
        long,
        default_value_t = DEFAULT_PARENT_SESSION_DURATION.whole_minutes(),
        value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_MINUTES)
    )]
    session_minutes: i64,

    /// The canonical timezone used to date rewards, e.g. "Pacific/Auckland".
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let Ok(secret) = env::var("SECRET") else {
        tracing::error!("The environment variable 'SECRET' must be set");
        return ExitCode::FAILURE;
    };

    let config = match RewardsConfig::new(
        args.initial_balance,
        &args.parent_password,
        Duration::minutes(args.session_minutes),
        &args.timezone,
    ) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Could not load the configuration: {error}");
            return ExitCode::FAILURE;
        }
    };

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open the database at {}: {error}", args.db_path);
            return ExitCode::FAILURE;
        }
    };

    let app_state = match AppState::new(conn, &secret, config) {
        Ok(app_state) => app_state,
        Err(error) => {
            tracing::error!("Could not set up the app: {error}");
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => Some(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        ),
        Err(error) => {
            eprintln!("Could not create log file, logging to stdout only: {error}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
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

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Args, MAX_SESSION_MINUTES};

    fn parse_session_minutes(minutes: &str) -> Result<Args, clap::Error> {
        Args::try_parse_from([
            "server",
            "--db-path",
            "test.db",
            "--session-minutes",
            minutes,
        ])
    }

    #[test]
    fn session_minutes_defaults_to_fifteen() {
        let args = Args::try_parse_from(["server", "--db-path", "test.db"]).unwrap();

        assert_eq!(args.session_minutes, 15);
    }

    #[test]
    fn session_minutes_accepts_up_to_a_year() {
        let args = parse_session_minutes(&MAX_SESSION_MINUTES.to_string()).unwrap();

        assert_eq!(args.session_minutes, MAX_SESSION_MINUTES);
    }

    #[test]
    fn session_minutes_too_large_for_a_duration_is_rejected() {
        assert!(parse_session_minutes("99999999999999").is_err());
        assert!(parse_session_minutes(&(MAX_SESSION_MINUTES + 1).to_string()).is_err());
    }

    #[test]
    fn session_minutes_must_be_positive() {
        assert!(parse_session_minutes("0").is_err());
        assert!(parse_session_minutes("-5").is_err());
    }
}
