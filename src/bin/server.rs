use std::{net::SocketAddr, process::exit};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use finance_tracker::{AppConfig, AppState, build_router, graceful_shutdown, logging_middleware};

const MAX_TOKEN_LIFETIME_MINUTES: i64 = 365 * 24 * 60;

/// The REST API server for finance_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "finance.db")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// The secret used to sign bearer tokens.
    ///
    /// An insecure built-in secret is used if this is not set.
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// How many minutes an issued token is valid for, at most one year.
    #[arg(
        long,
        default_value_t = 60,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_LIFETIME_MINUTES)
    )]
    token_lifetime_minutes: i64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    let config = AppConfig::new(
        args.secret_key,
        Duration::minutes(args.token_lifetime_minutes),
    );
    let state = match AppState::new(conn, &config) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
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

    use super::{Args, MAX_TOKEN_LIFETIME_MINUTES};

    #[test]
    fn token_lifetime_defaults_to_an_hour() {
        let args = Args::try_parse_from(["server"]).expect("default args should parse");

        assert_eq!(args.token_lifetime_minutes, 60);
    }

    #[test]
    fn accepts_token_lifetime_of_one_year() {
        let max = MAX_TOKEN_LIFETIME_MINUTES.to_string();

        let args = Args::try_parse_from(["server", "--token-lifetime-minutes", &max])
            .expect("one year should be accepted");

        assert_eq!(args.token_lifetime_minutes, MAX_TOKEN_LIFETIME_MINUTES);
    }

    #[test]
    fn rejects_token_lifetime_out_of_range() {
        let too_long = (MAX_TOKEN_LIFETIME_MINUTES + 1).to_string();

        for minutes in ["0", "-5", too_long.as_str(), "1000000000000"] {
            assert!(
                Args::try_parse_from(["server", "--token-lifetime-minutes", minutes]).is_err(),
                "want {minutes} to be rejected"
            );
        }
    }
}
