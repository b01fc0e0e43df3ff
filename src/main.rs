use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Local;
use clap::Parser;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use meal_signup::{
    config::Config,
    models::week::WeekResolver,
    routes,
    services::{claims::ClaimService, sheets::SheetsClient, week_scheduler},
    state::WeekSnapshot,
    AppState,
};

#[derive(Parser, Debug)]
#[command(name = "signup", about = "Weekly meal sign-up sheet")]
struct Args {
    /// Log week resolution, raw sheet rows, and every cell write decision
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let sheets = SheetsClient::new(&config.service_account_key, &config.spreadsheet_id)?;
    info!("Sheets client ready for spreadsheet {}", config.spreadsheet_id);

    let resolver = WeekResolver::new(config.anchor_date, config.week_offset);
    let initial = resolver.resolve(Local::now().date_naive());

    let state = AppState {
        config: config.clone(),
        claims: Arc::new(ClaimService::new(sheets)),
        resolver,
        week: Arc::new(RwLock::new(WeekSnapshot::pending(initial))),
    };

    week_scheduler::refresh(&state).await;
    week_scheduler::start(state.clone());

    let app = Router::new()
        .route("/", get(routes::signup::show_week))
        .route("/claims", post(routes::signup::submit_claims))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .nest_service("/assets", ServeDir::new(&config.assets_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Meal sign-up listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
