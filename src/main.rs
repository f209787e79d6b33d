use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use trips::config::AppConfig;
use trips::db::init_pool;
use trips::error::AppError;
use trips::routes::create_router;
use trips::services::{reviews::ReviewService, trips::TripService};
use trips::state::AppState;
use trips::store::{SqliteReviewStore, SqliteTripStore, TripStore};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;

    if let Err(err) = sqlx::migrate!("./migrations").run(&db).await {
        error!("migration failed: {err:?}");
        return Err(AppError::Other(err.into()));
    }

    let trip_store: Arc<dyn TripStore> = Arc::new(SqliteTripStore::new(db.clone()));
    let trip_service = TripService::new(trip_store.clone());
    let review_service =
        ReviewService::new(trip_store, Arc::new(SqliteReviewStore::new(db.clone())));

    let state = AppState::new(config.clone(), db, trip_service, review_service);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,trips=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
