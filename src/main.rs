use std::sync::Arc;

use coursemart::{
    AppState, LogNotifier, NotifierState, PostgresStore, SearchState, StoreSearch, StoreState,
    config::{AppConfig, Env},
    create_router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: incomplete environment configuration");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coursemart=debug,tower_http=info,axum=trace".into());

    // Pretty output for local debugging, JSON for log aggregation in
    // production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let store = Arc::new(PostgresStore::new(pool)) as StoreState;
    let search = Arc::new(StoreSearch::new(store.clone())) as SearchState;
    let notifier = Arc::new(LogNotifier) as NotifierState;

    let app_state = AppState {
        store,
        search,
        notifier,
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
