use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use moments_backend::{app, config::settings::Settings, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::new();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    info!("database connected");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState {
        pool,
        settings: settings.clone(),
    };

    let app = app(app_state);

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
