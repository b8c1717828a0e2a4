use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

use bulletin::{
    repositories::{EventRepository, SessionRepository, UserRepository},
    routes::create_router,
    state::AppState,
    sweeper::SessionSweeper,
};

/// Hourly, at the top of the hour.
const DEFAULT_SWEEP_SCHEDULE: &str = "0 0 * * * *";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting bulletin service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let user_repository = UserRepository::new(pool.clone());
    let session_repository = SessionRepository::new(pool.clone());
    let event_repository = EventRepository::new(pool.clone());

    // Best-effort bootstrap of the default admin account
    if let Err(e) = user_repository.ensure_seed_admin().await {
        warn!("Failed to seed admin account: {}", e);
    }

    // Start the session sweep scheduler
    let sweep_schedule = std::env::var("SESSION_SWEEP_SCHEDULE")
        .unwrap_or_else(|_| DEFAULT_SWEEP_SCHEDULE.to_string());
    let sweeper = SessionSweeper::new(session_repository.clone());
    let mut scheduler = sweeper.start(&sweep_schedule).await?;

    info!("Bulletin service initialized successfully");

    let app_state = AppState {
        db_pool: pool,
        user_repository,
        session_repository,
        event_repository,
    };

    // Start the web server
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Bulletin service listening on 0.0.0.0:3000");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down bulletin service");
        })
        .await?;

    scheduler.shutdown().await?;

    Ok(())
}
