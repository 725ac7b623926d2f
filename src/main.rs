use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dormitory::infrastructure::AppState;
use dormitory::services::user_service;
use dormitory::{config, db, seed, server};

#[tokio::main]
async fn main() {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dormitory=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::from_env();

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(admin) = &config.admin {
        match user_service::ensure_admin(&db, &admin.username, &admin.password, &admin.email).await
        {
            Ok(true) => tracing::info!("Administrator '{}' created", admin.username),
            Ok(false) => tracing::debug!("Administrator already present"),
            Err(e) => tracing::error!("Failed to bootstrap administrator: {}", e),
        }
    }

    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        }
    }

    let state = AppState::new(db, config.auth.clone());
    let app = server::build_router(state, &config.cors_allowed_origins);

    if let Err(e) = server::serve(app, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
