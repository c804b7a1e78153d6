use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circulation_desk::services::sweep_service;
use circulation_desk::{config, db, seed, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "circulation_desk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    // One-shot sweep for cron-style invocation
    if std::env::args().any(|arg| arg == "--sweep-overdue") {
        match sweep_service::sweep_overdue(&db, chrono::Utc::now()).await {
            Ok(updated) => {
                println!("Updated {} borrow records to overdue status", updated);
                return;
            }
            Err(e) => {
                tracing::error!("Overdue sweep failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    if config.sweep_interval_secs > 0 {
        let sweeper_db = db.clone();
        let interval = Duration::from_secs(config.sweep_interval_secs);
        tokio::spawn(async move {
            sweep_service::run_sweeper(sweeper_db, interval).await;
        });
    } else {
        tracing::info!("Background overdue sweep disabled via SWEEP_INTERVAL_SECS=0");
    }

    let app = server::build_router(db, &config.cors_allowed_origins);

    if let Err(e) = server::serve(app, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
