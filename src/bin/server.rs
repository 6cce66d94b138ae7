use std::path::PathBuf;

use quizweb::{db, server::app::run_server, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenv::dotenv().ok();
    let path = dotenv::var("DB_PATH").expect("DB_PATH must be set");
    let pool = db::establish_connection(&path).await?;
    db::run_migrations(&pool).await?;
    let static_dir =
        PathBuf::from(dotenv::var("STATIC_DIR").unwrap_or_else(|_| "static".to_owned()));
    run_server(pool, static_dir).await?;
    Ok(())
}
