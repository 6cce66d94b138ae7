use clap::{Parser, Subcommand};
use quizweb::db::queries::quizzes::{get_quizzes, import_quizzes};
use quizweb::db::queries::users::{get_users, import_users};
use quizweb::db::{Quiz, User};
use quizweb::telemetry::init_tracing;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database path
    db_path: PathBuf,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import quizzes and users from csv files
    Import { path: PathBuf },
    /// Export quizzes and users to csv files
    Export { path: PathBuf },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let db_path: PathBuf = cli.db_path;
    let pool = SqlitePool::connect(format!("sqlite:{}", db_path.display()).as_str())
        .await
        .expect("Cannot connect to DB");
    match cli.command {
        Commands::Export { path } => export_data(&pool, path).await.expect("Cannot export"),
        Commands::Import { path } => import_data(&pool, path).await.expect("Cannot import"),
        Commands::Migrate => quizweb::db::run_migrations(&pool)
            .await
            .expect("Cannot migrate"),
    }
}

fn write_to(path: PathBuf, data: Vec<impl Serialize>) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}
fn read_from<T: DeserializeOwned>(path: PathBuf) -> Result<Vec<T>, Box<dyn Error>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}
async fn export_data(pool: &SqlitePool, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let quizzes = get_quizzes(pool).await?;
    let users = get_users(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(&path)?
    }
    write_to(path.join("quizzes.csv"), quizzes)?;
    write_to(path.join("users.csv"), users)?;
    Ok(())
}

async fn import_data(pool: &SqlitePool, path: PathBuf) -> Result<(), Box<dyn Error>> {
    let quizzes: Vec<Quiz> = read_from(path.join("quizzes.csv"))?;
    let users: Vec<User> = read_from(path.join("users.csv"))?;
    import_users(pool, users).await?;
    import_quizzes(pool, quizzes).await?;
    Ok(())
}
