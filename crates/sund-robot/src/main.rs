use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use sund_automation::{Cpr, Credentials, PgDocumentArchive, SolteqSund};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Opens a patient record in Solteq Sund and prints the journal to the document archive"
)]
struct Args {
    /// Path to the Solteq Sund executable
    #[arg(long, env = "SOLTEQ_SUND_APP_PATH")]
    app_path: PathBuf,

    /// Service account user name
    #[arg(long, env = "SOLTEQ_SUND_USERNAME")]
    username: String,

    /// Service account password
    #[arg(long, env = "SOLTEQ_SUND_PASSWORD", hide_env_values = true)]
    password: String,

    /// CPR number of the patient whose journal should be printed
    #[arg(long)]
    cpr: String,

    /// Connection string for the Solteq Sund database
    #[arg(long, env = "SOLTEQ_SUND_DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

fn init_logging() -> Result<()> {
    let log_level = env::var("LOG_LEVEL")
        .map(|level| match level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging()?;

    let cpr = Cpr::new(&args.cpr)?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&args.database_url)
        .await
        .context("connecting to the Solteq Sund database")?;
    let archive = PgDocumentArchive::new(pool);

    info!(patient = %cpr, "starting journal run");

    let session = SolteqSund::new()?
        .launch(&args.app_path)?
        .sign_in(&Credentials {
            username: args.username,
            password: args.password,
        })
        .await?;
    let patient = session.open_patient(&cpr).await?;
    patient.create_journal(&archive).await?;

    info!("journal run complete");
    Ok(())
}
