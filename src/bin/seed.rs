//! Loads credits and eligible users from CSV files into the database.

use std::path::Path;

use dotenvy::dotenv;
use tracing::{info, warn};

use event_credits::{
    infra::{
        config::SeedConfig,
        csv_import::{ImportReport, import_credits, import_users, reset},
        error::InfraError,
        postgres_persistence,
        setup::init_tracing,
    },
    use_cases::inventory::{CreditRepo, EligibleUserRepo},
};

fn read_or_empty(path: &Path) -> Result<String, InfraError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "File not found, nothing to import");
            Ok(String::new())
        }
        Err(source) => Err(InfraError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn log_report(what: &str, report: ImportReport) {
    info!(
        created = report.created,
        duplicates = report.duplicates,
        skipped = report.skipped,
        "{what} imported"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let config = SeedConfig::from_env();
    let persistence =
        postgres_persistence(&config.database_url, config.database_max_connections).await?;

    if config.reset {
        let (users, credits) = reset(&persistence, &persistence).await?;
        info!(users, credits, "Existing data removed");
    }

    let credits_csv = read_or_empty(&config.credits_csv)?;
    log_report("Credits", import_credits(&persistence, &credits_csv).await?);

    let users_csv = read_or_empty(&config.users_csv)?;
    log_report("Eligible users", import_users(&persistence, &users_csv).await?);

    let credit_counts = CreditRepo::counts(&persistence).await?;
    let user_counts = EligibleUserRepo::counts(&persistence).await?;

    println!("{}", "=".repeat(50));
    println!("FINAL STATISTICS");
    println!("{}", "=".repeat(50));
    println!("   Total credits:        {}", credit_counts.total);
    println!("   Available credits:    {}", credit_counts.available_real);
    println!("   Test credits:         {}", credit_counts.test);
    println!("   Used credits:         {}", credit_counts.used);
    println!("   Eligible users:       {}", user_counts.total);
    println!("   Approved users:       {}", user_counts.approved);
    println!("{}", "=".repeat(50));

    Ok(())
}
