//! vinos-load - load a wine CSV into the `vinos` table
//!
//! Reads a semicolon-separated file with comma decimals, normalizes its
//! headers, requires every feature column and inserts all rows in batches.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;
use vinos_common::config::{resolve_database_url, DEFAULT_SECRETS_PATH};
use vinos_common::schema::normalize;
use vinos_common::validator::validate;
use vinos_common::{db, DecimalStyle, RawTable};

#[derive(Debug, Parser)]
#[command(name = "vinos-load", version, about = "Load a wine CSV into the vinos table")]
struct Args {
    /// CSV file to load
    #[arg(long, default_value = "data/vinos.csv")]
    csv: PathBuf,

    /// Database connection string; falls back to the secret store
    #[arg(long, env = "VINOS_DATABASE_URL")]
    database_url: Option<String>,

    /// Secret store consulted when no URL is given
    #[arg(long, default_value = DEFAULT_SECRETS_PATH)]
    secrets: PathBuf,

    /// Field delimiter
    #[arg(long, default_value_t = ';')]
    delimiter: char,

    /// Decimal convention of numeric cells ("comma" or "point")
    #[arg(long, default_value = "comma")]
    decimal: DecimalStyle,

    /// Rows per transaction
    #[arg(long, default_value_t = 1000)]
    batch_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let inserted = run(&args).await?;
    println!("Inserted {} rows into {}", inserted, db::TABLE_NAME);
    Ok(())
}

async fn run(args: &Args) -> Result<usize> {
    if !args.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got {:?}", args.delimiter);
    }

    let url = match &args.database_url {
        Some(url) => url.clone(),
        None => resolve_database_url(&args.secrets)?,
    };

    let file = File::open(&args.csv)
        .with_context(|| format!("Failed to open {}", args.csv.display()))?;
    let table = RawTable::from_csv_reader(file, args.delimiter as u8)?;
    info!("Read {} rows from {}", table.len(), args.csv.display());

    let samples = validate(&normalize(&table, args.decimal)?)?;

    db::create_vinos_table(&url).await?;
    let inserted = db::insert_samples(&url, &samples, args.batch_size).await?;
    info!("Loaded {} rows", inserted);

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["vinos-load", "--database-url", "sqlite://x.db"]).unwrap();
        assert_eq!(args.csv, PathBuf::from("data/vinos.csv"));
        assert_eq!(args.delimiter, ';');
        assert_eq!(args.decimal, DecimalStyle::Comma);
        assert_eq!(args.batch_size, 1000);
    }

    #[tokio::test]
    async fn test_run_loads_sample_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("vinos.db").display());
        let csv = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/vinos.csv");
        let args =
            Args::try_parse_from(["vinos-load", "--csv", csv, "--database-url", url.as_str()])
                .unwrap();

        assert_eq!(run(&args).await.unwrap(), 10);
        let table = db::fetch_samples(&url, None).await.unwrap();
        assert_eq!(table.len(), 10);
    }
}
