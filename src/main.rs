// ==========================================
// Nutri Hospital - CLI entry point
// ==========================================
// Subcommands: import, status, reset, report, overview, export, catalog
// ==========================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use nutri_hospital::app::{get_default_db_path, AppState};
use nutri_hospital::domain::EntityCounts;
use nutri_hospital::{logging, APP_NAME, VERSION};

#[derive(Parser)]
#[command(
    name = "nutri-hospital",
    version,
    about = "Hospital registry, nutrition questionnaire and spreadsheet import"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database file (default: NUTRI_HOSPITAL_DB_PATH or the user data dir).
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the one-time import of the four data sheets.
    Import {
        /// Directory holding the sheets (overrides config).
        #[arg(long = "data-dir", value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Show whether the import has run and its stored summary.
    Status,

    /// Delete all data and clear the import flag.
    Reset {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Print the report of one hospital.
    Report {
        #[arg(value_name = "HOSPITAL_ID")]
        hospital_id: i64,
    },

    /// Print totals and product units per brand.
    Overview,

    /// Write all tables as CSV files into a directory.
    Export {
        #[arg(value_name = "OUT_DIR")]
        out_dir: PathBuf,
    },

    /// List catalog brands, or the products of one brand.
    Catalog {
        #[arg(long, value_name = "NAME")]
        brand: Option<String>,

        /// Directory holding the catalog workbook (overrides config).
        #[arg(long = "data-dir", value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },
}

fn print_counts(name: &str, counts: &EntityCounts) {
    println!("  {:<10} {}", name, counts);
}

async fn run(cli: Cli) -> Result<()> {
    let db_path = match cli.db {
        Some(path) => path.to_string_lossy().to_string(),
        None => get_default_db_path(),
    };
    let state = AppState::new(db_path.clone())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize app state")?;
    tracing::debug!(db_path = %db_path, "database ready");

    match cli.command {
        Command::Import { data_dir } => {
            let settings = state.import_settings(data_dir.as_deref()).await?;
            let summary = state.import_api(settings).run_import().await?;
            if summary.already_imported {
                println!("Import already done; nothing was read or written.");
                println!("Run `nutri-hospital reset --yes` first to import again.");
                return Ok(());
            }
            println!("Import finished in {} ms (run {})", summary.elapsed_ms, summary.run_id);
            print_counts("hospitals", &summary.hospitals);
            print_counts("contacts", &summary.contacts);
            print_counts("survey", &summary.survey);
            print_counts("products", &summary.products);
        }

        Command::Status => {
            let settings = state.import_settings(None).await?;
            let status = state.import_api(settings).status().await?;
            match status.completed_at {
                Some(at) if status.done => println!("Import done at {}", at.to_rfc3339()),
                _ => println!("Import not done"),
            }
            if let Some(summary) = status.last_summary {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }

        Command::Reset { yes } => {
            let settings = state.import_settings(None).await?;
            let counts = state.import_api(settings).reset(yes).await?;
            println!(
                "Deleted {} hospitals, {} contacts, {} questionnaires, {} products",
                counts.hospitals, counts.contacts, counts.survey, counts.products
            );
        }

        Command::Report { hospital_id } => {
            let report = state.report_service.hospital_report(hospital_id)?;
            print!("{}", report);
        }

        Command::Overview => {
            let overview = state.report_service.overview()?;
            print!("{}", overview);
        }

        Command::Export { out_dir } => {
            let summary = state.report_service.export_csv(&out_dir)?;
            for file in &summary.files {
                println!("{}", file.display());
            }
        }

        Command::Catalog { brand, data_dir } => {
            let settings = state.import_settings(data_dir.as_deref()).await?;
            let catalog = state.product_catalog(&settings);
            let lines = match brand {
                Some(brand) => catalog.products_for_brand(&brand)?,
                None => catalog.brands()?,
            };
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match cli.log_format {
        LogFormatArg::Pretty => logging::init(),
        LogFormatArg::Json => logging::init_json(),
    }
    tracing::debug!("{} {}", APP_NAME, VERSION);

    if let Err(error) = run(cli).await {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
