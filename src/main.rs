use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use roster_vcards::address::{self, AddressTagger, HeuristicTagger};
use roster_vcards::aggregate::{self, RowErrorPolicy};
use roster_vcards::config::{self, Settings};
use roster_vcards::input;
use roster_vcards::metrics::{new_run_id, RunTracker};
use roster_vcards::output::{self, TableFormat};

#[derive(Parser)]
#[command(name = "roster_vcards", about = "Roster CSV to vCards, grouped by ZIP code")]
struct Cli {
    /// Settings file (default: ./roster.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Roster CSV
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,
    /// Treat the first CSV row as data
    #[arg(long, global = true)]
    no_header: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group every card by district ZIP code into one table
    ZipTable {
        /// Output path (default: reps.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<TableFormat>,
        /// Key for rows with no recognizable ZIP code
        #[arg(long)]
        no_zip_key: Option<String>,
        /// Log and skip rows with an unknown party instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Write one .vcf per person
    Vcards {
        /// Output directory (default: vcards)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Print the ZIP code found in an address
    Zip {
        address: Vec<String>,
        /// Also print every token with its label
        #[arg(long)]
        tokens: bool,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

fn policy(settings: &Settings, skip_invalid: bool) -> RowErrorPolicy {
    if skip_invalid {
        RowErrorPolicy::Skip
    } else {
        settings.on_row_error
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        settings.input = input;
    }
    if cli.no_header {
        settings.has_header = false;
    }
    info!(settings = ?settings, "Starting roster processor");

    let tagger = HeuristicTagger::with_max_tokens(settings.max_address_tokens);
    let t0 = Instant::now();

    match cli.command {
        Commands::ZipTable {
            output: out_path,
            format,
            no_zip_key,
            skip_invalid,
        } => {
            if let Some(f) = format {
                settings.table_format = f;
                if out_path.is_none() {
                    settings.zip_table.set_extension(f.extension());
                }
            }
            if let Some(o) = out_path {
                settings.zip_table = o;
            }
            if let Some(k) = no_zip_key {
                settings.no_zip_key = k;
            }
            let policy = policy(&settings, skip_invalid);

            println!("Roster ZIP Table");
            println!("================\n");
            let rows = input::read_rows(&settings.input, settings.has_header)?;
            println!("Loaded {} rows from {:?}\n", rows.len(), settings.input);

            let (table, tracker) =
                aggregate::aggregate_rows(&rows, &tagger, policy, new_run_id())?;
            if table.is_empty() {
                warn!(input = ?settings.input, "no cards to group");
            }
            output::write_zip_table(
                settings.table_format,
                &settings.zip_table,
                &table,
                &settings.no_zip_key,
            )?;
            tracker.report();
            println!(
                "\nWrote {} keys to {:?} in {:.1}s",
                table.len(),
                settings.zip_table,
                t0.elapsed().as_secs_f64()
            );
        }
        Commands::Vcards { dir, skip_invalid } => {
            if let Some(d) = dir {
                settings.vcard_dir = d;
            }
            let policy = policy(&settings, skip_invalid);

            println!("Roster vCards");
            println!("=============\n");
            let rows = input::read_rows(&settings.input, settings.has_header)?;
            println!("Loaded {} rows from {:?}\n", rows.len(), settings.input);

            let mut tracker = RunTracker::new(new_run_id());
            let records = aggregate::build_records(&rows, policy, &mut tracker)?;
            let written = output::write_vcards(&settings.vcard_dir, &records)?;
            tracker.report();
            println!(
                "\nWrote {} cards to {:?} in {:.1}s",
                written,
                settings.vcard_dir,
                t0.elapsed().as_secs_f64()
            );
        }
        Commands::Zip {
            address: words,
            tokens,
        } => {
            let text = words.join(" ");
            if tokens {
                for token in tagger.tag(&text)? {
                    println!("{:<28} {}", token.label.as_str(), token.text);
                }
            }
            match address::extract_postal_code(&tagger, &text)? {
                Some(code) => println!("{code}"),
                None => println!("{}", settings.no_zip_key),
            }
        }
    }

    Ok(())
}
