//! swiftcodes CLI - Load, query and serve SWIFT/BIC codes
//!
//! # Commands
//!
//! ```bash
//! swiftcodes serve                     # Start HTTP server (port 8080)
//! swiftcodes load swift_codes.csv      # Parse a feed into the store snapshot
//! swiftcodes show ABIEBGS1XXX          # One code, with branches for headquarters
//! swiftcodes country BG                # All codes of a country
//! swiftcodes parse swift_codes.csv     # Parse only, print normalized JSON
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use swiftcodes::api::{BranchResponse, SwiftCodeResponse};
use swiftcodes::config::{Settings, DEFAULT_LOG_FILTER};
use swiftcodes::{parse_swift_file_with_options, ParseOptions, SwiftCodeStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swiftcodes")]
#[command(about = "Parse, store and serve SWIFT/BIC codes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output normalized JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a CSV file and load it into the store
    Load {
        /// Input CSV file (default: SWIFTCODES_DATA)
        input: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Store snapshot (default: SWIFTCODES_STORE)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Show one SWIFT code
    Show {
        /// SWIFT code
        code: String,

        /// Store snapshot (default: SWIFTCODES_STORE)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// List the SWIFT codes of a country
    Country {
        /// ISO2 country code
        iso2: String,

        /// Store snapshot (default: SWIFTCODES_STORE)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: SWIFTCODES_PORT or 8080)
        #[arg(short, long)]
        port: Option<u16>,

        /// Store snapshot (default: SWIFTCODES_STORE)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Load a CSV file into the store before serving
        #[arg(long)]
        load: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match Settings::from_env() {
        Ok(settings) => run(cli.command, settings).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Load {
            input,
            delimiter,
            store,
        } => {
            let input = input.unwrap_or_else(|| settings.data_path.clone());
            let store = store.unwrap_or_else(|| settings.store_path.clone());
            cmd_load(&input, delimiter, &store)
        }

        Commands::Show { code, store } => {
            cmd_show(&code, &store.unwrap_or(settings.store_path))
        }

        Commands::Country { iso2, store } => {
            cmd_country(&iso2, &store.unwrap_or(settings.store_path))
        }

        Commands::Serve { port, store, load } => {
            let mut settings = settings;
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(store) = store {
                settings.store_path = store;
            }
            cmd_serve(settings, load.as_deref()).await
        }
    }
}

fn parse_options(delimiter: Option<char>) -> Result<ParseOptions, Box<dyn std::error::Error>> {
    let delimiter = match delimiter {
        Some(c) if c.is_ascii() => Some(c as u8),
        Some(c) => return Err(format!("Delimiter must be a single ASCII character, got '{}'", c).into()),
        None => None,
    };
    Ok(ParseOptions { delimiter })
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let dataset = parse_swift_file_with_options(input, &parse_options(delimiter)?)?;

    eprintln!("   Encoding: {}", dataset.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(dataset.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!(
        "✅ Parsed {} records ({} headquarters)",
        dataset.len(),
        dataset.headquarter_count()
    );

    let json = serde_json::to_string_pretty(&dataset.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_load(
    input: &Path,
    delimiter: Option<char>,
    store_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading: {}", input.display());

    let dataset = parse_swift_file_with_options(input, &parse_options(delimiter)?)?;
    eprintln!("   {} records validated", dataset.len());

    let mut store = SwiftCodeStore::open(store_path)?;
    let summary = store.load_and_save(dataset.into_records())?;

    eprintln!("   ✅ Inserted: {}", summary.inserted);
    if summary.skipped > 0 {
        eprintln!("   ⚠️  Already present: {}", summary.skipped);
    }
    eprintln!("💾 Store: {} ({} records)", store_path.display(), store.len());

    Ok(())
}

fn cmd_show(code: &str, store_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = SwiftCodeStore::open(store_path)?;
    let code = swiftcodes::normalize_text(code);

    let record = store
        .get(&code)
        .ok_or_else(|| format!("SWIFT code not found: {}", code))?;

    let branches = record.is_headquarter.then(|| {
        store
            .branches(&code)
            .into_iter()
            .map(BranchResponse::from)
            .collect()
    });

    let json = serde_json::to_string_pretty(&SwiftCodeResponse::new(record, branches))?;
    println!("{}", json);
    Ok(())
}

fn cmd_country(iso2: &str, store_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = SwiftCodeStore::open(store_path)?;
    let records = store.by_country(iso2);

    if records.is_empty() {
        return Err(format!("No SWIFT codes for country: {}", iso2.trim()).into());
    }

    eprintln!("🏦 {} ({} codes)", records[0].country_name, records.len());
    for record in records {
        println!(
            "  {} {}  {}",
            record.swift_code,
            if record.is_headquarter { "HQ" } else { "  " },
            record.bank_name
        );
    }
    Ok(())
}

async fn cmd_serve(
    settings: Settings,
    load: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = SwiftCodeStore::open(&settings.store_path)?;

    if let Some(input) = load {
        let dataset = parse_swift_file_with_options(input, &ParseOptions::default())?;
        let summary = store.load_and_save(dataset.into_records())?;
        eprintln!(
            "📄 Loaded {}: {} inserted, {} skipped",
            input.display(),
            summary.inserted,
            summary.skipped
        );
    }

    swiftcodes::server::start_server(settings.socket_addr(), store).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
