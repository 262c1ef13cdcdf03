//! CAN DB Mapper CLI Application
//!
//! Command-line front end for the can-db-mapper library:
//! - Loads the mapping file and the CANoe XML database
//! - Reports conversion diagnostics on stderr
//! - Writes the exported network as indented JSON

use anyhow::{bail, Context, Result};
use can_db_mapper::{Diagnostics, MappingSpec, Severity};
use clap::Parser;
use std::path::PathBuf;

mod config;

/// CAN DB Mapper - Convert a CANoe XML database to mapped JSON
#[derive(Parser, Debug)]
#[command(name = "can-db-mapper")]
#[command(about = "Convert a CANoe XML database to JSON, keeping only mapped signals", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the CANoe XML database
    #[arg(value_name = "DATABASE")]
    database: PathBuf,

    /// Path to a JSON file with CAN messages mapped to generic names
    #[arg(value_name = "MAPPING")]
    mapping: PathBuf,

    /// Output JSON file
    #[arg(value_name = "OUT", default_value = "dump.json")]
    out: PathBuf,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fail if any warning is reported
    #[arg(long)]
    strict: bool,

    /// Spaces per indentation level in the output (overrides config)
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::debug!("CAN DB Mapper CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using mapper library v{}", can_db_mapper::VERSION);

    run(&args)?;

    if !args.quiet {
        println!("Wrote results to {}", args.out.display());
    }
    Ok(())
}

/// Load inputs, convert, report diagnostics and write the output file
fn run(args: &Args) -> Result<Diagnostics> {
    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };
    let strict = args.strict || config.diagnostics.strict;
    let indent = args.indent.unwrap_or(config.output.indent);

    let mapping = MappingSpec::load(&args.mapping)
        .with_context(|| format!("Failed to load mapping file: {:?}", args.mapping))?;

    let mut diagnostics = Diagnostics::new();
    let network = can_db_mapper::convert(&args.database, &mapping, &mut diagnostics)
        .with_context(|| format!("Failed to convert database: {:?}", args.database))?;

    report(&diagnostics);

    if strict && diagnostics.has_warnings() {
        bail!(
            "{} warning(s) reported in strict mode, not writing {:?}",
            diagnostics.warnings().count(),
            args.out
        );
    }

    can_db_mapper::write_json(&args.out, &network, indent)
        .with_context(|| format!("Failed to write output file: {:?}", args.out))?;

    Ok(diagnostics)
}

/// Send collected diagnostics to the log (stderr)
fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => log::warn!("{}", diagnostic),
            Severity::Info => log::debug!("{}", diagnostic),
        }
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
