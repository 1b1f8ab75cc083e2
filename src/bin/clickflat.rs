//! clickflat: Flatten nested JSON logs into ClickHouse-ready rows
//!
//! Usage:
//!   # Read a.json, write flattened_output.json
//!   clickflat
//!
//!   # Explicit files
//!   clickflat merged_logs.json -o rows.json
//!
//!   # Stream stdin to stdout
//!   cat merged_logs.json | clickflat - -o -
//!
//!   # Keep 0, "" and false instead of turning them into null
//!   clickflat merged_logs.json --strict-presence

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use clickflat::{flatten_file, flatten_json, AbsenceRule, FlattenConfig, FlattenReport, ParserBackend};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const STDIO: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "clickflat")]
#[command(about = "Flatten nested JSON logs into a fixed column layout", long_about = None)]
struct Args {
    /// Input JSON document (`-` reads stdin)
    #[arg(value_name = "FILE", default_value = "a.json")]
    input: String,

    /// Output file for the flattened array (`-` writes stdout)
    #[arg(long, short = 'o', default_value = "flattened_output.json")]
    output: String,

    /// Treat only missing keys and null as absent (keep 0, "" and false)
    #[arg(long)]
    strict_presence: bool,

    /// Parse records with simd-json
    #[arg(long)]
    simd: bool,

    /// Reject any single record larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_record_bytes: Option<usize>,

    /// Exit with status 2 when malformed input cut the output short
    #[arg(long)]
    fail_on_parse_error: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    // Build config
    let mut config = FlattenConfig::default();
    if args.strict_presence {
        config.absence = AbsenceRule::Presence;
    }
    if args.simd {
        config.parser = ParserBackend::Simd;
    }
    config.max_record_bytes = args.max_record_bytes;

    let report = if args.input != STDIO && args.output != STDIO {
        flatten_file(Path::new(&args.input), Path::new(&args.output), &config)
            .context("Failed to flatten input")?
    } else {
        flatten_stdio(&args, &config)?
    };
    print_diagnostics(&args.output, &report);

    if args.summary_json {
        let summary = serde_json::to_string(&report).context("Failed to serialize summary")?;
        if args.output == STDIO {
            eprintln!("{summary}");
        } else {
            println!("{summary}");
        }
    }

    if args.fail_on_parse_error && !report.is_complete() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

/// Either end may be stdio; the other side may still be a file
fn flatten_stdio(args: &Args, config: &FlattenConfig) -> Result<FlattenReport> {
    let reader: Box<dyn BufRead> = if args.input == STDIO {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open input: {}", args.input))?;
        Box::new(BufReader::new(file))
    };

    let writer: Box<dyn Write> = if args.output == STDIO {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("Failed to create output: {}", args.output))?;
        Box::new(BufWriter::new(file))
    };

    flatten_json(reader, writer, config).context("Failed to flatten input")
}

/// Human-readable completion lines on stderr
fn print_diagnostics(output: &str, report: &FlattenReport) {
    if let Some(err) = &report.parse_error {
        eprintln!("Parsing error: {err}");
    }
    eprintln!(
        "Flattened data written to {}. Processed {} records.",
        output, report.records
    );
}
