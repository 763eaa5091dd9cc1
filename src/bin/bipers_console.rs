//! Console for module invariants files
//!
//! Loads a container written by the pipeline and answers bounds and
//! barcode queries against its arrangement without recomputing anything.
//!
//!   bipers_console module.invariants --bounds
//!   bipers_console module.invariants --barcodes lines.txt

use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use bipersistence::io::{load_invariants, probe_file, ContentKind};
use bipersistence::query::{format_barcode_line, read_query_batch};
use bipersistence::{barcodes, bounds, BipersError, Result};

#[derive(Parser, Debug)]
#[command(name = "bipers_console")]
#[command(about = "Query the augmented arrangement stored in a module invariants file")]
struct Args {
    /// Module invariants file
    input: PathBuf,

    /// Print the bounding box of the template points
    #[arg(long)]
    bounds: bool,

    /// File with one '<angle> <offset>' query per line
    #[arg(long, value_name = "FILE")]
    barcodes: Option<PathBuf>,

    /// Print the bigraded Betti numbers and the Hilbert function
    #[arg(long)]
    betti: bool,

    /// Log more (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn run(args: &Args) -> Result<()> {
    if probe_file(&args.input)? != ContentKind::Invariants {
        return Err(BipersError::input(format!(
            "{} is raw input data; build its invariants with the pipeline first",
            args.input.display()
        )));
    }
    let invariants = load_invariants(&args.input)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.betti {
        invariants.template_points.write_dimensions(&mut out)?;
        invariants.template_points.write_betti(&mut out)?;
    }

    if args.bounds {
        let b = bounds(&invariants.arrangement);
        writeln!(out, "low: {}, {}", b.x_low, b.y_low)?;
        writeln!(out, "high: {}, {}", b.x_high, b.y_high)?;
    }

    if let Some(path) = &args.barcodes {
        let queries = read_query_batch(BufReader::new(File::open(path)?))?;
        let results = barcodes(&invariants.arrangement, &queries);
        for (query, barcode) in queries.iter().zip(&results) {
            writeln!(out, "{}", format_barcode_line(query, barcode))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(args.verbose))
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: logging already initialised");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
