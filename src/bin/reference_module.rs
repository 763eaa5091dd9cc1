//! Reference Module: Full Pipeline Demo
//!
//! Runs the whole pipeline on the built-in reference bifiltration, prints
//! the template points and the barcodes along a few fixed lines, and
//! optionally writes the result as an invariants container or a text
//! report.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use bipersistence::io::{write_atomic, writer_for, Artifacts};
use bipersistence::query::{format_barcode_line, parse_query_batch};
use bipersistence::{
    barcodes, reference_module, BettiAlgorithm, LoggingObserver, OutputFormat, Pipeline, PipelineMode,
    Result, RunParameters,
};

const REFERENCE_LINES: &str = "23 -0.22\n67 1.88\n10 0.92\n0 1.2\n90 -1.0\n";

#[derive(Parser, Debug)]
#[command(name = "reference_module")]
#[command(about = "Run the two-parameter persistence pipeline on the reference module")]
struct Args {
    /// Where to write the result
    output: Option<PathBuf>,

    /// Output format: invariants or text
    #[arg(long, default_value = "invariants")]
    format: String,

    /// Use Koszul homology for the Betti numbers
    #[arg(long)]
    koszul: bool,

    /// Homological degree
    #[arg(short = 'H', long, default_value = "0")]
    homology: usize,

    /// Worker threads (0 = all cores)
    #[arg(long, default_value = "0")]
    num_threads: usize,

    /// full, betti or presentation
    #[arg(long, default_value = "full")]
    mode: String,

    /// Log more (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: &Args) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;
    let mode: PipelineMode = args.mode.parse()?;
    let parameters = RunParameters {
        hom_degree: args.homology,
        algorithm: if args.koszul { BettiAlgorithm::KoszulBased } else { BettiAlgorithm::PresentationBased },
        num_threads: args.num_threads,
        verbosity: args.verbose.min(RunParameters::MAX_VERBOSITY),
        ..RunParameters::default()
    };
    parameters.validate()?;
    let config = bipersistence::EngineConfig { mode, ..parameters.engine_config() };
    if args.output.is_some() {
        format.check_mode(mode)?;
    }

    println!("═══════════════════════════════════════════════════════════════");
    println!("  Two-Parameter Persistence: Reference Module");
    println!("═══════════════════════════════════════════════════════════════\n");

    let bifiltration = reference_module()?;
    println!("Bifiltration: {} simplices, degree H_{}", bifiltration.len(), args.homology);
    println!("Algorithm: {:?}, mode: {:?}\n", parameters.algorithm, mode);

    let output = Pipeline::new(config).run(&bifiltration, &mut LoggingObserver)?;
    println!("Pipeline finished in state: {}\n", output.state);

    if let Some(tp) = &output.template_points {
        println!("Template points ({}):", tp.len());
        for (i, p) in tp.points.iter().enumerate() {
            let (x, y) = tp.coordinates(i);
            println!("  ({:>4}, {:>4})  ξ = ({}, {}, {})", x, y, p.xi0, p.xi1, p.xi2);
        }
        println!();
    }
    if let Some(presentation) = &output.presentation {
        println!(
            "Minimal presentation: {} generators, {} relations\n",
            presentation.generators.len(),
            presentation.relations.len()
        );
    }

    if let Some(arrangement) = &output.arrangement {
        println!("═══════════════════════════════════════════════════════════════");
        println!("  Barcodes");
        println!("═══════════════════════════════════════════════════════════════\n");
        println!("Arrangement: {} anchors, {} faces", arrangement.anchors.len(), arrangement.num_faces());
        let queries = parse_query_batch(REFERENCE_LINES)?;
        for (query, barcode) in queries.iter().zip(barcodes(arrangement, &queries)) {
            println!("  {}", format_barcode_line(query, &barcode));
        }
        println!();
    }

    if let Some(path) = &args.output {
        write_atomic(path, writer_for(format).as_ref(), &Artifacts::from_output(&parameters, &output))?;
        println!("Wrote {} output to {}", format, path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).with_target(false).with_writer(io::stderr).finish();
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
