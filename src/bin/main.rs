//! DXF Mesher CLI
//!
//! Convert 3D DXF drawings into STL, OBJ or GLB meshes.

use clap::{Parser, Subcommand, ValueEnum};
use dxf_mesher::batch::{self, BatchOptions};
use dxf_mesher::{
    convert_file, load_drawing, ConverterConfig, DrawingSource, Entity, MeshFormat,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dxf-mesher")]
#[command(
    author,
    version,
    about = "Convert 3D DXF drawings into triangle meshes",
    long_about = None
)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single DXF file
    Convert {
        /// Input DXF file
        input: PathBuf,

        /// Output file path (.stl, .obj or .glb; default: input with .stl)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON converter configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Convert every matching DXF file under a directory
    Batch {
        /// Directory containing DXF files
        directory: PathBuf,

        /// File pattern to match
        #[arg(long, default_value = batch::DEFAULT_PATTERN)]
        pattern: String,

        /// Skip files that already have outputs
        #[arg(long)]
        skip_existing: bool,

        /// Number of parallel workers (default: CPU count - 1)
        #[arg(long)]
        workers: Option<usize>,

        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "stl")]
        format: OutputFormat,

        /// Only search the top-level directory
        #[arg(long)]
        no_recursive: bool,

        /// Write a JSON report of the run
        #[arg(long)]
        report: Option<PathBuf>,

        /// JSON converter configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the entity makeup of a DXF file
    Inspect {
        /// Input DXF file
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary STL
    Stl,
    /// Wavefront OBJ format
    Obj,
    /// Binary glTF format
    Glb,
}

impl From<OutputFormat> for MeshFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Stl => MeshFormat::Stl,
            OutputFormat::Obj => MeshFormat::Obj,
            OutputFormat::Glb => MeshFormat::Glb,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
        } => {
            let config = load_config(config)?;
            let output = convert_file(&input, output.as_deref(), &config)?;
            println!("Wrote {}", output.display());
        }
        Commands::Batch {
            directory,
            pattern,
            skip_existing,
            workers,
            output,
            format,
            no_recursive,
            report,
            config,
        } => {
            let mut options = BatchOptions::new(directory)
                .with_pattern(pattern)
                .with_format(format.into())
                .with_skip_existing(skip_existing)
                .with_config(load_config(config)?);
            options.recursive = !no_recursive;
            options.workers = workers;
            options.output_dir = output;

            let result = batch::batch_convert(&options)?;

            println!();
            println!("Total files: {}", result.total);
            println!("Skipped: {}", result.skipped);
            println!("Successful: {}", result.succeeded);
            println!("Failed: {}", result.failed);
            println!("Time elapsed: {:.1}s", result.elapsed_secs);
            for failure in result.failures() {
                let error = failure.error.as_deref().unwrap_or("");
                println!("  {}: {}", failure.input.display(), error);
            }

            if let Some(report) = report {
                fs::write(&report, result.to_json()?)?;
                println!("Report written to {}", report.display());
            }

            if result.failed > 0 {
                std::process::exit(1);
            }
        }
        Commands::Inspect { input } => {
            inspect(&input)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<ConverterConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ConverterConfig::from_json_file(path)?),
        None => Ok(ConverterConfig::default()),
    }
}

fn inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let drawing = load_drawing(input)?;

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    let mut polyfaces = 0;
    for entity in drawing.entities() {
        *kinds.entry(entity.kind()).or_insert(0) += 1;
        if matches!(entity, Entity::Polyline(polyline) if polyline.is_polyface) {
            polyfaces += 1;
        }
    }

    let mut kinds: Vec<_> = kinds.into_iter().collect();
    kinds.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    println!("{}", input.display());
    println!("  DXF version: {}", drawing.version);
    println!("  Model space entities: {}", drawing.entity_count());
    for (kind, count) in kinds {
        println!("    {}: {}", kind, count);
    }
    println!("  Block definitions: {}", drawing.block_count());
    println!("  Polyface meshes: {}", polyfaces);

    Ok(())
}
