//! pbf-index: build a transport index from an OSM PBF extract.
//!
//! ```text
//! pbf-index <input.osm.pbf> <output> [--work-dir DIR] [--region NAME] [-v]
//! ```
//!
//! The staging database and stop tree file are written to `--work-dir`
//! (default: the output file's directory) and left in place afterwards.
//! The region name defaults to the input file name up to its first dot.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ti_build::TransportIndexBuilder;
use ti_core::BuildConfig;
use ti_extract::osm::load_route_relations;


// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "pbf-index",
    version,
    about = "Build a transport index from an OSM PBF extract"
)]
struct Args {
    /// Input OSM PBF file
    input: PathBuf,

    /// Output transport index file
    output: PathBuf,

    /// Directory for the staging database and stop tree file
    /// (default: the output file's directory)
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Region name written into the index (default: input file name up to
    /// its first dot)
    #[arg(long)]
    region: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn region_from(input: &Path) -> String {
    input
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|n| !n.is_empty())
        .unwrap_or("transport")
        .to_owned()
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    if !args.input.exists() {
        bail!("input file not found: {}", args.input.display());
    }
    let work_dir = match args.work_dir {
        Some(dir) => dir,
        None => args
            .output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("creating work directory {}", work_dir.display()))?;
    let region = args.region.unwrap_or_else(|| region_from(&args.input));

    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output.display());
    log::info!("Region: {region}");

    let started = Instant::now();
    let relations = load_route_relations(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    log::info!("Loaded {} route relations in {:.1} s", relations.len(), started.elapsed().as_secs_f64());

    let mut builder = TransportIndexBuilder::create(BuildConfig::new(&work_dir, region))?;
    for relation in &relations {
        builder.ingest_relation(relation)?;
    }

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let summary = builder.write_index(BufWriter::new(file))?;

    log::info!("{summary}");
    log::info!("Done in {:.1} s", started.elapsed().as_secs_f64());
    Ok(())
}
