use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use mapmesh::config::FileConfig;
use mapmesh::domain::{BoundingBox, Category};
use mapmesh::export::{ExportFormat, ExportOptions, ExportStream, stl::estimate_stl_size};
use mapmesh::{GenerationReport, generate, osm};

/// Turn OpenStreetMap elements into terrain-anchored 3D-printable meshes
///
/// Examples:
///   # Overpass JSON to a 3MF with per-category materials
///   mapmesh -i area.json --north 39.91 --south 39.90 --east 116.40 --west 116.39
///
///   # ASCII STL with a fixed seed for tree and ripple placement
///   mapmesh -i area.json --north 39.91 --south 39.90 --east 116.40 --west 116.39 -f stl --seed 7
///
///   # Use a config file and print mesh statistics
///   mapmesh --config my-settings.toml --stats
#[derive(Parser, Debug)]
#[command(name = "mapmesh")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches mapmesh.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overpass JSON file with the elements to build
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Northern edge of the selection, degrees
    #[arg(long, allow_hyphen_values = true)]
    north: Option<f64>,

    /// Southern edge of the selection, degrees
    #[arg(long, allow_hyphen_values = true)]
    south: Option<f64>,

    /// Eastern edge of the selection, degrees
    #[arg(long, allow_hyphen_values = true)]
    east: Option<f64>,

    /// Western edge of the selection, degrees
    #[arg(long, allow_hyphen_values = true)]
    west: Option<f64>,

    /// Output file path (defaults to map.3mf or map.stl)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: 3mf, stl or stl-binary
    #[arg(short = 'f', long)]
    format: Option<ExportFormat>,

    /// Seed for tree and ripple placement
    #[arg(long)]
    seed: Option<u64>,

    /// Print registry statistics as JSON
    #[arg(long)]
    stats: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    init_logging(args.verbose);

    let file_config = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            bail!("Config file not found: {:?}", config_path);
        }
        Some(
            FileConfig::from_path(config_path)
                .with_context(|| format!("Failed to load config file: {:?}", config_path))?,
        )
    } else {
        FileConfig::load()
    }
    .unwrap_or_default();

    let verbose = args.verbose || file_config.verbose;

    let input = args
        .input
        .clone()
        .or(file_config.input.clone())
        .context("No input file given (use --input or set `input` in the config file)")?;
    let bbox = resolve_bbox(&args, file_config.bbox)?;
    let format = args.format.or(file_config.format).unwrap_or_default();
    let output_path = args
        .output
        .clone()
        .or(file_config.output.clone())
        .unwrap_or_else(|| PathBuf::from(format!("map.{}", format.extension())));

    let mut config = file_config.generation;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    println!();
    println!("mapmesh - Map Meshes for 3D Printing");
    println!("====================================");
    println!(
        "Selection: N {:.5} S {:.5} E {:.5} W {:.5}",
        bbox.north, bbox.south, bbox.east, bbox.west
    );
    println!("Output: {} ({})", output_path.display(), format);
    println!();

    let spinner = create_spinner("Reading elements...");
    let start = Instant::now();
    let json = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let elements = osm::parse_elements(&json).context("Failed to parse input file")?;
    spinner.finish_with_message(format!(
        "Read {} elements [{:.1}s]",
        elements.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Generating meshes...");
    let start = Instant::now();
    let (registry, report) =
        generate(&config, &bbox, &elements).context("Generation pass failed")?;
    spinner.finish_with_message(format!(
        "Generated {} meshes, {} triangles [{:.1}s]",
        registry.len(),
        registry.total_triangles(),
        start.elapsed().as_secs_f32()
    ));

    if verbose {
        print_report(&report);
        for category in Category::ALL {
            let count = registry.count(category);
            if count > 0 {
                println!("  {}: {} meshes", category.name(), count);
            }
        }
    }
    if report.warnings > 0 {
        println!(
            "  {} warnings ({} skipped, {} rejected); run with -v for details",
            report.warnings, report.skipped, report.rejected
        );
    }

    let options = ExportOptions::from_config(&config.export, config.projection.scale);
    let start = Instant::now();
    let progress = create_progress_bar(registry.len() as u64, "Exporting");
    let bytes = ExportStream::new(registry.records(), format, options)
        .finish_with(|fraction| {
            progress.set_position((fraction * registry.len() as f32).round() as u64)
        })
        .context("Export failed")?;
    progress.finish_and_clear();

    std::fs::write(&output_path, &bytes)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    println!(
        "Wrote {} ({:.1} KB) [{:.1}s]",
        output_path.display(),
        bytes.len() as f64 / 1024.0,
        start.elapsed().as_secs_f32()
    );
    if verbose && format == ExportFormat::StlBinary {
        println!(
            "  Expected binary STL size: {} bytes",
            estimate_stl_size(registry.total_triangles())
        );
    }

    if args.stats {
        let stats = serde_json::to_string_pretty(&registry.stats())
            .context("Failed to serialize statistics")?;
        println!("{stats}");
    }

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

/// CLI edges win over the config file; all four must come from one place
fn resolve_bbox(args: &Args, file_bbox: Option<BoundingBox>) -> Result<BoundingBox> {
    match (args.north, args.south, args.east, args.west) {
        (Some(north), Some(south), Some(east), Some(west)) => {
            Ok(BoundingBox::new(north, south, east, west))
        }
        (None, None, None, None) => file_bbox.context(
            "No selection given (use --north/--south/--east/--west or set [bbox] in the config file)",
        ),
        _ => bail!("--north, --south, --east and --west must be given together"),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &GenerationReport) {
    println!("  Elements: {}", report.elements_seen);
    println!("    built: {}", report.built);
    println!("    outside selection: {}", report.filtered_out);
    println!("    unclassified: {}", report.unclassified);
    println!("    disabled: {}", report.disabled);
    println!("    skipped: {}", report.skipped);
    println!("    rejected: {}", report.rejected);
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
