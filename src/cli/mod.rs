//! gridfill CLI Module
//!
//! Command-line interface for filling, inspecting and cleaning grid tables.

use clap::{Args, Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cleaning::{CombineSpec, TableCleaner};
use crate::grid::GridIndexMapper;
use crate::pipeline::{read_identifiers, FieldKind, FieldSpec, Pipeline, PipelineConfig, SmoothingSpec};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "gridfill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fill gaps in gridded per-cell measurements from neighboring cells")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill missing values of declared fields and derive the smoothed column
    Fill(FillArgs),

    /// Show table information and check identifiers against a grid size
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Grid rows
        #[arg(long)]
        rows: Option<usize>,

        /// Grid columns
        #[arg(long)]
        cols: Option<usize>,

        /// Identifier column
        #[arg(long, default_value = "OID")]
        id_column: String,
    },

    /// Clean every CSV export in a directory
    Clean(CleanArgs),

    /// Print a configuration template
    Config {
        /// Write the template here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct FillArgs {
    /// Input data file (CSV, TSV, JSON, or Parquet)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON pipeline configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Grid rows (overrides the configuration)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Grid columns (overrides the configuration)
    #[arg(long)]
    pub cols: Option<usize>,

    /// Continuous fields to fill, comma separated
    #[arg(long, value_delimiter = ',')]
    pub continuous: Vec<String>,

    /// Categorical fields to fill, comma separated
    #[arg(long, value_delimiter = ',')]
    pub categorical: Vec<String>,

    /// Round limit per field
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Field to derive the smoothed column from
    #[arg(long)]
    pub smooth_field: Option<String>,

    /// Smoothing window side length
    #[arg(long)]
    pub window: Option<usize>,

    /// Process fields one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Write the completeness report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Write the categorical codec tables as JSON
    #[arg(long)]
    pub codecs: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Directory holding raw CSV exports
    #[arg(short, long)]
    pub input_dir: PathBuf,

    /// Directory receiving cleaned_<name> files
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Move processed sources here
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,

    /// Duplicate key columns, comma separated
    #[arg(long, value_delimiter = ',', default_value = "LATITUDE,LONGITUDE")]
    pub keys: Vec<String>,

    /// Skip the combined GNODEB + GCELLID key
    #[arg(long)]
    pub no_combine: bool,
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    Ok(DataLoader::new().load_auto(path)?)
}

/// Merge the configuration file with command-line overrides
pub fn build_config(args: &FillArgs) -> anyhow::Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => {
            if args.rows.is_none() || args.cols.is_none() {
                anyhow::bail!("--rows and --cols are required without --config");
            }
            PipelineConfig::default()
        }
    };

    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(n) = args.max_rounds {
        config = config.with_max_rounds(n);
    }
    config = config
        .with_fields(args.continuous.iter().cloned(), FieldKind::Continuous)
        .with_fields(args.categorical.iter().cloned(), FieldKind::Categorical);
    if args.sequential {
        config.parallel = false;
    }

    if let Some(field) = &args.smooth_field {
        let mut spec = SmoothingSpec::new(field.clone());
        if let Some(previous) = &config.smoothing {
            spec.window = previous.window;
        }
        config.smoothing = Some(spec);
    }
    if let Some(window) = args.window {
        match config.smoothing.as_mut() {
            Some(spec) => spec.window = window,
            None => anyhow::bail!("--window needs a smoothing field"),
        }
    }

    config.validate()?;
    Ok(config)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_fill(args: &FillArgs) -> anyhow::Result<()> {
    section("Fill");

    let config = build_config(args)?;

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(&args.data)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run(&format!(
        "Filling {} fields on a {}×{} grid",
        config.fields.len(),
        config.rows,
        config.cols
    ));
    let start = Instant::now();
    let pipeline = Pipeline::new(config)?;
    let mut output = pipeline.run(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run(&format!("Saving → {}", args.output.display()));
    DataSaver::save_auto(&mut output.frame, &args.output)?;
    step_done(&format!("{} rows × {} cols", output.frame.height(), output.frame.width()));

    if let Some(path) = &args.report {
        std::fs::write(path, output.report.to_json()?)?;
    }
    if let Some(path) = &args.codecs {
        std::fs::write(path, serde_json::to_string_pretty(&output.codecs)?)?;
    }

    println!();
    println!(
        "  {:<24} {:<12} {:>8} {:>8} {:>8}",
        muted("Field"), muted("Kind"), muted("Missing"), muted("Rounds"), muted("Left")
    );
    println!("  {}", dim(&"─".repeat(64)));
    for field in &output.report.fields {
        let left = if field.is_complete() {
            ok("0")
        } else {
            field.residual_missing.to_string().yellow()
        };
        println!(
            "  {:<24} {:<12} {:>8} {:>8} {:>8}",
            field.name,
            format!("{:?}", field.kind).to_lowercase(),
            field.initially_missing,
            field.rounds(),
            left
        );
    }
    println!();

    Ok(())
}

pub fn cmd_info(data_path: &Path, rows: Option<usize>, cols: Option<usize>, id_column: &str) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_data(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!("  {:<12} {:.2} MB", muted("Memory"), df.estimated_size() as f64 / 1024.0 / 1024.0);
    println!();

    println!("  {:<24} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(54)));

    for col in df.get_columns() {
        println!(
            "  {:<24} {:<12} {:>6} {:>8}",
            col.name().as_str(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    if let (Some(rows), Some(cols)) = (rows, cols) {
        println!();
        let mapper = GridIndexMapper::new(rows, cols)?;
        match read_identifiers(&df, id_column, &mapper) {
            Ok(_) => println!("  {} identifiers cover the {}×{} grid", ok("✓"), rows, cols),
            Err(e) => println!("  {} {}", "✗".red(), e),
        }
    }

    println!();
    Ok(())
}

pub fn cmd_clean(args: &CleanArgs) -> anyhow::Result<()> {
    section("Clean");

    let combine = if args.no_combine {
        None
    } else {
        Some(CombineSpec::new("GNODEB", "GCELLID", "CGI"))
    };
    let cleaner = TableCleaner::new()
        .with_dedupe_keys(args.keys.iter().cloned())
        .with_combine(combine);

    step_run(&format!("Cleaning {}", args.input_dir.display()));
    let start = Instant::now();
    let summary = cleaner.clean_directory(&args.input_dir, &args.output_dir, args.archive_dir.as_deref())?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    for path in &summary.written {
        println!("  {} {}", ok("✓"), path.display());
    }
    for (path, reason) in &summary.skipped {
        println!("  {} {} {}", "✗".yellow(), path.display(), dim(reason));
    }
    println!();

    Ok(())
}

/// Template mirroring a 100×100 drive-test grid
pub fn config_template() -> PipelineConfig {
    PipelineConfig::new(100, 100)
        .with_fields(["SPEED_M_s_", "ALT_M_", "SS_RSRP", "SS_RSRQ", "SS_SINR"], FieldKind::Continuous)
        .with_field(FieldSpec::categorical("NETWORK_TYPE"))
        .with_field(FieldSpec::categorical("NR_BAND"))
        .with_field(FieldSpec::categorical("Base_Bandwidth"))
        .with_smoothing(SmoothingSpec::new("Building_Coverage"))
}

pub fn cmd_config(output: Option<&Path>) -> anyhow::Result<()> {
    let config = config_template();
    match output {
        Some(path) => {
            config.to_json_file(path)?;
            println!("  {} {}", ok("✓"), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
