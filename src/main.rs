use clap::{Parser, Subcommand, ValueEnum};
use miseq_interop::export::{write_csv, write_json};
use miseq_interop::summary::write_phix_csv;
use miseq_interop::testgen::{write_fixture, RecordGenerator};
use miseq_interop::{
    list_runs, ErrorRecord, MetricKind, ReadLengths, RunDirectory, TileMetricCodes,
};
use regex::Regex;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "interop", about = "Read Illumina MiSeq InterOp metric files")]
struct Cli {
    /// Log decoding progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a run directory and report which metrics it holds
    Validate {
        run_dir: PathBuf,
    },
    /// List run directories
    List {
        runs_dir: PathBuf,
        /// Only runs with a needsprocessing marker
        #[arg(long)]
        needs_processing: bool,
        /// Only runs with a qc_uploaded marker
        #[arg(long)]
        qc_uploaded: bool,
        /// Only runs whose name matches this regex
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long)]
        full_path: bool,
    },
    /// Export metric records as JSON or CSV
    Extract {
        run_dir: PathBuf,
        /// Metrics to export, e.g. tile quality error
        #[arg(short, long, num_args = 1.., conflicts_with = "all")]
        metrics: Vec<String>,
        /// Export every metric present
        #[arg(long)]
        all: bool,
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file, or directory when exporting several metrics
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarise quality, tile and error metrics
    Summary {
        run_dir: PathBuf,
        /// forward,index,reverse or forward,index1,index2,reverse
        #[arg(short, long)]
        read_lengths: Option<ReadLengths>,
        #[arg(short, long, value_enum, default_value = "table")]
        format: SummaryFormat,
    },
    /// Write the PhiX error rate per tile and cycle as CSV
    Phix {
        run_dir: PathBuf,
        #[arg(short, long)]
        read_lengths: Option<ReadLengths>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a file of random records for testing
    Generate {
        /// Metric kind, e.g. tile
        kind: String,
        output: PathBuf,
        #[arg(short = 'n', long, default_value = "100")]
        count: usize,
        #[arg(short, long, default_value = "0")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv  => "csv",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SummaryFormat {
    Table,
    Json,
}

#[derive(Serialize, Default)]
struct RunSummary {
    run_name:           String,
    q30_forward:        Option<f64>,
    q30_reverse:        Option<f64>,
    cluster_density:    Option<f64>,
    pass_rate:          Option<f64>,
    error_rate_forward: Option<f64>,
    error_rate_reverse: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {

        // ── Validate ─────────────────────────────────────────────────────────
        Commands::Validate { run_dir } => {
            let run = RunDirectory::open(&run_dir)?;
            println!("Run:      {}", run.run_name());
            println!("InterOp:  {}", run.interop_dir().display());
            println!("Markers:  needsprocessing={} qc_uploaded={}", run.needs_processing, run.qc_uploaded);
            println!();
            println!("{:<22} {}", "Metric", "File");
            let mut available = 0;
            for kind in MetricKind::ALL {
                match run.locate(kind) {
                    Ok(path) => {
                        available += 1;
                        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                        println!("{:<22} {}", kind.name(), name);
                    }
                    Err(_) => println!("{:<22} (missing)", kind.name()),
                }
            }
            println!();
            println!("{available}/{} metrics available", MetricKind::ALL.len());
            if available == 0 {
                return Err("no metrics found in InterOp directory".into());
            }
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { runs_dir, needs_processing, qc_uploaded, pattern, full_path } => {
            let pattern = pattern.as_deref().map(Regex::new).transpose()?;
            let runs: Vec<RunDirectory> = list_runs(&runs_dir)?
                .into_iter()
                .filter(|run| pattern.as_ref().map_or(true, |re| re.is_match(&run.run_name())))
                .filter(|run| !needs_processing || run.needs_processing)
                .filter(|run| !qc_uploaded || run.qc_uploaded)
                .collect();

            if runs.is_empty() {
                println!("No runs found matching criteria");
            }
            for run in &runs {
                if full_path {
                    println!("{}", run.path().display());
                } else {
                    println!("{}", run.run_name());
                }
                if cli.verbose {
                    println!("  Status: {}", run.marker_status());
                    println!();
                }
            }
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { run_dir, metrics, all, format, output } => {
            let run = RunDirectory::open(&run_dir)?;
            let kinds = if all {
                let kinds = run.available_metrics();
                for kind in MetricKind::ALL.into_iter().filter(|k| !kinds.contains(k)) {
                    debug!(%kind, "skipping absent metric");
                }
                kinds
            } else if !metrics.is_empty() {
                let kinds = metrics.iter().map(|m| parse_kind(m)).collect::<Result<Vec<_>, _>>()?;
                run.check_files_present(&kinds)?;
                kinds
            } else {
                return Err("specify --metrics or --all".into());
            };

            if kinds.is_empty() {
                return Err("no metrics to extract".into());
            }
            if kinds.len() > 1 && output.is_none() {
                return Err("an output directory is required when extracting several metrics".into());
            }

            let several = kinds.len() > 1;
            for kind in kinds {
                let records = run.read_file(kind)?;
                info!(%kind, count = records.len(), "extracted records");
                let destination = match &output {
                    Some(dir) if several || dir.is_dir() => {
                        fs::create_dir_all(dir)?;
                        Some(dir.join(format!("{}.{}", kind.name(), format.extension())))
                    }
                    other => other.clone(),
                };
                let writer = open_output(destination.as_deref())?;
                match format {
                    ExportFormat::Json => write_json(writer, &run.run_name(), kind, &records)?,
                    ExportFormat::Csv  => write_csv(writer, &records)?,
                }
                if let Some(path) = destination {
                    println!("  wrote  {} ({} records)", path.display(), records.len());
                }
            }
        }

        // ── Summary ──────────────────────────────────────────────────────────
        Commands::Summary { run_dir, read_lengths, format } => {
            let run = RunDirectory::open(&run_dir)?;
            let mut summary = RunSummary { run_name: run.run_name(), ..Default::default() };

            match run.summarize_quality(read_lengths.as_ref()) {
                Ok(q) => {
                    summary.q30_forward = Some(q.q30_forward());
                    if read_lengths.is_some() {
                        summary.q30_reverse = Some(q.q30_reverse());
                    }
                }
                Err(e) if e.is_missing_file() => warn!("{e}"),
                Err(e) => return Err(e.into()),
            }
            match run.summarize_tiles(&TileMetricCodes::default()) {
                Ok(t) => {
                    summary.cluster_density = Some(t.cluster_density());
                    summary.pass_rate = Some(t.pass_rate());
                }
                Err(e) if e.is_missing_file() => warn!("{e}"),
                Err(e) => return Err(e.into()),
            }
            match run.summarize_errors(read_lengths.as_ref()) {
                Ok(err) => {
                    summary.error_rate_forward = Some(err.error_rate_forward());
                    if read_lengths.is_some() {
                        summary.error_rate_reverse = Some(err.error_rate_reverse());
                    }
                }
                Err(e) if e.is_missing_file() => warn!("{e}"),
                Err(e) => return Err(e.into()),
            }

            match format {
                SummaryFormat::Json  => println!("{}", serde_json::to_string_pretty(&summary)?),
                SummaryFormat::Table => print_summary(&summary),
            }
        }

        // ── Phix ─────────────────────────────────────────────────────────────
        Commands::Phix { run_dir, read_lengths, output } => {
            let run = RunDirectory::open(&run_dir)?;
            let records = run.read_records::<ErrorRecord>()?;
            let writer = open_output(output.as_deref())?;
            let summary = write_phix_csv(writer, &records, read_lengths.as_ref())?;
            if let Some(path) = output {
                println!("Wrote: {}", path.display());
                println!("  forward error rate  {:.4}", summary.error_rate_forward());
                println!("  reverse error rate  {:.4}", summary.error_rate_reverse());
            }
        }

        // ── Generate ─────────────────────────────────────────────────────────
        Commands::Generate { kind, output, count, seed } => {
            let kind = parse_kind(&kind)?;
            let rows = RecordGenerator::new(kind).generate_rows(count, seed);
            let written = write_fixture(&output, kind, &rows)?;
            println!("Created: {} ({written} {kind} records)", output.display());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_kind(s: &str) -> Result<MetricKind, String> {
    MetricKind::from_name(s).ok_or_else(|| {
        let known: Vec<&str> = MetricKind::ALL.iter().map(|k| k.name()).collect();
        format!("unknown metric '{s}', expected one of: {}", known.join(", "))
    })
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None       => Box::new(io::stdout().lock()),
    })
}

fn print_summary(summary: &RunSummary) {
    let show = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
    println!("── {} ─────────────────────────────────────────", summary.run_name);
    println!("  Q30 forward         {}", show(summary.q30_forward));
    println!("  Q30 reverse         {}", show(summary.q30_reverse));
    println!("  Cluster density     {}", show(summary.cluster_density));
    println!("  Pass rate           {}", show(summary.pass_rate));
    println!("  Error rate forward  {}", show(summary.error_rate_forward));
    println!("  Error rate reverse  {}", show(summary.error_rate_reverse));
}
