use anyhow::{Context, Result};
use clap::Parser;
use mvmeta::config::AppConfig;
use mvmeta::probe::FfprobeProber;
use mvmeta::report::{self, OutputFormat};
use mvmeta::scanner;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mvmeta", version, about = "Music video filename and type classifier")]
struct Cli {
    /// Directory to scan
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Live set threshold in minutes (overrides config)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Scan subdirectories too
    #[arg(short, long)]
    recursive: bool,

    /// Number of parallel workers (0 = auto-detect from config)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Config file (defaults to ~/.config/mvmeta/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // An explicit config file must load; the default one is optional
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path).context("Failed to load config")?,
        None => AppConfig::load(),
    };

    let classifier = config
        .classifier_config(cli.threshold.map(|minutes| minutes * 60.0))
        .context("Invalid configuration")?;
    log::info!(
        "Live set threshold: {:.0}s",
        classifier.live_set_threshold.seconds()
    );

    let prober = FfprobeProber::new(&config.ffprobe_path, config.probe_timeout());
    if !prober.is_available() {
        log::warn!(
            "ffprobe not found at '{}'; technical fields will be empty",
            config.ffprobe_path.display()
        );
    }

    let files = scanner::discover(&cli.directory, cli.recursive).context("Discovery failed")?;
    if files.is_empty() {
        eprintln!("No video files found.");
        return Ok(());
    }
    eprintln!("Found {} video files", files.len());

    let workers = if cli.jobs > 0 { cli.jobs } else { config.resolve_workers() };
    let records = scanner::scan_files(&files, &prober, &classifier, workers)
        .context("Scan failed")?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            report::render(&records, cli.format, &mut out).context("Failed to write report")?;
            out.flush()?;
            eprintln!("Report written to {}", path.display());
        }
        None => {
            let mut out = io::stdout().lock();
            report::render(&records, cli.format, &mut out).context("Failed to write report")?;
            out.flush()?;
        }
    }

    Ok(())
}
