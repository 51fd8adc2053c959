use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dtstamp_core::{
    stamp_directory_with_control, CancellationToken, ProcessControl, Quality, StampConfig,
    DEFAULT_FONT_FILE, DEFAULT_FONT_SIZE,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dtstamp", version, about = "Stamp each photo's capture date and time onto a re-encoded copy")]
struct Cli {
    /// Folder containing the images to stamp (default: current directory)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Font size (pt) of the date/time stamp
    #[arg(long, default_value_t = DEFAULT_FONT_SIZE)]
    size: u32,

    /// JPEG quality of the stamped copies (0-100)
    #[arg(long, default_value_t = Quality::DEFAULT.to_string())]
    quality: String,

    /// Font file used for the stamp
    #[arg(long, default_value = DEFAULT_FONT_FILE)]
    font: PathBuf,

    /// Output directory, emptied before every run (default: <path>/output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the batch summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log every pipeline step
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Turn the flags into a run configuration. Nothing on disk is touched here.
fn build_config(cli: &Cli) -> anyhow::Result<StampConfig> {
    let quality: Quality = cli.quality.parse()?;
    let working_dir = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("could not determine the current directory")?,
    };
    let mut config = StampConfig::new(working_dir)
        .with_font_path(&cli.font)
        .with_font_size(cli.size)
        .with_quality(quality);
    if let Some(output) = &cli.output {
        config = config.with_output_dir(output);
    }
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let t_total = std::time::Instant::now();

    let config = build_config(&cli)?;

    eprintln!("PATH:      {}", config.working_dir.display());
    eprintln!("OUTPUT:    {}", config.output_dir.display());
    eprintln!("FONT SIZE: {}", config.font_size);
    eprintln!("QUALITY:   {}", config.quality);
    eprintln!();

    let token = CancellationToken::new();
    {
        let token = token.clone();
        ctrlc::set_handler(move || token.cancel()).context("could not install Ctrl-C handler")?;
    }
    let control = ProcessControl::new().with_cancel_token(token);

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let summary = stamp_directory_with_control(&config, &control, &|_stage, completed, total, message| {
        bar.set_length(total);
        bar.set_position(completed);
        bar.set_message(message.to_string());
    })?;
    bar.finish_and_clear();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    eprintln!(
        "Done! {} image files found, {} stamped, {} skipped, {} failed ({:.2}s)",
        summary.found,
        summary.processed,
        summary.skipped,
        summary.failed,
        t_total.elapsed().as_secs_f64()
    );
    for report in summary.failures() {
        if let dtstamp_core::ProcessingOutcome::Failed { error } = &report.outcome {
            eprintln!("  {}", dtstamp_core::error_chain(error));
        }
    }

    if summary.cancelled > 0 {
        eprintln!("Cancelled: {} files were not started", summary.cancelled);
        return Ok(ExitCode::from(130));
    }
    Ok(ExitCode::SUCCESS)
}
