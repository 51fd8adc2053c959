pub mod batch;
pub mod cancel;
pub mod candidate;
pub mod config;
pub mod encode;
pub mod error;
pub mod font;
pub mod format;
pub mod metadata;
pub mod output;
pub mod overlay;

use std::time::{Duration, Instant};

use tracing::{info, warn};

pub use batch::{BatchProcessor, BatchSummary, FileReport, ProcessingOutcome};
pub use cancel::CancellationToken;
pub use candidate::{ImageCandidate, InputFormat};
pub use config::{Quality, StampConfig, DEFAULT_FONT_FILE, DEFAULT_FONT_SIZE};
pub use error::{error_chain, FileError, StampError};
pub use font::FontResource;
pub use metadata::CaptureTimestamp;
pub use overlay::{OverlayStyle, RenderedOverlay};

/// Control options for a run.
#[derive(Debug, Clone, Default)]
pub struct ProcessControl {
    /// Cancellation token; once cancelled no further files are started.
    pub cancel_token: Option<CancellationToken>,
}

impl ProcessControl {
    /// Create a new ProcessControl with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create ProcessControl with a cancellation token.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }
}

/// Type alias for progress callback: (stage, completed, total, message)
pub type ProgressCallback<'a> = dyn Fn(&str, u64, u64, &str) + Send + Sync + 'a;

/// Throttled progress reporter; emits at most every 200ms, plus one final
/// report from [`ThrottledProgress::finish`].
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback<'a>,
    last_emit: std::sync::Mutex<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a ProgressCallback<'a>) -> Self {
        Self {
            inner,
            last_emit: std::sync::Mutex::new(Instant::now() - Duration::from_secs(1)),
        }
    }

    pub fn report(&self, stage: &str, completed: u64, total: u64, message: &str) {
        let Ok(mut last) = self.last_emit.lock() else {
            return;
        };
        if last.elapsed() < Duration::from_millis(200) {
            return;
        }
        *last = Instant::now();
        (self.inner)(stage, completed, total, message);
    }

    /// Always emitted, after every worker has reported.
    pub fn finish(&self, stage: &str, completed: u64, total: u64) {
        (self.inner)(stage, completed, total, "");
    }
}

/// Stamp every image in the configured directory.
pub fn stamp_directory(
    config: &StampConfig,
    progress_callback: &ProgressCallback<'_>,
) -> Result<BatchSummary, StampError> {
    stamp_directory_with_control(config, &ProcessControl::default(), progress_callback)
}

/// Stamp every image in the configured directory, honouring `control`.
///
/// Every precondition (directory, font size, output location, font, at least
/// one candidate) is checked before the output directory is touched. After
/// that, per-file problems end up in the summary and never fail the run.
pub fn stamp_directory_with_control(
    config: &StampConfig,
    control: &ProcessControl,
    progress_callback: &ProgressCallback<'_>,
) -> Result<BatchSummary, StampError> {
    config.validate()?;

    let font = FontResource::load(&config.font_path, config.font_size)?;

    let candidates = candidate::scan_candidates(&config.working_dir)?;
    if candidates.is_empty() {
        return Err(StampError::NoCandidates(config.working_dir.clone()));
    }

    output::prepare_output_dir(&config.output_dir)?;

    if OverlayStyle::for_font_size(config.font_size).outline_width == 0 {
        warn!(
            font_size = config.font_size,
            "font size below 20: stamps are drawn without an outline"
        );
    }
    info!(found = candidates.len(), font = font.family(), "stamping images");

    let tp = ThrottledProgress::new(progress_callback);
    let processor = BatchProcessor::new(&font, &config.output_dir, config.quality);
    let summary = processor.run(candidates, control.cancel_token.as_ref(), &tp);

    info!(
        found = summary.found,
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        cancelled = summary.cancelled,
        "batch finished"
    );
    Ok(summary)
}
