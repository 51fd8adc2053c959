use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{ImageReader, ImageResult, RgbImage};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::candidate::ImageCandidate;
use crate::config::Quality;
use crate::encode::encode_jpeg;
use crate::error::{error_chain, FileError};
use crate::font::FontResource;
use crate::metadata::{read_capture_timestamp, CaptureTimestamp};
use crate::output::output_path;
use crate::overlay::{render_overlay, RenderedOverlay};
use crate::ThrottledProgress;

/// How one candidate ended up.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingOutcome {
    Stamped {
        timestamp: CaptureTimestamp,
    },
    SkippedNoMetadata,
    Failed {
        #[serde(serialize_with = "serialize_error")]
        error: FileError,
    },
}

impl ProcessingOutcome {
    pub fn is_stamped(&self) -> bool {
        matches!(self, Self::Stamped { .. })
    }
}

fn serialize_error<S: Serializer>(error: &FileError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&error_chain(error))
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub candidate: ImageCandidate,
    pub outcome: ProcessingOutcome,
}

/// Totals for a run, plus one report per attempted file in discovery order.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub found: u64,
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Files never started because the run was cancelled
    pub cancelled: u64,
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    /// Fold per-file results; `None` marks a file skipped by cancellation.
    pub fn from_reports(found: u64, reports: impl IntoIterator<Item = Option<FileReport>>) -> Self {
        let start = Self {
            found,
            ..Self::default()
        };
        reports.into_iter().fold(start, |mut summary, report| {
            let Some(report) = report else {
                summary.cancelled += 1;
                return summary;
            };
            match report.outcome {
                ProcessingOutcome::Stamped { .. } => summary.processed += 1,
                ProcessingOutcome::SkippedNoMetadata => summary.skipped += 1,
                ProcessingOutcome::Failed { .. } => summary.failed += 1,
            }
            summary.reports.push(report);
            summary
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, ProcessingOutcome::Failed { .. }))
    }
}

/// Runs the per-file pipeline: read metadata, format, render, encode.
pub struct BatchProcessor<'a> {
    font: &'a FontResource,
    output_dir: &'a Path,
    quality: Quality,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(font: &'a FontResource, output_dir: &'a Path, quality: Quality) -> Self {
        Self {
            font,
            output_dir,
            quality,
        }
    }

    /// Stamp every candidate. A failing file never stops the others.
    pub fn run(
        &self,
        candidates: Vec<ImageCandidate>,
        cancel_token: Option<&CancellationToken>,
        progress: &ThrottledProgress,
    ) -> BatchSummary {
        let total = candidates.len() as u64;
        let counter = AtomicU64::new(0);

        let reports: Vec<Option<FileReport>> = candidates
            .into_par_iter()
            .map(|candidate| {
                if cancel_token.is_some_and(CancellationToken::is_cancelled) {
                    return None;
                }
                let outcome = self.process_file(&candidate);
                let completed = counter.fetch_add(1, Ordering::Relaxed) + 1;
                progress.report("stamp", completed, total, &candidate.file_name());
                Some(FileReport { candidate, outcome })
            })
            .collect();
        progress.finish("stamp", counter.into_inner(), total);

        BatchSummary::from_reports(total, reports)
    }

    pub fn process_file(&self, candidate: &ImageCandidate) -> ProcessingOutcome {
        let outcome = match read_capture_timestamp(candidate.path()) {
            Ok(None) => ProcessingOutcome::SkippedNoMetadata,
            Ok(Some(timestamp)) => match self.stamp(candidate, &timestamp) {
                Ok(()) => ProcessingOutcome::Stamped { timestamp },
                Err(error) => ProcessingOutcome::Failed { error },
            },
            Err(error) => ProcessingOutcome::Failed { error },
        };
        log_outcome(&candidate.file_name(), &outcome);
        outcome
    }

    fn stamp(&self, candidate: &ImageCandidate, timestamp: &CaptureTimestamp) -> Result<(), FileError> {
        let file = candidate.file_name();

        let mut image = decode(candidate).map_err(|source| FileError::Decode {
            file: file.clone(),
            source,
        })?;

        let overlay = RenderedOverlay::new(timestamp, self.font);
        debug!(file = %file, text = %overlay.text, "rendering overlay");
        render_overlay(&mut image, &overlay, self.font).map_err(|source| FileError::Render {
            file: file.clone(),
            source,
        })?;

        let dest = output_path(self.output_dir, candidate);
        if let Err(source) = encode_jpeg(&image, &dest, self.quality) {
            // No half-written copies in the output directory.
            let _ = fs::remove_file(&dest);
            return Err(FileError::Encode { file, source });
        }
        Ok(())
    }
}

fn decode(candidate: &ImageCandidate) -> ImageResult<RgbImage> {
    let reader = ImageReader::open(candidate.path())?.with_guessed_format()?;
    Ok(reader.decode()?.to_rgb8())
}

fn log_outcome(file: &str, outcome: &ProcessingOutcome) {
    match outcome {
        ProcessingOutcome::Stamped { timestamp } => {
            info!(file, exif_datetime = %timestamp, "stamped")
        }
        ProcessingOutcome::SkippedNoMetadata => {
            info!(file, "skipped: no capture timestamp in metadata")
        }
        ProcessingOutcome::Failed { error } => {
            warn!(file, error = %error_chain(error), "failed to stamp")
        }
    }
}
