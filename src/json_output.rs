//! JSON line output for scripts and GUI wrappers
//!
//! When --json-progress is enabled, all progress and status information
//! is emitted as JSON lines to stdout, suppressing all other output.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::grid_processing::ConversionOutcome;

/// Last progress emission timestamp (milliseconds since epoch)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

/// Minimum gap between two progress lines (~25 per second)
const PROGRESS_INTERVAL_MS: u64 = 40;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonMessage {
    /// Row progress for the file being converted
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// Grid document written
    FileCompleted {
        input_path: String,
        output_path: String,
        grid_width: u32,
        grid_height: u32,
        processing_time_ms: u128,
    },
    /// Conversion failed
    FileFailed { input_path: String, error: String },
    /// End of run
    Summary {
        total_files: usize,
        converted: usize,
        failed: usize,
        duration_secs: f64,
    },
}

/// Throttle rule: emit after the interval has passed, and always emit the final update
fn should_emit(now_ms: u64, last_ms: u64, current: usize, total: usize) -> bool {
    now_ms.saturating_sub(last_ms) >= PROGRESS_INTERVAL_MS || current == total
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Create and emit a progress message, throttled
    pub fn progress(current: usize, total: usize, message: impl Into<String>) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if should_emit(now_ms, last_ms, current, total) {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            Self::Progress {
                current,
                total,
                message: message.into(),
            }
            .emit();
        }
    }

    pub fn file_completed(outcome: &ConversionOutcome) {
        Self::FileCompleted {
            input_path: outcome.source.display().to_string(),
            output_path: outcome.destination.display().to_string(),
            grid_width: outcome.grid_width,
            grid_height: outcome.grid_height,
            processing_time_ms: outcome.elapsed.as_millis(),
        }
        .emit();
    }

    pub fn file_failed(input_path: &Path, error: impl Into<String>) {
        Self::FileFailed {
            input_path: input_path.display().to_string(),
            error: error.into(),
        }
        .emit();
    }

    pub fn summary(total_files: usize, converted: usize, failed: usize, duration_secs: f64) {
        Self::Summary {
            total_files,
            converted,
            failed,
            duration_secs,
        }
        .emit();
    }
}
