//! Deterministic artifact naming.

use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Timestamp format shared by both artifacts (second resolution).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Glob matching exactly one `TIMESTAMP_FORMAT` stamp.
const TIMESTAMP_GLOB: &str =
    "[0-9][0-9][0-9][0-9][0-9][0-9][0-9][0-9]_[0-9][0-9][0-9][0-9][0-9][0-9]";

/// Source of "now" for naming.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// File names of one run's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub workbook: String,
    pub plot: String,
}

impl ArtifactNames {
    pub fn new(prefix: &str, at: NaiveDateTime) -> Self {
        let ts = at.format(TIMESTAMP_FORMAT);
        Self {
            workbook: format!("{prefix}_results_{ts}.xlsx"),
            plot: format!("{prefix}_plot_{ts}.png"),
        }
    }

    /// Glob patterns (workbook, plot) matching the artifacts of any run
    /// with exactly this `prefix`.
    pub fn patterns(prefix: &str) -> [String; 2] {
        let prefix = glob::Pattern::escape(prefix);
        [
            format!("{prefix}_results_{TIMESTAMP_GLOB}.xlsx"),
            format!("{prefix}_plot_{TIMESTAMP_GLOB}.png"),
        ]
    }

    pub fn from_clock(prefix: &str, clock: &dyn Clock) -> Self {
        Self::new(prefix, clock.now())
    }

    pub fn workbook_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.workbook)
    }

    pub fn plot_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.plot)
    }
}
