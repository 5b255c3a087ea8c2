//! Staged writes for a run's artifacts.
//!
//! Epistemic foundation:
//! - K_i: Either both artifacts appear under their final names or neither does
//! - K_i: Uses write-then-rename: stage → write → commit
//! - B_i: A writer fails → staged files are removed on drop
//! - I^B: Crash mid-run → stale staged files are swept on the next run

use super::ArtifactNames;
use crate::models::{Result, TcompareError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Marker prepended to staged file names.
pub const STAGING_MARKER: &str = ".partial-";

/// One artifact's staged and final locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Where the writer writes
    pub staged: PathBuf,
    /// Where the file lands on commit
    pub target: PathBuf,
}

impl StagedFile {
    fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            staged: dir.join(format!("{STAGING_MARKER}{file_name}")),
            target: dir.join(file_name),
        }
    }
}

/// Staging area for the workbook and the plot of one run.
///
/// Staged names keep the real extension so extension-sniffing writers
/// pick the right encoder.
pub struct Staging {
    workbook: StagedFile,
    plot: StagedFile,
    /// Whether the staging has been committed or aborted
    finished: bool,
}

impl Staging {
    /// Begin staging in `dir`, creating it when missing.
    pub fn begin(dir: &Path, names: &ArtifactNames) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| TcompareError::output_write(dir, e))?;

        let staging = Self {
            workbook: StagedFile::new(dir, &names.workbook),
            plot: StagedFile::new(dir, &names.plot),
            finished: false,
        };

        debug!(
            workbook = %staging.workbook.staged.display(),
            plot = %staging.plot.staged.display(),
            "Staging started"
        );
        Ok(staging)
    }

    /// Remove staged files left behind by an interrupted run.
    ///
    /// Only names this prefix could have produced are touched; other
    /// prefixes sharing the directory keep their staged files.
    /// Returns the removed paths.
    pub fn recover(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
        let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
        let mut stale = Vec::new();

        for name in ArtifactNames::patterns(prefix) {
            let pattern = Path::new(&escaped_dir).join(format!("{STAGING_MARKER}{name}"));
            let matches = glob::glob(&pattern.to_string_lossy())
                .map_err(|e| TcompareError::Internal(format!("Invalid glob pattern: {e}")))?;
            stale.extend(matches.filter_map(|r| r.ok()));
        }

        for path in &stale {
            warn!(path = %path.display(), "Removing stale staged artifact");
            fs::remove_file(path).map_err(|e| TcompareError::output_write(path, e))?;
        }

        Ok(stale)
    }

    pub fn workbook(&self) -> &StagedFile {
        &self.workbook
    }

    pub fn plot(&self) -> &StagedFile {
        &self.plot
    }

    /// Move both staged files into place.
    ///
    /// If the second rename fails the first is rolled back.
    /// Returns the final (workbook, plot) paths.
    pub fn commit(mut self) -> Result<(PathBuf, PathBuf)> {
        if self.finished {
            return Err(TcompareError::Internal(
                "Staging already finished".to_string(),
            ));
        }

        for file in [&self.workbook, &self.plot] {
            if !file.staged.is_file() {
                return Err(TcompareError::Internal(format!(
                    "Staged artifact {} was never written",
                    file.staged.display()
                )));
            }
        }

        fs::rename(&self.workbook.staged, &self.workbook.target)
            .map_err(|e| TcompareError::output_write(&self.workbook.target, e))?;

        if let Err(e) = fs::rename(&self.plot.staged, &self.plot.target) {
            if let Err(undo) = fs::remove_file(&self.workbook.target) {
                warn!(
                    path = %self.workbook.target.display(),
                    error = %undo,
                    "Failed to roll back committed workbook"
                );
            }
            return Err(TcompareError::output_write(&self.plot.target, e));
        }

        self.finished = true;
        debug!("Staging committed");

        Ok((self.workbook.target.clone(), self.plot.target.clone()))
    }

    /// Discard whatever has been staged.
    pub fn abort(mut self) {
        self.discard();
    }

    fn discard(&mut self) {
        if self.finished {
            return;
        }
        for file in [&self.workbook, &self.plot] {
            if file.staged.exists() {
                if let Err(e) = fs::remove_file(&file.staged) {
                    warn!(path = %file.staged.display(), error = %e, "Failed to remove staged artifact");
                }
            }
        }
        self.finished = true;
        debug!("Staging aborted");
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        // Dropped on an error path: nothing half-written may stay behind
        if !self.finished {
            self.discard();
        }
    }
}
