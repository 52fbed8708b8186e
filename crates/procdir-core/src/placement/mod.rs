pub mod locks;
pub mod naming;

pub use locks::PathLocks;

use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::BlockedExtensions;
use crate::error::PlacementError;
use crate::fs::FileSystem;
use crate::progress::ProgressReporter;

const SCRATCH_SUFFIX: &str = ".procdir-part";

/// What to do when an incoming file's name is already taken in the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicy {
    /// Delete the existing file and put the new one in its place.
    Substitute,
    /// Keep both: the new file gets a `_YYYYmmdd_HHMMSS` suffix.
    RenameWithTimestamp,
    /// Leave the existing file alone and drop the incoming one.
    Skip,
}

/// How an incoming file reaches the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// The source is a staged copy owned by the placer. It is consumed
    /// whatever the outcome.
    Move,
    /// The source belongs to the caller and is moved into place. It is
    /// removed only once stored; skipped or rejected files stay where they are.
    Relocate,
    /// The source belongs to the caller and is never touched.
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub source: PathBuf,
    pub display_name: String,
    pub transfer: Transfer,
}

impl UploadFile {
    pub fn new(source: impl Into<PathBuf>, display_name: impl Into<String>, transfer: Transfer) -> Self {
        Self {
            source: source.into(),
            display_name: display_name.into(),
            transfer,
        }
    }

    /// Copy a caller-owned file, keeping its own name.
    pub fn copy_of(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let display_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(source, display_name, Transfer::Copy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    Placed(String),
    Replaced(String),
    RenamedTo(String),
    Skipped(String),
}

impl PlacementOutcome {
    /// Name of the file as it now exists (or would have) in the destination.
    pub fn file_name(&self) -> &str {
        match self {
            PlacementOutcome::Placed(name)
            | PlacementOutcome::Replaced(name)
            | PlacementOutcome::RenamedTo(name)
            | PlacementOutcome::Skipped(name) => name,
        }
    }
}

impl fmt::Display for PlacementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementOutcome::Placed(name) => write!(f, "placed as {}", name),
            PlacementOutcome::Replaced(name) => write!(f, "replaced {}", name),
            PlacementOutcome::RenamedTo(name) => write!(f, "renamed to {}", name),
            PlacementOutcome::Skipped(name) => write!(f, "skipped, {} already exists", name),
        }
    }
}

#[derive(Debug)]
pub struct FilePlacement {
    pub file: String,
    pub result: Result<PlacementOutcome, PlacementError>,
}

/// One entry per input file, in input order.
#[derive(Debug)]
pub struct PlacementReport {
    pub destination: PathBuf,
    pub entries: Vec<FilePlacement>,
}

impl PlacementReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files that ended up in the destination (placed, replaced or renamed).
    pub fn stored_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(&e.result, Ok(o) if !matches!(o, PlacementOutcome::Skipped(_))))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.result, Ok(PlacementOutcome::Skipped(_))))
            .count()
    }

    pub fn rejected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_err()).count()
    }
}

/// Places batches of files into a folder, one independent decision per file.
pub struct Placer<'a> {
    fs: &'a dyn FileSystem,
    blocked: &'a BlockedExtensions,
    clock: Box<dyn Fn() -> NaiveDateTime + Send + Sync + 'a>,
}

impl<'a> Placer<'a> {
    pub fn new(fs: &'a dyn FileSystem, blocked: &'a BlockedExtensions) -> Self {
        Self {
            fs,
            blocked,
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Place every file and report exactly one entry per file. A failure on
    /// one file never stops the rest of the batch.
    pub fn place(
        &self,
        destination: &Path,
        files: &[UploadFile],
        policy: PlacementPolicy,
        reporter: &dyn ProgressReporter,
    ) -> PlacementReport {
        reporter.on_place_start(files.len());
        let mut entries = Vec::with_capacity(files.len());

        for file in files {
            let result = self.place_one(destination, file, policy);
            match &result {
                Ok(outcome) => debug!("{}: {}", file.display_name, outcome),
                Err(err) => warn!("{}: rejected, {}", file.display_name, err),
            }
            if file.transfer == Transfer::Move {
                self.discard_staged(file);
            }
            let entry = FilePlacement {
                file: file.display_name.clone(),
                result,
            };
            reporter.on_file_placed(&entry);
            entries.push(entry);
        }

        let report = PlacementReport {
            destination: destination.to_path_buf(),
            entries,
        };
        info!(
            "Placed {} of {} file(s) in {} ({} skipped, {} rejected)",
            report.stored_count(),
            report.len(),
            destination.display(),
            report.skipped_count(),
            report.rejected_count(),
        );
        reporter.on_place_complete(&report);
        report
    }

    fn place_one(
        &self,
        destination: &Path,
        file: &UploadFile,
        policy: PlacementPolicy,
    ) -> Result<PlacementOutcome, PlacementError> {
        let name = naming::sanitize_file_name(&file.display_name);
        if name.is_empty() || name == "." || name == ".." {
            return Err(PlacementError::InvalidFileName(file.display_name.clone()));
        }
        if let Some(ext) = self
            .blocked
            .check(Path::new(&name))
            .or_else(|| self.blocked.check(&file.source))
        {
            return Err(PlacementError::BlockedExtension(ext));
        }

        let target = destination.join(&name);
        if !self.fs.exists(&target) {
            self.transfer(file, &target)?;
            return Ok(PlacementOutcome::Placed(name));
        }

        match policy {
            PlacementPolicy::Skip => Ok(PlacementOutcome::Skipped(name)),
            PlacementPolicy::Substitute => {
                self.replace(file, destination, &name, &target)?;
                Ok(PlacementOutcome::Replaced(name))
            }
            PlacementPolicy::RenameWithTimestamp => {
                let renamed = naming::timestamped_name(&name, (self.clock)());
                let renamed_target = destination.join(&renamed);
                // Same-second repeats collide; reject rather than overwrite.
                if self.fs.exists(&renamed_target) {
                    return Err(PlacementError::RenameCollision(renamed));
                }
                self.transfer(file, &renamed_target)?;
                Ok(PlacementOutcome::RenamedTo(renamed))
            }
        }
    }

    fn transfer(&self, file: &UploadFile, target: &Path) -> Result<(), PlacementError> {
        match file.transfer {
            Transfer::Move | Transfer::Relocate => self.fs.move_file(&file.source, target)?,
            Transfer::Copy => {
                self.fs.copy_file(&file.source, target)?;
            }
        }
        Ok(())
    }

    /// Copy the source next to `target` under a scratch name, then rename it
    /// over `target`. The existing file is untouched until the rename.
    fn replace(
        &self,
        file: &UploadFile,
        destination: &Path,
        name: &str,
        target: &Path,
    ) -> Result<(), PlacementError> {
        let scratch = destination.join(format!(".{}{}", name, SCRATCH_SUFFIX));
        let swapped = self
            .fs
            .copy_file(&file.source, &scratch)
            .and_then(|_| self.fs.move_file(&scratch, target));
        if let Err(err) = swapped {
            if self.fs.exists(&scratch) {
                if let Err(cleanup) = self.fs.remove_file(&scratch) {
                    warn!("Could not remove {}: {}", scratch.display(), cleanup);
                }
            }
            return Err(err.into());
        }

        if file.transfer == Transfer::Relocate {
            if let Err(err) = self.fs.remove_file(&file.source) {
                warn!(
                    "{} was stored but could not be removed: {}",
                    file.source.display(),
                    err
                );
            }
        }
        Ok(())
    }

    /// Remove a staged source that was not moved into place.
    fn discard_staged(&self, file: &UploadFile) {
        if !self.fs.exists(&file.source) {
            return;
        }
        if let Err(err) = self.fs.remove_file(&file.source) {
            warn!(
                "Could not remove staged file {}: {}",
                file.source.display(),
                err
            );
        }
    }
}
