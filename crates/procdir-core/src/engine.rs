use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::{AppConfig, AreaRoots, BlockedExtensions};
use crate::error::Error;
use crate::fs::{FileSystem, OsFileSystem};
use crate::materializer;
use crate::model::{ProcessNumber, ProcessRecord, ProcessRequest};
use crate::placement::{PathLocks, PlacementPolicy, PlacementReport, Placer, UploadFile};
use crate::platform;
use crate::progress::{ProgressReporter, SilentReporter};
use crate::query::{self, ProcessFilter};
use crate::scanner::{self, ProcessRegistry};
use crate::validator::{self, Consistency};

/// Entry point for callers: validates processes, creates their folders and
/// files documents into them. Holds no process state; every query rescans.
pub struct ProcessArchive {
    roots: AreaRoots,
    fs: Arc<dyn FileSystem>,
    blocked: BlockedExtensions,
    expense_dir_name: String,
    locks: PathLocks,
    reporter: Arc<dyn ProgressReporter>,
}

impl ProcessArchive {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            roots: AreaRoots::from_config(config),
            fs: Arc::new(OsFileSystem),
            blocked: BlockedExtensions::new(&config.blocked_extensions),
            expense_dir_name: config.expense_dir_name.clone(),
            locks: PathLocks::new(),
            reporter: Arc::new(SilentReporter),
        }
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn roots(&self) -> &AreaRoots {
        &self.roots
    }

    /// Fresh registry of every process folder currently on disk.
    pub fn scan_registry(&self) -> Result<ProcessRegistry, Error> {
        self.reporter.on_scan_start();
        let start = Instant::now();
        let registry = scanner::scan_registry(self.fs.as_ref(), &self.roots)?;
        let elapsed = start.elapsed().as_secs_f64();
        debug!(
            "Registry scan completed in {:.2}s, {} processes",
            elapsed,
            registry.len()
        );
        self.reporter.on_scan_complete(registry.len(), elapsed);
        Ok(registry)
    }

    /// Check `request` against the existing processes without creating anything.
    pub fn check(&self, request: &ProcessRequest) -> Result<Consistency, Error> {
        let registry = self.scan_registry()?;
        validator::check_consistency(request, &registry)
    }

    /// Validate `request` and return the folder documents should go into,
    /// creating it when the process is new.
    ///
    /// Conflicts abort before anything is created. An identical existing
    /// process resolves to its current folder, wherever it lives.
    pub fn validate_and_materialize(&self, request: &ProcessRequest) -> Result<PathBuf, Error> {
        match self.check(request)? {
            Consistency::Existing(record) => {
                info!(
                    "Reusing folder for process {}: {}",
                    request.number,
                    record.path.display()
                );
                Ok(record.path)
            }
            Consistency::New => materializer::materialize(self.fs.as_ref(), &self.roots, request),
        }
    }

    /// Place `files` into `destination`. Batches aimed at the same folder
    /// are serialized.
    pub fn place_files(
        &self,
        destination: &Path,
        files: &[UploadFile],
        policy: PlacementPolicy,
    ) -> PlacementReport {
        let placer = Placer::new(self.fs.as_ref(), &self.blocked);
        self.locks.with_lock(destination, || {
            placer.place(destination, files, policy, self.reporter.as_ref())
        })
    }

    pub fn query_processes(&self, filter: &ProcessFilter) -> Result<Vec<ProcessRecord>, Error> {
        let registry = self.scan_registry()?;
        Ok(query::query_processes(&registry, filter))
    }

    /// Every process with this number, across clients and areas.
    pub fn find_by_number(&self, number: &str) -> Result<Vec<ProcessRecord>, Error> {
        let number = ProcessNumber::parse(number)?;
        let registry = self.scan_registry()?;
        Ok(registry
            .with_number(&number)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Sub-folder for expense documents inside a process folder. Created if missing.
    pub fn expense_folder(&self, process_path: &Path) -> Result<PathBuf, Error> {
        if !self.fs.is_dir(process_path) {
            return Err(Error::FolderNotFound(process_path.to_path_buf()));
        }
        let path = process_path.join(&self.expense_dir_name);
        materializer::ensure_dir(self.fs.as_ref(), &path)?;
        Ok(path)
    }

    pub fn open_in_file_explorer(&self, path: &Path) -> Result<(), Error> {
        platform::open_in_file_explorer(path)
    }
}
