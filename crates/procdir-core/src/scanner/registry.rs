use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::codec::FolderName;
use crate::config::AreaRoots;
use crate::error::Error;
use crate::fs::FileSystem;
use crate::model::{Area, ProcessNumber, ProcessRecord, Service, Year};

/// Composite registry key. Field order gives the query ordering:
/// process number first, then area.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryKey {
    pub number: ProcessNumber,
    pub area: Area,
    pub service: Service,
    pub year: Year,
    pub client: String,
    pub reference: String,
}

impl RegistryKey {
    pub fn for_record(record: &ProcessRecord) -> Self {
        Self {
            number: record.number.clone(),
            area: record.area,
            service: record.service,
            year: record.year.clone(),
            client: record.client.to_uppercase(),
            reference: record.reference.as_str().to_uppercase(),
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}{}{}_{}_{}",
            self.number,
            self.area.letter(),
            self.service.letter(),
            self.year,
            self.client,
            self.reference
        )
    }
}

/// Snapshot of every process folder found on disk at scan time.
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    records: BTreeMap<RegistryKey, ProcessRecord>,
}

impl ProcessRegistry {
    pub fn from_records(records: impl IntoIterator<Item = ProcessRecord>) -> Self {
        let mut map = BTreeMap::new();
        for record in records {
            let key = RegistryKey::for_record(&record);
            if let Some(previous) = map.insert(key.clone(), record) {
                warn!(
                    "Process {} found twice, keeping the later folder (dropped {})",
                    key,
                    previous.path.display()
                );
            }
        }
        Self { records: map }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &RegistryKey) -> Option<&ProcessRecord> {
        self.records.get(key)
    }

    /// Records ordered by process number, then area.
    pub fn records(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.records.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegistryKey, &ProcessRecord)> {
        self.records.iter()
    }

    /// Existing processes of the same client (case-insensitive), area and number.
    pub fn matching(
        &self,
        client: &str,
        area: Area,
        number: &ProcessNumber,
    ) -> Vec<&ProcessRecord> {
        let client = client.to_uppercase();
        self.with_number(number)
            .into_iter()
            .filter(|r| r.area == area && r.client.to_uppercase() == client)
            .collect()
    }

    pub fn with_number(&self, number: &ProcessNumber) -> Vec<&ProcessRecord> {
        self.records
            .iter()
            .skip_while(|(key, _)| key.number < *number)
            .take_while(|(key, _)| key.number == *number)
            .map(|(_, record)| record)
            .collect()
    }
}

/// Walk both area trees and decode every process folder.
///
/// Layouts `<root>/<client>/<year>/<process>` and `<root>/<client>/<process>`
/// are both recognized. Directories that do not follow the folder-name grammar
/// are ignored. A missing area root contributes no records.
pub fn scan_registry(fs: &dyn FileSystem, roots: &AreaRoots) -> Result<ProcessRegistry, Error> {
    let areas: Vec<(Area, PathBuf)> = roots
        .iter()
        .map(|(area, root)| (area, root.to_path_buf()))
        .collect();

    let per_area: Vec<Vec<ProcessRecord>> = areas
        .par_iter()
        .map(|(area, root)| scan_area(fs, *area, root))
        .collect::<Result<_, Error>>()?;

    let registry = ProcessRegistry::from_records(per_area.into_iter().flatten());
    debug!("Registry scan found {} processes", registry.len());
    Ok(registry)
}

fn scan_area(fs: &dyn FileSystem, area: Area, root: &Path) -> Result<Vec<ProcessRecord>, Error> {
    let clients = match fs.list_directories(root) {
        Ok(clients) => clients,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("{} directory not found: {}", area, root.display());
            return Ok(Vec::new());
        }
        Err(err) => return tolerate(root, err).map(|_| Vec::new()),
    };

    let per_client: Vec<Vec<ProcessRecord>> = clients
        .par_iter()
        .map(|client_dir| scan_client(fs, area, client_dir))
        .collect::<Result<_, Error>>()?;

    Ok(per_client.into_iter().flatten().collect())
}

fn scan_client(
    fs: &dyn FileSystem,
    area: Area,
    client_dir: &Path,
) -> Result<Vec<ProcessRecord>, Error> {
    let client = dir_name(client_dir);
    let mut records = Vec::new();

    for child in list_or_skip(fs, client_dir)? {
        if let Some(record) = decode_record(area, &client, &child) {
            records.push(record);
            continue;
        }
        // Not a process folder, so treat it as a year directory.
        for grandchild in list_or_skip(fs, &child)? {
            if let Some(record) = decode_record(area, &client, &grandchild) {
                records.push(record);
            }
        }
    }

    Ok(records)
}

fn decode_record(area: Area, client: &str, dir: &Path) -> Option<ProcessRecord> {
    let name = FolderName::decode(&dir_name(dir))?;
    if name.area != area {
        // The tree the folder sits in is authoritative.
        warn!(
            "Folder {} has area letter {} but lives in the {} tree",
            dir.display(),
            name.area.letter(),
            area
        );
    }
    Some(ProcessRecord {
        number: name.number,
        area,
        client: client.to_string(),
        service: name.service,
        year: name.year,
        reference: name.reference,
        path: dir.to_path_buf(),
    })
}

fn list_or_skip(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>, Error> {
    match fs.list_directories(dir) {
        Ok(dirs) => Ok(dirs),
        Err(err) => tolerate(dir, err).map(|_| Vec::new()),
    }
}

/// Unreadable or vanished directories are logged and skipped; anything else is fatal.
fn tolerate(dir: &Path, err: io::Error) -> Result<(), Error> {
    match err.kind() {
        io::ErrorKind::PermissionDenied => {
            error!("Access denied reading directory {}: {}", dir.display(), err);
            Ok(())
        }
        io::ErrorKind::NotFound => {
            debug!("Directory vanished during scan: {}", dir.display());
            Ok(())
        }
        _ => Err(Error::Io(err)),
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
