use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::Area;

pub const DEFAULT_BASE_DIR: &str = "D:/Arquivo Digital";
pub const DEFAULT_CLIENTS_DB: &str = "clientes.db";
pub const DEFAULT_EXPENSE_DIR_NAME: &str = "DESPESAS";
pub const DEFAULT_BLOCKED_EXTENSIONS: [&str; 9] = [
    ".exe", ".bat", ".cmd", ".ps1", ".vbs", ".js", ".jar", ".msi", ".dll",
];

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub base_dir: String,
    #[serde(default)]
    pub import_dir: Option<String>,
    #[serde(default)]
    pub export_dir: Option<String>,
    pub clients_db: String,
    pub expense_dir_name: String,
    pub blocked_extensions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_dir: DEFAULT_BASE_DIR.to_string(),
            import_dir: None,
            export_dir: None,
            clients_db: DEFAULT_CLIENTS_DB.to_string(),
            expense_dir_name: DEFAULT_EXPENSE_DIR_NAME.to_string(),
            blocked_extensions: DEFAULT_BLOCKED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// Config rooted at `base_dir` with every other key at its default.
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }
}

/// Load `Config.toml` (optional) with `PROCDIR_*` environment overrides on top of the defaults.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("base_dir", defaults.base_dir)?
        .set_default("clients_db", defaults.clients_db)?
        .set_default("expense_dir_name", defaults.expense_dir_name)?
        .set_default("blocked_extensions", defaults.blocked_extensions)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("PROCDIR"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Root directory of each area tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRoots {
    pub import: PathBuf,
    pub export: PathBuf,
}

impl AreaRoots {
    pub fn new(import: impl Into<PathBuf>, export: impl Into<PathBuf>) -> Self {
        Self {
            import: import.into(),
            export: export.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let base = Path::new(&config.base_dir);
        let import = config
            .import_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| base.join(Area::Import.display_name()));
        let export = config
            .export_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| base.join(Area::Export.display_name()));
        Self { import, export }
    }

    pub fn root(&self, area: Area) -> &Path {
        match area {
            Area::Import => &self.import,
            Area::Export => &self.export,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Area, &Path)> {
        Area::ALL.into_iter().map(move |area| (area, self.root(area)))
    }
}

/// Normalized, lower-case set of extensions that may never be placed.
#[derive(Debug, Clone)]
pub struct BlockedExtensions(Vec<String>);

impl BlockedExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    /// Returns the offending extension (with its leading dot) if `name` is blocked.
    pub fn check(&self, name: &Path) -> Option<String> {
        let ext = name.extension()?.to_string_lossy().to_lowercase();
        self.0.iter().any(|b| *b == ext).then(|| format!(".{}", ext))
    }
}

impl Default for BlockedExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_EXTENSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_roots_default_under_base_dir() {
        let config = AppConfig::with_base_dir("/srv/arquivo");
        let roots = AreaRoots::from_config(&config);
        assert_eq!(roots.import, PathBuf::from("/srv/arquivo/IMPORTAÇÃO"));
        assert_eq!(roots.export, PathBuf::from("/srv/arquivo/EXPORTAÇÃO"));
    }

    #[test]
    fn test_area_roots_explicit_override() {
        let config = AppConfig {
            export_dir: Some("//server/share/EXP".to_string()),
            ..AppConfig::with_base_dir("/srv/arquivo")
        };
        let roots = AreaRoots::from_config(&config);
        assert_eq!(roots.root(Area::Export), Path::new("//server/share/EXP"));
        assert_eq!(roots.root(Area::Import), Path::new("/srv/arquivo/IMPORTAÇÃO"));
    }

    #[test]
    fn test_blocked_extensions_case_insensitive() {
        let blocked = BlockedExtensions::default();
        assert_eq!(blocked.check(Path::new("setup.EXE")), Some(".exe".to_string()));
        assert_eq!(blocked.check(Path::new("invoice.pdf")), None);
        assert_eq!(blocked.check(Path::new("README")), None);

        let custom = BlockedExtensions::new(["zip", " .RAR "]);
        assert!(custom.check(Path::new("a.rar")).is_some());
        assert!(custom.check(Path::new("a.exe")).is_none());
    }
}
