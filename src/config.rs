//! Runtime configuration.
//!
//! Paths are resolved from explicit overrides first, then environment
//! variables, then platform defaults:
//! - `WORTKLAR_DB` - Progress database file (default: `<data dir>/wortklar.db`)
//! - `WORTKLAR_CATALOG` - Card catalog JSON (default: `data/cards.json`)

use std::path::PathBuf;

use anyhow::Result;

pub const DB_ENV: &str = "WORTKLAR_DB";
pub const CATALOG_ENV: &str = "WORTKLAR_CATALOG";

/// Default catalog location, relative to the working directory.
const DEFAULT_CATALOG: &str = "data/cards.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub catalog_path: PathBuf,
}

impl Config {
    /// Resolve configuration, preferring the given overrides.
    pub fn resolve(db: Option<PathBuf>, catalog: Option<PathBuf>) -> Result<Self> {
        let db_path = match db.or_else(|| env_path(DB_ENV)) {
            Some(path) => path,
            None => default_db_path()?,
        };
        let catalog_path = catalog
            .or_else(|| env_path(CATALOG_ENV))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG));

        Ok(Self {
            db_path,
            catalog_path,
        })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Platform data directory location of the progress database.
pub fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "wortklar")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("wortklar.db"))
}
