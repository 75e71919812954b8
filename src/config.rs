use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the database location
pub const DB_ENV_VAR: &str = "EXPLORATION_LEDGER_DB";

const DB_FILE_NAME: &str = "ledger.db";

/// Where the ledger keeps its database file
pub struct DataDir {
    data_dir: PathBuf,
}

impl DataDir {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "exploration-ledger")
                    .context("Could not determine data directory")?;
                proj_dirs.data_dir().to_path_buf()
            }
        };

        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

/// Pick the database path: explicit flag, then environment, then the data dir
pub fn resolve_db_path(flag: Option<PathBuf>, env_value: Option<PathBuf>) -> Result<PathBuf> {
    let explicit = flag.or(env_value).filter(|p| !p.as_os_str().is_empty());

    match explicit {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
            Ok(path)
        }
        None => Ok(DataDir::new(None)?.db_path()),
    }
}

/// Read the database override from the environment
pub fn db_path_from_env() -> Option<PathBuf> {
    std::env::var_os(DB_ENV_VAR).map(PathBuf::from)
}
