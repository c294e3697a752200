use std::fs;
use std::path::PathBuf;
use tracing::info;

/// File name of the memory log database.
pub const DB_FILENAME: &str = "memory_logs.db";

pub struct PortablePathManager;

impl PortablePathManager {
    /// Returns the data root: `INTAKE_DATA_DIR` when set, else `./data` under the
    /// working directory.
    pub fn data_dir() -> PathBuf {
        match std::env::var_os("INTAKE_DATA_DIR") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("data"),
        }
    }

    /// Returns the database directory (`<data>/db`).
    pub fn db_dir() -> PathBuf {
        Self::data_dir().join("db")
    }

    /// Returns the default memory log database file.
    pub fn db_path() -> PathBuf {
        Self::db_dir().join(DB_FILENAME)
    }

    /// Creates the data and db directories if they do not exist.
    pub fn init() -> Result<(), std::io::Error> {
        let db_path = Self::db_dir();
        if !db_path.exists() {
            info!("Creating db directory: {:?}", db_path);
            fs::create_dir_all(&db_path)?;
        }
        Ok(())
    }
}
