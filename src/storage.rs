use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use directories::ProjectDirs;
use serde::Serialize;

use crate::{constants::STORAGE, error::StorageError};

/// Where the application state document lives.
pub trait StateStore {
    fn load(&self) -> Result<Option<String>, StorageError>;

    fn save(&mut self, contents: &str) -> Result<(), StorageError>;

    /// Keep a copy of what is stored before a destructive change.
    fn backup(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn describe(&self) -> String;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(&self.path, e)),
        }
    }

    fn save(&mut self, contents: &str) -> Result<(), StorageError> {
        atomic_write(&self.path, contents)
    }

    fn backup(&self) -> Result<(), StorageError> {
        create_backup(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Session-only storage; also what the book falls back to when the disk fails.
#[derive(Default)]
pub struct MemoryStore {
    contents: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents.clone())
    }

    fn save(&mut self, contents: &str) -> Result<(), StorageError> {
        self.contents = Some(contents.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

pub fn state_file_name() -> String {
    format!("{}.json", STORAGE.namespace)
}

pub fn get_data_dir() -> PathBuf {
    let local_state = Path::new(".").join(state_file_name());
    if local_state.exists() {
        return PathBuf::from(".");
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "sticker-year", "sticker-year") {
        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).ok();
        data_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_state_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "sticker-year", "sticker-year") {
        if let Some(state_dir) = proj_dirs.state_dir() {
            let dir = state_dir.to_path_buf();
            fs::create_dir_all(&dir).ok();
            return dir;
        }
    }
    get_data_dir()
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value).map_err(StorageError::Encode)?;
    atomic_write(path, &json)
}

pub fn write_text_file(path: &Path, content: &str) -> Result<(), StorageError> {
    atomic_write(path, content)
}

pub fn create_backup(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        return Ok(());
    }

    let backup_dir = path.parent().unwrap_or(Path::new(".")).join("backups");
    fs::create_dir_all(&backup_dir).map_err(|e| unavailable(&backup_dir, e))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!(
        "{}.{}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        timestamp
    );
    let backup_path = backup_dir.join(&filename);
    fs::copy(path, &backup_path).map_err(|e| unavailable(&backup_path, e))?;
    tracing::debug!(backup = %backup_path.display(), "backed up state");

    let stem = path.file_name().unwrap_or_default().to_string_lossy();
    if let Ok(entries) = fs::read_dir(&backup_dir) {
        let mut backups: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&*stem))
            .collect();
        backups.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        while backups.len() > STORAGE.max_backups {
            let oldest = backups.remove(0);
            let _ = fs::remove_file(oldest.path());
        }
    }

    Ok(())
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), StorageError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| unavailable(dir, e))?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(|e| unavailable(&tmp_path, e))?;
    tmp_file
        .write_all(content.as_bytes())
        .map_err(|e| unavailable(&tmp_path, e))?;
    tmp_file.sync_all().map_err(|e| unavailable(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| unavailable(path, e))?;
    Ok(())
}

fn unavailable(path: &Path, source: io::Error) -> StorageError {
    StorageError::Unavailable {
        path: path.to_path_buf(),
        source,
    }
}
