use std::path::{Path, PathBuf};

use crate::{
    constants::STORAGE,
    storage::{self, FileStore},
};

/// Values given on the command line or through the environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub assets: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub state_path: PathBuf,
    pub catalog_path: PathBuf,
    pub asset_base: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let explicit_data_dir = overrides.data_dir.is_some();
        let data_dir = overrides.data_dir.unwrap_or_else(storage::get_data_dir);

        let catalog_path = overrides
            .catalog
            .unwrap_or_else(|| default_catalog_path(&data_dir, explicit_data_dir));

        let log_dir = if explicit_data_dir {
            data_dir.clone()
        } else {
            storage::get_state_dir()
        };

        Self {
            state_path: data_dir.join(storage::state_file_name()),
            catalog_path,
            asset_base: overrides
                .assets
                .unwrap_or_else(|| STORAGE.asset_base.to_string()),
            log_dir,
            data_dir,
        }
    }

    pub fn state_store(&self) -> FileStore {
        FileStore::new(self.state_path.clone())
    }
}

/// `./stickers.json` next to the user wins, as a static site would serve it.
fn default_catalog_path(data_dir: &Path, explicit_data_dir: bool) -> PathBuf {
    let local = Path::new(".").join(STORAGE.catalog_file);
    if !explicit_data_dir && local.exists() {
        local
    } else {
        data_dir.join(STORAGE.catalog_file)
    }
}
