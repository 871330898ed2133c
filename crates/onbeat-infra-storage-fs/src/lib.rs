use log::debug;
use onbeat_ports::storage::{SessionSettingsDto, StorageError, StoragePort};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

/// Keeps session settings as pretty-printed JSON under one directory.
pub struct FsStorage {
    base_dir: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// `<config dir>/Onbeat`, e.g. `~/.config/Onbeat` on Linux.
    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("no config directory on this platform".to_string()))?;
        Ok(base.join("Onbeat"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::new(Self::default_base_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SessionSettingsDto, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            debug!("no settings at '{}', using defaults", path.display());
            return Ok(SessionSettingsDto::default());
        }
        let data = fs::read(&path).map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn save_settings(&self, s: &SessionSettingsDto) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_dir).map_err(|e| StorageError::Io(e.to_string()))?;
        let data = serde_json::to_vec_pretty(s).map_err(|e| StorageError::Serde(e.to_string()))?;

        // Staged then renamed into place.
        let path = self.settings_path();
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, data).map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&staging, &path).map_err(|e| StorageError::Io(e.to_string()))?;
        debug!("saved settings to '{}'", path.display());
        Ok(())
    }
}
