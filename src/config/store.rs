use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// JSON configuration directory (default `profiles/gaszone/`).
///
/// Loading never fails: a missing file is created from defaults, a
/// malformed file is replaced by defaults (with a warning), and a file
/// missing newer fields is rewritten after the defaults are filled in.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

pub const DEFAULT_CONFIG_DIR: &str = "profiles/gaszone";

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Write a value as pretty JSON, creating the directory if needed.
    pub fn save<T: Serialize>(&self, file: &str, value: &T) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let text = serde_json::to_string_pretty(value)?;
        fs::write(self.path(file), text)
    }

    /// Load a config file, falling back to (and persisting) defaults.
    ///
    /// If the parsed value re-serializes differently from the on-disk text
    /// the file is rewritten, which is how additive migration lands new
    /// fields in existing installs.
    pub fn load_or_create<T>(&self, file: &str) -> T
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let path = self.path(file);

        let on_disk = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let value = T::default();
                if let Err(err) = self.save(file, &value) {
                    tracing::warn!(file, %err, "failed to write default config");
                }
                return value;
            }
            Err(err) => {
                tracing::warn!(file, %err, "failed to read config, using defaults");
                return T::default();
            }
        };

        match serde_json::from_str::<T>(&on_disk) {
            Ok(value) => {
                match serde_json::to_string_pretty(&value) {
                    Ok(canonical) if canonical != on_disk => {
                        if let Err(err) = fs::write(&path, canonical) {
                            tracing::warn!(file, %err, "failed to rewrite migrated config");
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(file, %err, "failed to re-serialize config");
                    }
                }
                value
            }
            Err(err) => {
                tracing::warn!(file, %err, "malformed config, rewriting with defaults");
                let value = T::default();
                if let Err(err) = self.save(file, &value) {
                    tracing::warn!(file, %err, "failed to rewrite malformed config");
                }
                value
            }
        }
    }
}
