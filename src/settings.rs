//! Persisted pipeline configuration.
//!
//! The pipeline itself only ever reads and writes individual keys through
//! [`SettingsStore`]; how they are stored belongs to the host integration.
//! [`JsonSettings`] is the stock store, a small JSON document beside the
//! application.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// File name used by [`JsonSettings`].
pub const SETTINGS_FILE_NAME: &str = "Settings.json";

/// Keys the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// Root folder that exported exchange files are written beneath. An
    /// empty value means no root has been configured yet.
    ExportRoot,
}

impl SettingKey {
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::ExportRoot => "ExportRoot",
        }
    }
}

/// Storage for pipeline settings, keyed by [`SettingKey`].
pub trait SettingsStore {
    /// Returns the stored value for the key, if the key is present at all.
    fn read(&self, key: SettingKey) -> Option<String>;

    /// Stores a value for the key and persists it.
    fn write(&mut self, key: SettingKey, value: &str) -> Result<(), Error>;
}

/// Settings stored as a pretty-printed JSON object of string values.
///
/// Loading a path that does not exist yet writes a fresh file populated
/// with every known key set to its default, so users have something to
/// edit by hand.
#[derive(Debug)]
pub struct JsonSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonSettings {
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        let values = match fs_err::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| Error::MalformedSettings {
                    source,
                    path: path.clone(),
                })?
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("Creating default settings file at {}", path.display());

                let settings = JsonSettings {
                    path: path.clone(),
                    values: default_values(),
                };
                settings.save()?;
                settings.values
            }
            Err(err) => return Err(err.into()),
        };

        Ok(JsonSettings { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), Error> {
        let contents = serde_json::to_string_pretty(&self.values)
            .expect("a map of strings always serializes");
        fs_err::write(&self.path, contents)?;

        Ok(())
    }
}

impl SettingsStore for JsonSettings {
    fn read(&self, key: SettingKey) -> Option<String> {
        self.values.get(key.name()).cloned()
    }

    fn write(&mut self, key: SettingKey, value: &str) -> Result<(), Error> {
        self.values.insert(key.name().to_owned(), value.to_owned());
        self.save()
    }
}

fn default_values() -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    values.insert(SettingKey::ExportRoot.name().to_owned(), String::new());
    values
}

/// An implementation of [`SettingsStore`] that never touches the
/// filesystem, intended for use in tests.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: BTreeMap<String, String>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_export_root(path: &str) -> Self {
        let mut settings = Self::new();
        settings
            .values
            .insert(SettingKey::ExportRoot.name().to_owned(), path.to_owned());
        settings
    }
}

impl SettingsStore for InMemorySettings {
    fn read(&self, key: SettingKey) -> Option<String> {
        self.values.get(key.name()).cloned()
    }

    fn write(&mut self, key: SettingKey, value: &str) -> Result<(), Error> {
        self.values.insert(key.name().to_owned(), value.to_owned());
        Ok(())
    }
}
