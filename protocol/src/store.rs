//! Persistence of map bundles by name.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{NameError, StoreError, StoreResult};

/// Maximum map name length in bytes.
pub const MAX_MAP_NAME_LEN: usize = 64;

/// File extension of bundles in a [`DirStore`].
pub const MAP_EXTENSION: &str = "map";

/// Checks a map name: 1..=64 bytes, no path separators, no leading dot.
pub fn validate_map_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.len() > MAX_MAP_NAME_LEN {
        return Err(NameError::TooLong {
            len: name.len(),
            max: MAX_MAP_NAME_LEN,
        });
    }
    if name.contains(['/', '\\']) {
        return Err(NameError::PathSeparator);
    }
    if name.starts_with('.') {
        return Err(NameError::LeadingDot);
    }
    Ok(())
}

pub(crate) fn checked_name(name: &str) -> StoreResult<()> {
    validate_map_name(name).map_err(|reason| StoreError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Named storage for map bundles.
pub trait MapStore {
    /// Returns the stored map names in ascending order.
    fn list(&self) -> StoreResult<Vec<String>>;

    /// Returns the bundle stored under `name`.
    fn load(&self, name: &str) -> StoreResult<Vec<u8>>;

    /// Stores `bundle` under `name`, replacing any previous bundle.
    fn save(&mut self, name: &str, bundle: &[u8]) -> StoreResult<()>;

    fn delete(&mut self, name: &str) -> StoreResult<()>;

    fn exists(&self, name: &str) -> StoreResult<bool>;
}

/// An in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    maps: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapStore for MemoryStore {
    fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self.maps.keys().cloned().collect())
    }

    fn load(&self, name: &str) -> StoreResult<Vec<u8>> {
        self.maps
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    fn save(&mut self, name: &str, bundle: &[u8]) -> StoreResult<()> {
        checked_name(name)?;
        self.maps.insert(name.to_string(), bundle.to_vec());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> StoreResult<()> {
        self.maps
            .remove(name)
            .map(drop)
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.maps.contains_key(name))
    }
}

/// A directory of `<name>.map` bundle files.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Opens `dir`, creating it if missing.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> StoreResult<PathBuf> {
        checked_name(name)?;
        Ok(self.dir.join(format!("{name}.{MAP_EXTENSION}")))
    }
}

fn not_found(name: &str, err: io::Error) -> StoreError {
    if err.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound {
            name: name.to_string(),
        }
    } else {
        StoreError::Io(err)
    }
}

impl MapStore for DirStore {
    fn list(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(MAP_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_map_name(stem).is_ok() {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, name: &str) -> StoreResult<Vec<u8>> {
        fs::read(self.path(name)?).map_err(|err| not_found(name, err))
    }

    fn save(&mut self, name: &str, bundle: &[u8]) -> StoreResult<()> {
        let path = self.path(name)?;
        let partial = path.with_extension("map.partial");
        fs::write(&partial, bundle)?;
        fs::rename(&partial, &path)?;
        Ok(())
    }

    fn delete(&mut self, name: &str) -> StoreResult<()> {
        fs::remove_file(self.path(name)?).map_err(|err| not_found(name, err))
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.path(name)?.is_file())
    }
}
