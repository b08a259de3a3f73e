// src/persistence.rs
//! Storage backends for learned name mappings.
//!
//! The learning engine only needs get/set/keys plus an explicit flush
//! barrier; `set` is an in-memory write and durability happens at `flush`,
//! so rapid writes coalesce into one snapshot.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Error, ErrorKind};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Key/value contract the learning engine consumes. Single writer: nothing
/// but the learning engine may mutate a backend.
pub trait MappingBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
    /// Synchronous durability barrier for all writes since the last flush.
    fn flush(&mut self) -> Result<(), Error>;
}

/// Volatile backend for tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    map: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MappingBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// File-backed store: the whole map is serialized with bincode into a temp
/// file beside the target and atomically renamed over it, so a crash mid-
/// write never corrupts the previous snapshot.
pub struct FileBackend {
    path: PathBuf,
    map: HashMap<String, String>,
}

impl FileBackend {
    /// Loads an existing snapshot; a missing file starts an empty store.
    /// An unreadable or undecodable file is an error the caller decides on.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let map = if path.exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            bincode::deserialize_from(reader)
                .map_err(|e| Error::new(ErrorKind::InvalidData, e))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            map,
        })
    }

    /// Best-effort open for hosts that prefer losing history over failing
    /// startup: load errors are logged and yield an empty store.
    pub fn open_or_empty(path: &Path) -> Self {
        match Self::open(path) {
            Ok(backend) => backend,
            Err(e) => {
                log::warn!("could not load mapping store {}: {}", path.display(), e);
                Self {
                    path: path.to_path_buf(),
                    map: HashMap::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }

    fn flush(&mut self) -> Result<(), Error> {
        let parent_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        let writer = BufWriter::new(&temp_file);
        bincode::serialize_into(writer, &self.map)
            .map_err(|e| Error::new(ErrorKind::Other, e))?;
        temp_file.persist(&self.path)?;
        Ok(())
    }
}
