//! Work-in-progress drafts, stored as JSON under a key.
//!
//! Drafts are a convenience: there is no locking, the last writer wins.

use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

pub const ROUTE_GROUP_DRAFT_KEY: &str = "routeGroupDraft";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key value storage for serialized drafts.
pub trait DraftStore {
    fn read(&self, key: &str) -> Result<Option<String>, self::Error>;
    fn write(&self, key: &str, json: &str) -> Result<(), self::Error>;
    fn remove(&self, key: &str) -> Result<(), self::Error>;
}

pub fn save<S, T>(store: &S, key: &str, value: &T) -> Result<(), self::Error>
where
    S: DraftStore + ?Sized,
    T: Serialize,
{
    store.write(key, &serde_json::to_string(value)?)
}

pub fn load<S, T>(store: &S, key: &str) -> Result<Option<T>, self::Error>
where
    S: DraftStore + ?Sized,
    T: DeserializeOwned,
{
    match store.read(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// One `<key>.json` file per draft inside `dir`.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(&config.draft_dir)
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DraftStore for FileDraftStore {
    fn read(&self, key: &str) -> Result<Option<String>, self::Error> {
        match fs::read_to_string(self.path(key)) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, json: &str) -> Result<(), self::Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        fs::write(&path, json)?;
        debug!("Saved draft to {}", path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), self::Error> {
        match fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}
