//! Named persistence of calibrated intrinsics.
//!
//! Intrinsics are stored as JSON under the key `{profile}/calibration`:
//!
//! ```json
//! { "cameraMatrix": [fx, s, cx, 0, fy, cy, 0, 0, 1], "distCoeffs": [k1, k2, p1, p2, k3] }
//! ```

use arcal_core::{Intrinsics, MatrixError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("stored calibration has the wrong shape: {0}")]
    Matrix(#[from] MatrixError),
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
}

/// String key/value persistence backend.
pub trait KeyValueStore {
    /// `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Overwrite `key`. Readers never observe a partially written value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-process store; nothing survives the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One JSON file per key below a root directory.
///
/// `a/b` maps to `<root>/a/b.json`. Writes go to a sibling temp file that is
/// renamed over the target.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.root.clone();
        for part in key.split('/') {
            let bad = part.is_empty()
                || part == "."
                || part == ".."
                || part.contains(['\\', ':', '\0']);
            if bad {
                return Err(StoreError::InvalidKey(key.to_owned()));
            }
            path.push(part);
        }
        path.set_extension("json");
        Ok(path)
    }
}

impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

/// Persisted payload mirroring [`Intrinsics`] as flat arrays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCalibration {
    pub camera_matrix: Vec<f64>,
    pub dist_coeffs: Vec<f64>,
}

impl From<&Intrinsics> for PersistedCalibration {
    fn from(intrinsics: &Intrinsics) -> Self {
        Self {
            camera_matrix: intrinsics.camera.to_row_major().to_vec(),
            dist_coeffs: intrinsics.distortion.to_array().to_vec(),
        }
    }
}

impl TryFrom<PersistedCalibration> for Intrinsics {
    type Error = MatrixError;

    fn try_from(value: PersistedCalibration) -> Result<Self, Self::Error> {
        Intrinsics::from_arrays(&value.camera_matrix, &value.dist_coeffs)
    }
}

/// Store key for a calibration profile.
pub fn calibration_key(profile: &str) -> String {
    format!("{profile}/calibration")
}

/// Loads and saves [`Intrinsics`] by profile name over a [`KeyValueStore`].
#[derive(Clone, Debug, Default)]
pub struct CalibrationStore<K> {
    backend: K,
}

impl<K: KeyValueStore> CalibrationStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    /// `Ok(None)` when the profile has never been saved.
    pub fn load(&self, profile: &str) -> Result<Option<Intrinsics>, StoreError> {
        let Some(raw) = self.backend.get(&calibration_key(profile))? else {
            return Ok(None);
        };
        let persisted: PersistedCalibration = serde_json::from_str(&raw)?;
        Ok(Some(Intrinsics::try_from(persisted)?))
    }

    /// Overwrite the profile's stored intrinsics.
    pub fn save(&mut self, profile: &str, intrinsics: &Intrinsics) -> Result<(), StoreError> {
        let json = serde_json::to_string(&PersistedCalibration::from(intrinsics))?;
        self.backend.set(&calibration_key(profile), &json)
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn into_backend(self) -> K {
        self.backend
    }
}
