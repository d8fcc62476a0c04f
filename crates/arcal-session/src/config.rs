//! JSON configuration for a calibration session.

use crate::store::{CalibrationStore, DirectoryStore};
use arcal_core::{BoardError, BoardSpec};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_profile() -> String {
    "default_camera".to_owned()
}

fn default_min_samples() -> usize {
    5
}

/// Session parameters: which profile to persist under, the board geometry,
/// and how many captures `calibrate` requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub board: BoardSpec,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Root directory of the file-backed calibration store.
    #[serde(default)]
    pub store_dir: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            board: BoardSpec::default(),
            min_samples: default_min_samples(),
            store_dir: None,
        }
    }
}

impl SessionConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Validated board geometry.
    pub fn build_board(&self) -> Result<BoardSpec, BoardError> {
        self.board.validate()?;
        Ok(self.board)
    }

    /// Capture threshold actually enforced; at least one sample.
    pub fn effective_min_samples(&self) -> usize {
        self.min_samples.max(1)
    }

    /// File-backed store rooted at `store_dir`, if configured.
    pub fn build_store(&self) -> Option<CalibrationStore<DirectoryStore>> {
        self.store_dir
            .as_ref()
            .map(|dir| CalibrationStore::new(DirectoryStore::new(dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: SessionConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg, SessionConfig::default());
        assert_eq!(cfg.profile, "default_camera");
        assert_eq!(cfg.min_samples, 5);
        assert_eq!(cfg.board, BoardSpec::default());
        assert!(cfg.build_store().is_none());
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let cfg = SessionConfig {
            profile: "bench".to_owned(),
            board: BoardSpec::new(7, 5, 30.0).expect("board"),
            min_samples: 8,
            store_dir: Some(dir.path().join("store").to_string_lossy().into_owned()),
        };
        cfg.write_json(&path).expect("write");
        let loaded = SessionConfig::load_json(&path).expect("load");
        assert_eq!(loaded, cfg);
        assert!(loaded.build_store().is_some());
    }

    #[test]
    fn invalid_board_is_rejected() {
        let cfg: SessionConfig =
            serde_json::from_str(r#"{"board":{"cols":0,"rows":6,"pitch":25.0}}"#).expect("parse");
        assert!(cfg.build_board().is_err());
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let cfg = SessionConfig {
            min_samples: 0,
            ..SessionConfig::default()
        };
        assert_eq!(cfg.effective_min_samples(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            SessionConfig::load_json(dir.path().join("absent.json")),
            Err(ConfigIoError::Io(_))
        ));
    }
}
