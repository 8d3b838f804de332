use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Where a save's stores live on disk.
///
/// Layout: `{data_root}/ModData/{save_id}/{mod_id}/` holding the blob
/// database, the stamp database and (for old saves) the legacy blob
/// directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_root: PathBuf,
    pub save_id: String,
    pub mod_id: String,
    pub blob_db: String,
    pub stamp_db: String,
    /// Directory of extensionless legacy blob files; `None` disables migration.
    pub legacy_dir: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            save_id: "default".into(),
            mod_id: "envelopes".into(),
            blob_db: "envelopes.db".into(),
            stamp_db: "stamps.db".into(),
            legacy_dir: Some("envelopes".into()),
        }
    }
}

impl StoreConfig {
    /// Default layout under `data_root` for the given save.
    pub fn for_save(data_root: impl Into<PathBuf>, save_id: impl Into<String>) -> Self {
        Self {
            data_root: data_root.into(),
            save_id: save_id.into(),
            ..Self::default()
        }
    }

    /// Parse from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that every path component is a plain, non-empty file name.
    pub fn validate(&self) -> StoreResult<()> {
        let mut names = vec![
            ("save_id", &self.save_id),
            ("mod_id", &self.mod_id),
            ("blob_db", &self.blob_db),
            ("stamp_db", &self.stamp_db),
        ];
        if let Some(legacy) = &self.legacy_dir {
            names.push(("legacy_dir", legacy));
        }
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(StoreError::Config(format!("{field} must not be empty")));
            }
            if value.contains(['/', '\\']) || value == "." || value == ".." {
                return Err(StoreError::Config(format!(
                    "{field} must be a plain name, got {value:?}"
                )));
            }
        }
        if self.blob_db == self.stamp_db {
            return Err(StoreError::Config(
                "blob_db and stamp_db must be different files".into(),
            ));
        }
        Ok(())
    }

    /// Per-save, per-mod data directory.
    pub fn mod_data_dir(&self) -> PathBuf {
        self.data_root
            .join("ModData")
            .join(&self.save_id)
            .join(&self.mod_id)
    }

    pub fn blob_db_path(&self) -> PathBuf {
        self.mod_data_dir().join(&self.blob_db)
    }

    pub fn stamp_db_path(&self) -> PathBuf {
        self.mod_data_dir().join(&self.stamp_db)
    }

    pub fn legacy_dir_path(&self) -> Option<PathBuf> {
        self.legacy_dir
            .as_ref()
            .map(|dir| self.mod_data_dir().join(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let c = StoreConfig::for_save("/games/data", "world-42");
        assert_eq!(
            c.blob_db_path(),
            PathBuf::from("/games/data/ModData/world-42/envelopes/envelopes.db")
        );
        assert_eq!(
            c.stamp_db_path(),
            PathBuf::from("/games/data/ModData/world-42/envelopes/stamps.db")
        );
        assert_eq!(
            c.legacy_dir_path(),
            Some(PathBuf::from("/games/data/ModData/world-42/envelopes/envelopes"))
        );
        assert!(c.validate().is_ok());
    }

    #[test]
    fn toml_overrides_and_defaults() {
        let c = StoreConfig::from_toml_str(
            r#"
            data_root = "/srv/game"
            save_id = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(c.data_root, PathBuf::from("/srv/game"));
        assert_eq!(c.save_id, "abc");
        assert_eq!(c.mod_id, "envelopes");
        assert_eq!(c.stamp_db, "stamps.db");
    }

    #[test]
    fn toml_rejects_path_traversal() {
        let err = StoreConfig::from_toml_str(r#"save_id = "../other""#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn same_db_file_rejected() {
        let c = StoreConfig {
            stamp_db: "envelopes.db".into(),
            ..StoreConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seal.toml");
        fs::write(&path, "mod_id = \"letters\"\n").unwrap();
        let c = StoreConfig::load(&path).unwrap();
        assert_eq!(c.mod_id, "letters");
    }
}
