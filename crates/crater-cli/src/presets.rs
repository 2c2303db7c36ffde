//! Named parameter presets stored as RON files.

use std::path::{Path, PathBuf};

use crater_core::CraterParameters;

use crate::error::CliError;

const PRESET_EXTENSION: &str = "ron";

/// A directory of `<name>.ron` preset files.
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `params` under `name`, replacing any existing preset.
    pub fn save(&self, name: &str, params: &CraterParameters) -> Result<PathBuf, CliError> {
        params.validate()?;
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| CliError::io(&self.dir, e))?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(params, pretty).map_err(CliError::PresetSerialize)?;
        std::fs::write(&path, serialized).map_err(|e| CliError::io(&path, e))?;
        Ok(path)
    }

    /// Read and validate the preset called `name`.
    pub fn load(&self, name: &str) -> Result<CraterParameters, CliError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(CliError::PresetNotFound(name.to_string()));
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| CliError::io(&path, e))?;
        let params: CraterParameters =
            ron::from_str(&contents).map_err(|source| CliError::PresetParse {
                path: path.clone(),
                source,
            })?;
        params.validate()?;
        Ok(params)
    }

    /// Names of all presets, sorted. A missing directory has no presets.
    pub fn list(&self) -> Result<Vec<String>, CliError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CliError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CliError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PRESET_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && is_valid_name(stem)
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, CliError> {
        if !is_valid_name(name) {
            return Err(CliError::InvalidPresetName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.{PRESET_EXTENSION}")))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crater_core::RandomRanges;

    #[test]
    fn test_preset_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path().join("presets"));
        let params = CraterParameters {
            outer_radius: 4.0,
            inner_radius: 2.5,
            blast_asymmetry: 0.3,
            seed: 1234,
            ranges: RandomRanges::classic(),
            ..Default::default()
        };

        let path = store.save("wide-blast", &params).unwrap();
        assert!(path.ends_with("wide-blast.ron"));
        assert_eq!(store.load("wide-blast").unwrap(), params);
    }

    #[test]
    fn test_list_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        store.save("small", &CraterParameters::default()).unwrap();
        store.save("big_one", &CraterParameters::default()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        assert_eq!(store.list().unwrap(), vec!["big_one", "small"]);
    }

    #[test]
    fn test_missing_dir_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_preset() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        assert!(matches!(store.load("nope"), Err(CliError::PresetNotFound(_))));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        for name in ["", "../escape", "a/b", "dot.name"] {
            assert!(matches!(
                store.save(name, &CraterParameters::default()),
                Err(CliError::InvalidPresetName(_))
            ));
        }
    }

    #[test]
    fn test_invalid_parameters_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::new(dir.path());
        let params = CraterParameters {
            inner_radius: 5.0,
            outer_radius: 1.0,
            ..Default::default()
        };
        assert!(matches!(store.save("bad", &params), Err(CliError::Generation(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_partial_preset_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tiny.ron"), "(outer_radius: 1.0, inner_radius: 0.4)")
            .unwrap();
        let params = PresetStore::new(dir.path()).load("tiny").unwrap();
        assert_eq!(params.outer_radius, 1.0);
        assert_eq!(params.segment_count, CraterParameters::default().segment_count);
    }
}
