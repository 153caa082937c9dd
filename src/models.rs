//! Base model catalog
//!
//! Base models are the keychain bodies the relief is added to. They live as
//! STEP or STL files in one folder, next to the executable by default.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KeychainError, Result, ResultExt};
use crate::mesh::IndexedMesh;

/// File format of a base model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Step,
    Stl,
}

impl ModelFormat {
    /// Format for a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "step" | "stp" => Some(ModelFormat::Step),
            "stl" => Some(ModelFormat::Stl),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::Step => write!(f, "STEP"),
            ModelFormat::Stl => write!(f, "STL"),
        }
    }
}

/// A base model file found in the catalog folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseModel {
    /// File name shown in the list
    pub name: String,
    pub path: PathBuf,
    pub format: ModelFormat,
}

impl BaseModel {
    /// Describe a file, `None` when it is not a supported model
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = ModelFormat::from_path(&path)?;
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self { name, path, format })
    }

    /// Load and tessellate the model
    pub fn load(&self) -> Result<IndexedMesh> {
        load_base_model(&self.path)
    }
}

/// List the base models in `dir`, creating the folder when missing
///
/// Names are deduplicated case-insensitively and sorted.
pub fn discover_base_models(dir: &Path) -> Result<Vec<BaseModel>> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create base model folder {:?}", dir))?;
        tracing::info!("Created base model folder {:?}", dir);
    }

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read base model folder {:?}", dir))?;

    let mut seen = HashSet::new();
    let mut models: Vec<BaseModel> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(BaseModel::from_path)
        .filter(|model| seen.insert(model.name.to_lowercase()))
        .collect();

    models.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    tracing::debug!("Found {} base models in {:?}", models.len(), dir);
    Ok(models)
}

/// Load a base model file as a triangle mesh
pub fn load_base_model(path: &Path) -> Result<IndexedMesh> {
    let format = ModelFormat::from_path(path).ok_or_else(|| KeychainError::UnsupportedFormat {
        extension: path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default(),
    })?;

    if !path.is_file() {
        return Err(KeychainError::BaseModelNotFound {
            path: path.to_path_buf(),
        });
    }

    let mesh = match format {
        ModelFormat::Stl => crate::mesh::stl::load_stl(path)?,
        #[cfg(feature = "step")]
        ModelFormat::Step => crate::mesh::step::load_step(path)?,
        #[cfg(not(feature = "step"))]
        ModelFormat::Step => {
            return Err(KeychainError::UnsupportedFormat {
                extension: "step (built without STEP support)".to_string(),
            })
        }
    };

    if mesh.is_empty() {
        return Err(KeychainError::mesh(format!("{:?} contains no triangles", path)));
    }

    tracing::info!(
        "Loaded {} base model {:?} ({} triangles)",
        format,
        path.file_name().unwrap_or_default(),
        mesh.face_count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StlFormat;
    use crate::mesh::stl::save_stl;
    use crate::mesh::tests::unit_cube;

    #[test]
    fn test_format_detection() {
        assert_eq!(ModelFormat::from_extension("STEP"), Some(ModelFormat::Step));
        assert_eq!(ModelFormat::from_extension("stp"), Some(ModelFormat::Step));
        assert_eq!(ModelFormat::from_extension("Stl"), Some(ModelFormat::Stl));
        assert_eq!(ModelFormat::from_extension("obj"), None);
    }

    #[test]
    fn test_discovery_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.STEP", "a.stl", "c.stp", "notes.txt", "round.toml"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.step")).unwrap();

        let models = discover_base_models(dir.path()).unwrap();
        let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a.stl", "b.STEP", "c.stp"]);
        assert_eq!(models[1].format, ModelFormat::Step);
    }

    #[test]
    fn test_discovery_creates_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("base_models");
        let models = discover_base_models(&folder).unwrap();
        assert!(models.is_empty());
        assert!(folder.is_dir());
    }

    #[test]
    fn test_load_stl_base_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.stl");
        save_stl(&unit_cube(), &path, StlFormat::Ascii).unwrap();

        let model = BaseModel::from_path(&path).unwrap();
        let mesh = model.load().unwrap();
        assert!((mesh.volume() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_base_model(&dir.path().join("model.obj")),
            Err(KeychainError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            load_base_model(&dir.path().join("missing.stl")),
            Err(KeychainError::BaseModelNotFound { .. })
        ));
    }
}
