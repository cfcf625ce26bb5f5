//! On-disk store for learning-curve artifacts
//!
//! Each artifact gets its own UUID. Files are written to a temporary file in
//! the store directory and renamed into place, so a reader sees either the
//! whole artifact or nothing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::info;
use uuid::Uuid;

use crate::error::{PipelineError, Result};
use crate::training::LearningCurve;

const LEARNING_CURVE_PREFIX: &str = "learning_curve-";
const SVG_EXTENSION: &str = "svg";
const JSON_EXTENSION: &str = "json";

/// Identifier of a stored artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| PipelineError::ArtifactNotFound(s.to_string()))
    }
}

/// Directory of learning-curve artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open a store, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, id: ArtifactId, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", LEARNING_CURVE_PREFIX, id, extension))
    }

    /// Path of the rendered SVG for `id`
    pub fn path(&self, id: ArtifactId) -> PathBuf {
        self.file_path(id, SVG_EXTENSION)
    }

    /// Path of the JSON data for `id`
    pub fn data_path(&self, id: ArtifactId) -> PathBuf {
        self.file_path(id, JSON_EXTENSION)
    }

    /// Write `bytes` to `target` via a temp file in the same directory.
    ///
    /// The temp file is removed if anything fails before the rename.
    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(target).map_err(|e| PipelineError::Io(e.error))?;
        Ok(())
    }

    /// Store a learning curve as SVG plus its JSON data
    pub fn write_learning_curve(&self, curve: &LearningCurve) -> Result<ArtifactId> {
        let id = ArtifactId::new();

        self.write_atomic(&self.data_path(id), curve.to_json()?.as_bytes())?;
        self.write_atomic(&self.path(id), curve.render_svg().as_bytes())?;

        info!(artifact = %id, path = %self.path(id).display(), "Saved learning curve");
        Ok(id)
    }

    /// Read back the rendered SVG
    pub fn read(&self, id: ArtifactId) -> Result<Vec<u8>> {
        let path = self.path(id);
        if !path.is_file() {
            return Err(PipelineError::ArtifactNotFound(id.to_string()));
        }
        Ok(fs::read(path)?)
    }

    /// Read back the curve data
    pub fn read_learning_curve(&self, id: ArtifactId) -> Result<LearningCurve> {
        let path = self.data_path(id);
        if !path.is_file() {
            return Err(PipelineError::ArtifactNotFound(id.to_string()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Ids of all stored learning curves
    pub fn list(&self) -> Result<Vec<ArtifactId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SVG_EXTENSION) {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix(LEARNING_CURVE_PREFIX))
                .and_then(|s| s.parse::<ArtifactId>().ok());
            if let Some(id) = id {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
