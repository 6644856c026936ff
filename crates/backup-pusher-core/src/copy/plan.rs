/// Copy plan: the persisted hand-off between resolution and copying.
///
/// A plan records the source root, the opaque destination string and the
/// sorted list of directories to copy. It is saved as pretty-printed JSON so
/// it can be reviewed or edited before [`execute`](super::execute) runs it.
use crate::error::CopyError;
use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPlan {
    /// Backup destination, passed through exactly as the user gave it.
    pub destination: String,
    /// Scan root the included paths live under.
    pub source_root: PathBuf,
    /// Directories to copy, sorted.
    pub include: Vec<PathBuf>,
    pub created: DateTime<Utc>,
}

impl CopyPlan {
    /// Build a plan from a resolution over `snapshot`.
    pub fn new(
        destination: impl Into<String>,
        snapshot: &Snapshot,
        included: &BTreeSet<PathBuf>,
    ) -> Self {
        Self {
            destination: destination.into(),
            source_root: snapshot.root().to_path_buf(),
            include: included.iter().cloned().collect(),
            created: Utc::now(),
        }
    }

    /// Check the plan is executable: a non-empty destination, and every
    /// included path a plain descendant of (or equal to) the source root.
    pub fn validate(&self) -> Result<(), CopyError> {
        if self.destination.trim().is_empty() {
            return Err(CopyError::InvalidPlan {
                reason: "destination is empty".into(),
            });
        }
        for path in &self.include {
            self.relative_to_root(path)?;
        }
        Ok(())
    }

    /// Where `source_dir` lands under the destination.
    pub fn target_for(&self, source_dir: &Path) -> Result<PathBuf, CopyError> {
        let relative = self.relative_to_root(source_dir)?;
        Ok(Path::new(&self.destination).join(relative))
    }

    /// `path` relative to the source root, made only of normal components so
    /// that joining it onto the destination cannot escape it.
    fn relative_to_root<'a>(&self, path: &'a Path) -> Result<&'a Path, CopyError> {
        let relative = path
            .strip_prefix(&self.source_root)
            .map_err(|_| CopyError::InvalidPlan {
                reason: format!(
                    "{} is not under source root {}",
                    path.display(),
                    self.source_root.display()
                ),
            })?;
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(CopyError::InvalidPlan {
                reason: format!("{} is not a plain subdirectory path", path.display()),
            });
        }
        Ok(relative)
    }

    pub fn to_json(&self) -> Result<String, CopyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CopyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), CopyError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| CopyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "Wrote copy plan with {} directories to {}",
            self.include.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CopyError> {
        let json = fs::read_to_string(path).map_err(|source| CopyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = Self::from_json(&json)?;
        plan.validate()?;
        Ok(plan)
    }
}
