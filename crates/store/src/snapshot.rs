//! JSON snapshot of every user's records.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tally_core::budget::Budget;
use tally_core::category::CategoryRegistry;
use tally_core::transaction::Transaction;
use tally_shared::types::UserId;
use thiserror::Error;
use tracing::debug;

/// Error types for snapshot files.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File could not be read or written.
    #[error("Snapshot I/O error at {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File contents are not a valid snapshot.
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// A user's category registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCategories {
    /// Owning user.
    pub user_id: UserId,
    /// Registered categories.
    #[serde(flatten)]
    pub categories: CategoryRegistry,
}

/// Everything the store holds, as written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All budgets.
    #[serde(default)]
    pub budgets: Vec<Budget>,
    /// All transactions.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Category registries of users that have one.
    #[serde(default)]
    pub categories: Vec<UserCategories>,
}

impl Snapshot {
    /// Reads a snapshot. A missing file yields an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        let data = match tokio::fs::read_to_string(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No snapshot yet, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SnapshotError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(serde_json::from_str(&data)?)
    }

    /// Writes the snapshot by staging to a sibling temp file and renaming it
    /// over `path`, so a failed write leaves the previous file intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_err = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

        debug!(
            path = %path.display(),
            budgets = self.budgets.len(),
            transactions = self.transactions.len(),
            "Snapshot written"
        );
        Ok(())
    }
}
