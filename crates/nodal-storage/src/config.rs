//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Volatile, process-local
    Memory,
    /// Single-file redb database
    #[default]
    Redb,
    /// Single-file SQLite database
    Sqlite,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redb => "redb",
            Self::Sqlite => "sqlite",
        }
    }

    /// Default file name for this backend inside a data directory
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Memory => "",
            Self::Redb => "nodal.redb",
            Self::Sqlite => "nodal.sqlite",
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redb" => Ok(Self::Redb),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!(
                "unknown backend '{}', expected one of: memory, redb, sqlite",
                other
            )),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options recognized when opening a store
///
/// Without a `storage_path` nothing persists and the store lives in memory,
/// whatever backend is named.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Where records persist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,

    #[serde(default)]
    pub backend: BackendKind,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            storage_path: None,
            backend: BackendKind::Memory,
        }
    }

    pub fn redb(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: Some(path.into()),
            backend: BackendKind::Redb,
        }
    }

    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: Some(path.into()),
            backend: BackendKind::Sqlite,
        }
    }

    /// Backend that will actually be opened
    pub fn effective_backend(&self) -> BackendKind {
        if self.storage_path.is_none() {
            BackendKind::Memory
        } else {
            self.backend
        }
    }
}
