//! LNV-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, LnvError>;

/// Top-level error type for the channel viewer.
///
/// Only storage failures are meant to reach a user. Missing channels, malformed
/// numeric values and empty series are absorbed before they become errors.
#[derive(Debug, Error)]
pub enum LnvError {
    #[error("[LNV-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[LNV-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[LNV-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[LNV-2001] channel database unavailable at {path}: {details}")]
    DataUnavailable { path: PathBuf, details: String },

    #[error("[LNV-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[LNV-2102] SQL failure in {context}: {details}")]
    Sql {
        context: &'static str,
        details: String,
    },

    #[error("[LNV-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[LNV-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl LnvError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "LNV-1001",
            Self::MissingConfig { .. } => "LNV-1002",
            Self::ConfigParse { .. } => "LNV-1003",
            Self::DataUnavailable { .. } => "LNV-2001",
            Self::Serialization { .. } => "LNV-2101",
            Self::Sql { .. } => "LNV-2102",
            Self::Io { .. } => "LNV-3002",
            Self::Runtime { .. } => "LNV-3900",
        }
    }

    /// Whether the failure came from the channel database.
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. } | Self::Sql { .. })
    }

    /// Convenience constructor for an unreachable or unreadable database.
    #[must_use]
    pub fn data_unavailable(path: impl AsRef<Path>, details: impl Into<String>) -> Self {
        Self::DataUnavailable {
            path: path.as_ref().to_path_buf(),
            details: details.into(),
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<rusqlite::Error> for LnvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

impl From<r2d2::Error> for LnvError {
    fn from(value: r2d2::Error) -> Self {
        Self::DataUnavailable {
            path: PathBuf::new(),
            details: format!("connection pool: {value}"),
        }
    }
}

impl From<serde_json::Error> for LnvError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for LnvError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<LnvError> {
        vec![
            LnvError::InvalidConfig {
                details: String::new(),
            },
            LnvError::MissingConfig {
                path: PathBuf::new(),
            },
            LnvError::ConfigParse {
                context: "",
                details: String::new(),
            },
            LnvError::data_unavailable("", ""),
            LnvError::Serialization {
                context: "",
                details: String::new(),
            },
            LnvError::Sql {
                context: "",
                details: String::new(),
            },
            LnvError::io("", std::io::Error::other("test")),
            LnvError::Runtime {
                details: String::new(),
            },
        ]
    }

    #[test]
    fn error_codes_are_unique_and_prefixed() {
        let codes: Vec<&str> = all_variants().iter().map(LnvError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
        for code in codes {
            assert!(code.starts_with("LNV-"), "code {code} must start with LNV-");
        }
    }

    #[test]
    fn error_display_includes_code() {
        let err = LnvError::data_unavailable("/srv/ln/node.db", "no such file");
        let msg = err.to_string();
        assert!(msg.contains("LNV-2001"), "display should contain code: {msg}");
        assert!(msg.contains("/srv/ln/node.db"), "display should contain path: {msg}");
        assert!(msg.contains("no such file"), "display should contain details: {msg}");
    }

    #[test]
    fn storage_failures_are_grouped() {
        let storage: Vec<bool> = all_variants()
            .iter()
            .map(LnvError::is_storage_failure)
            .collect();
        assert_eq!(
            storage,
            vec![false, false, false, true, false, true, false, false]
        );
    }

    #[test]
    fn from_rusqlite_error() {
        let sql_err =
            rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(1), Some("test".to_string()));
        let err: LnvError = sql_err.into();
        assert_eq!(err.code(), "LNV-2102");
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: LnvError = json_err.into();
        assert_eq!(err.code(), "LNV-2101");
    }

    #[test]
    fn from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: LnvError = toml_err.into();
        assert_eq!(err.code(), "LNV-1003");
    }
}
