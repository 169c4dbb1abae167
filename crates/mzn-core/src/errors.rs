//! Errors raised while building, writing, loading or solving with a MiniZinc
//! solver configuration.
//!
//! Every failure carries an [`ErrorInfo`] whose `code` is stable across
//! releases (`mzn_core.*` for version parsing, `mzn_solver.*` for documents,
//! artifacts and the registry), so drivers can match on it without parsing
//! messages.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong, where, and what the caller can do about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable code such as `mzn_solver.artifact_create`.
    pub code: String,
    /// Diagnostic text, usually the underlying I/O or parser message.
    pub message: String,
    /// Offending input: `.msc` paths, solver ids, version strings.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested remedy, e.g. the expected version format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records a piece of offending input under `key`; a repeated key keeps
    /// the last value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches the remedy shown after the context.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// `[code] message (key=value; ...) hint: ...`, context keys in sorted order.
impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            write!(f, " ({})", pairs.join("; "))?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " hint: {hint}")?;
        }
        Ok(())
    }
}

/// Failure families of the solver configuration crates.
///
/// Serialized as `{"family": "<variant>", "detail": <ErrorInfo>}` so a driver
/// in another process can report it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum MznError {
    /// A version string without a `major.minor.patch` triple, a bad registry
    /// id, or an identity that cannot be installed.
    #[error("invalid solver configuration {0}")]
    Config(ErrorInfo),
    /// No driver linked, or no registry entry for an id or tag.
    #[error("solver not found {0}")]
    Lookup(ErrorInfo),
    /// Creating, writing or removing a `.msc` document failed.
    #[error("solver document I/O failed {0}")]
    Io(ErrorInfo),
    /// A `.msc` document could not be encoded or decoded.
    #[error("malformed solver document {0}")]
    Serde(ErrorInfo),
    /// Reported by the driver a configuration forwards `solve` to.
    #[error("driver failed {0}")]
    Driver(ErrorInfo),
}

impl MznError {
    /// Payload shared by every family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            MznError::Config(info)
            | MznError::Lookup(info)
            | MznError::Io(info)
            | MznError::Serde(info)
            | MznError::Driver(info) => info,
        }
    }

    /// Stable code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
