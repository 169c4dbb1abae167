use std::fs;
use std::path::Path;

use mzn_core::errors::{ErrorInfo, MznError};

use crate::config::{SolverConfiguration, SolverFields};
use crate::serde::{from_json_slice, SolverDocument};

impl From<SolverDocument> for SolverConfiguration {
    fn from(document: SolverDocument) -> Self {
        let fields = SolverFields {
            version: document.version,
            executable: document.executable,
            mznlib: document.mznlib,
            tags: document.tags,
            std_flags: document.std_flags,
            extra_flags: document.extra_flags,
            supports_mzn: document.supports_mzn,
            supports_fzn: document.supports_fzn,
            needs_solns2out: document.needs_solns2out,
            needs_mzn_executable: document.needs_mzn_executable,
            needs_stdlib_dir: document.needs_stdlib_dir,
            is_gui_application: document.is_gui_application,
        };
        SolverConfiguration::from_fields(document.name, fields).with_id(document.id)
    }
}

impl SolverConfiguration {
    /// Parses a `.msc` document; its `id` becomes the registered identity.
    pub fn from_json(data: &str) -> Result<Self, MznError> {
        let document: SolverDocument = from_json_slice(data.as_bytes())?;
        Ok(document.into())
    }
}

pub fn load_solver_configuration(path: &Path) -> Result<SolverConfiguration, MznError> {
    let bytes = fs::read(path).map_err(|err| {
        MznError::Io(
            ErrorInfo::new(
                "mzn_solver.read_configuration",
                format!("failed to read solver configuration: {err}"),
            )
            .with_context("path", path.display().to_string()),
        )
    })?;
    let document: SolverDocument = from_json_slice(&bytes).map_err(|err| {
        MznError::Serde(
            ErrorInfo::new("mzn_solver.parse_configuration", err.info().message.clone())
                .with_context("path", path.display().to_string()),
        )
    })?;
    Ok(document.into())
}
