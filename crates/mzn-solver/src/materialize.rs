//! Scoped, file-backed materialization of a solver configuration.
//!
//! A driver that launches MiniZinc needs something it can pass as `--solver`:
//! either an id the installation already knows, or the path of a `.msc`
//! document. [`SolverConfiguration::materialize`] produces the latter on
//! demand and hands out a guard. The temporary document lives exactly as long
//! as the guard, and dropping the guard (normally, on an error path, or while
//! unwinding) removes the file and resets the identity.

use std::borrow::Cow;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use mzn_core::errors::{ErrorInfo, MznError};
use tempfile::{Builder, NamedTempFile};

use crate::config::{Identity, SolverConfiguration};

/// Naming and placement of temporary configuration artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSettings {
    pub prefix: String,
    pub suffix: String,
    /// Directory for the artifact; the system temporary directory when `None`.
    pub dir: Option<PathBuf>,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            prefix: "minizinc_solver_".to_string(),
            suffix: ".msc".to_string(),
            dir: None,
        }
    }
}

impl ArtifactSettings {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }
}

/// Guard over a configuration whose identity is valid for the guard's lifetime.
///
/// The guard holds the configuration mutably, so only one acquisition can be
/// in flight per configuration. Nested acquisitions through the guard see the
/// outer identity and create nothing.
#[derive(Debug)]
pub struct MaterializedConfiguration<'a> {
    solver: &'a mut SolverConfiguration,
    artifact: Option<NamedTempFile>,
}

impl MaterializedConfiguration<'_> {
    /// Identity exposed to the driver for the duration of the scope.
    pub fn id(&self) -> Cow<'_, str> {
        self.solver.effective_id()
    }

    /// Path of the artifact created by this acquisition, if any.
    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact.as_ref().map(NamedTempFile::path)
    }

    pub fn owns_artifact(&self) -> bool {
        self.artifact.is_some()
    }
}

impl Deref for MaterializedConfiguration<'_> {
    type Target = SolverConfiguration;

    fn deref(&self) -> &Self::Target {
        &*self.solver
    }
}

impl DerefMut for MaterializedConfiguration<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.solver
    }
}

impl Drop for MaterializedConfiguration<'_> {
    fn drop(&mut self) {
        let Some(artifact) = self.artifact.take() else {
            return;
        };
        let path = artifact.path().to_path_buf();
        match artifact.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "removed solver configuration artifact"),
            Err(err) => tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to remove solver configuration artifact"
            ),
        }
        self.solver.set_identity(Identity::Derived);
    }
}

fn artifact_error(code: &str, err: std::io::Error, location: &Path) -> MznError {
    MznError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", location.display().to_string()),
    )
}

fn write_artifact(contents: &str, settings: &ArtifactSettings) -> Result<NamedTempFile, MznError> {
    let mut builder = Builder::new();
    builder.prefix(&settings.prefix).suffix(&settings.suffix);
    let dir = settings.dir.clone().unwrap_or_else(std::env::temp_dir);
    let mut file = builder
        .tempfile_in(&dir)
        .map_err(|err| artifact_error("mzn_solver.artifact_create", err, &dir))?;
    file.write_all(contents.as_bytes())
        .map_err(|err| artifact_error("mzn_solver.artifact_write", err, file.path()))?;
    file.flush()
        .map_err(|err| artifact_error("mzn_solver.artifact_flush", err, file.path()))?;
    file.as_file()
        .sync_all()
        .map_err(|err| artifact_error("mzn_solver.artifact_flush", err, file.path()))?;
    Ok(file)
}

impl SolverConfiguration {
    /// Materializes the configuration in the system temporary directory.
    pub fn materialize(&mut self) -> Result<MaterializedConfiguration<'_>, MznError> {
        self.materialize_with(&ArtifactSettings::default())
    }

    /// Acquires an identity for the driver.
    ///
    /// With an explicit identity already set nothing is written. Otherwise
    /// the canonical document is written and synced to a fresh temporary
    /// file before its path becomes the identity. On failure the identity is
    /// left untouched and no file remains.
    pub fn materialize_with(
        &mut self,
        settings: &ArtifactSettings,
    ) -> Result<MaterializedConfiguration<'_>, MznError> {
        if self.identity().is_explicit() {
            tracing::debug!(id = %self.effective_id(), "reusing explicit solver identity");
            return Ok(MaterializedConfiguration {
                solver: self,
                artifact: None,
            });
        }
        let artifact = write_artifact(&self.to_json()?, settings)?;
        let path = artifact.path().to_path_buf();
        tracing::debug!(
            solver = %self.name(),
            path = %path.display(),
            "materialized solver configuration"
        );
        self.set_identity(Identity::Materialized(path));
        Ok(MaterializedConfiguration {
            solver: self,
            artifact: Some(artifact),
        })
    }

    /// Runs `body` while the configuration is materialized and tears the
    /// artifact down afterwards, whatever `body` returns.
    pub fn with_materialized_configuration<T>(
        &mut self,
        body: impl FnOnce(&mut MaterializedConfiguration<'_>) -> T,
    ) -> Result<T, MznError> {
        self.with_materialized_configuration_in(&ArtifactSettings::default(), body)
    }

    pub fn with_materialized_configuration_in<T>(
        &mut self,
        settings: &ArtifactSettings,
        body: impl FnOnce(&mut MaterializedConfiguration<'_>) -> T,
    ) -> Result<T, MznError> {
        let mut scope = self.materialize_with(settings)?;
        Ok(body(&mut scope))
    }
}
