use std::fs;
use std::path::{Path, PathBuf};

use mzn_core::errors::{ErrorInfo, MznError};
use mzn_core::SolverVersion;
use serde::{Deserialize, Serialize};

use crate::config::{Identity, SolverConfiguration};
use crate::hash::configuration_digest;
use crate::loader::load_solver_configuration;

const DOCUMENT_EXTENSION: &str = "msc";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub name: String,
    pub version: SolverVersion,
    pub tags: Vec<String>,
    pub path: PathBuf,
    pub digest: String,
}

impl RegistryEntry {
    fn describe(solver: &SolverConfiguration, path: PathBuf) -> Result<Self, MznError> {
        Ok(Self {
            id: solver.effective_id().into_owned(),
            name: solver.name().to_string(),
            version: solver.version(),
            tags: solver.tags().to_vec(),
            path,
            digest: configuration_digest(solver)?,
        })
    }
}

/// Directory of `.msc` documents addressable by solver id or tag.
#[derive(Debug, Clone)]
pub struct SolverRegistry {
    root: PathBuf,
}

fn registry_io(err: std::io::Error, path: &Path) -> MznError {
    MznError::Io(
        ErrorInfo::new("mzn_solver.registry_io", err.to_string())
            .with_context("path", path.display().to_string()),
    )
}

impl SolverRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, id: &str) -> Result<PathBuf, MznError> {
        if id.trim().is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
            return Err(MznError::Config(
                ErrorInfo::new("mzn_solver.registry_id", "solver id is not a valid file name")
                    .with_context("id", id),
            ));
        }
        Ok(self.root.join(format!("{id}.{DOCUMENT_EXTENSION}")))
    }

    pub fn install(&self, solver: &SolverConfiguration) -> Result<RegistryEntry, MznError> {
        if let Identity::Materialized(path) = solver.identity() {
            return Err(MznError::Config(
                ErrorInfo::new(
                    "mzn_solver.registry_materialized",
                    "cannot register a configuration identified by a temporary artifact",
                )
                .with_context("artifact", path.display().to_string())
                .with_hint("install the configuration outside of a materialized scope"),
            ));
        }
        let id = solver.effective_id();
        let path = self.entry_path(&id)?;
        fs::create_dir_all(&self.root).map_err(|err| registry_io(err, &self.root))?;
        fs::write(&path, solver.to_json()?).map_err(|err| registry_io(err, &path))?;
        tracing::debug!(id = %id, path = %path.display(), "installed solver configuration");
        RegistryEntry::describe(solver, path)
    }

    pub fn remove(&self, id: &str) -> Result<(), MznError> {
        let path = self.entry_path(id)?;
        if path.exists() {
            fs::remove_file(&path).map_err(|err| registry_io(err, &path))?;
            tracing::debug!(id, "removed solver configuration");
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<(RegistryEntry, SolverConfiguration)>, MznError> {
        let mut loaded = Vec::new();
        if !self.root.exists() {
            return Ok(loaded);
        }
        for entry in fs::read_dir(&self.root).map_err(|err| registry_io(err, &self.root))? {
            let entry = entry.map_err(|err| registry_io(err, &self.root))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            let solver = load_solver_configuration(&path)?;
            let described = RegistryEntry::describe(&solver, path)?;
            loaded.push((described, solver));
        }
        loaded.sort_by(|a, b| a.0.id.cmp(&b.0.id));
        Ok(loaded)
    }

    pub fn list(&self) -> Result<Vec<RegistryEntry>, MznError> {
        Ok(self.load_all()?.into_iter().map(|(entry, _)| entry).collect())
    }

    /// Resolves `query` as an id first, then as a tag of any entry in id order.
    ///
    /// The returned configuration carries its registered id, so materializing
    /// it reuses that id instead of writing a temporary document.
    pub fn lookup(&self, query: &str) -> Result<SolverConfiguration, MznError> {
        let mut loaded = self.load_all()?;
        let found = loaded
            .iter()
            .position(|(entry, _)| entry.id == query)
            .or_else(|| {
                loaded
                    .iter()
                    .position(|(entry, _)| entry.tags.iter().any(|tag| tag == query))
            });
        match found {
            Some(idx) => Ok(loaded.swap_remove(idx).1),
            None => Err(MznError::Lookup(
                ErrorInfo::new(
                    "mzn_solver.registry_missing",
                    format!("no solver with id or tag {query}"),
                )
                .with_context("root", self.root.display().to_string()),
            )),
        }
    }
}
