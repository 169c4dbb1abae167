use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use mzn_core::{MznError, SolverVersion};
use serde_json::{json, Value};

use crate::driver::Driver;
use crate::serde::{canonicalize, to_pretty_json};

/// Prefix of the identity derived from a solver's name.
pub const DERIVED_ID_PREFIX: &str = "org.minizinc.python.";

/// Where the identity of a [`SolverConfiguration`] currently comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// No explicit identity; derived from the solver name on demand.
    #[default]
    Derived,
    /// Externally known id, e.g. from a registry or a loaded `.msc` document.
    Registered(String),
    /// Path of a live temporary artifact created by [`SolverConfiguration::materialize`].
    Materialized(PathBuf),
}

impl Identity {
    pub fn explicit(&self) -> Option<Cow<'_, str>> {
        match self {
            Identity::Derived => None,
            Identity::Registered(id) => Some(Cow::Borrowed(id.as_str())),
            Identity::Materialized(path) => Some(path.to_string_lossy()),
        }
    }

    pub fn is_explicit(&self) -> bool {
        !matches!(self, Identity::Derived)
    }
}

/// Configuration-affecting fields: everything that ends up in the serialized
/// document apart from the name and the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverFields {
    pub version: SolverVersion,
    pub executable: String,
    pub mznlib: String,
    pub tags: Vec<String>,
    pub std_flags: Vec<String>,
    pub extra_flags: Vec<String>,
    pub supports_mzn: bool,
    pub supports_fzn: bool,
    pub needs_solns2out: bool,
    pub needs_mzn_executable: bool,
    pub needs_stdlib_dir: bool,
    pub is_gui_application: bool,
}

impl SolverFields {
    pub fn new(version: SolverVersion, executable: impl Into<String>) -> Self {
        Self {
            version,
            executable: executable.into(),
            mznlib: String::new(),
            tags: Vec::new(),
            std_flags: Vec::new(),
            extra_flags: Vec::new(),
            supports_mzn: false,
            supports_fzn: true,
            needs_solns2out: false,
            needs_mzn_executable: false,
            needs_stdlib_dir: false,
            is_gui_application: false,
        }
    }
}

/// Solver metadata and capability flags as understood by a MiniZinc driver.
///
/// Every setter of a configuration-affecting field discards an explicit
/// identity when the stored value actually changes, so a driver never sees an
/// id that points at a stale snapshot. Renaming the solver or swapping its
/// driver leaves the identity alone.
///
/// Clones never inherit a materialized identity: the artifact belongs to the
/// guard that created it, so a copy falls back to the derived id.
#[derive(Debug)]
pub struct SolverConfiguration {
    name: String,
    fields: SolverFields,
    identity: Identity,
    driver: Option<Arc<dyn Driver>>,
}

impl Clone for SolverConfiguration {
    fn clone(&self) -> Self {
        let identity = match &self.identity {
            Identity::Materialized(_) => Identity::Derived,
            other => other.clone(),
        };
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            identity,
            driver: self.driver.clone(),
        }
    }
}

impl SolverConfiguration {
    pub fn new(
        name: impl Into<String>,
        version: &str,
        executable: impl Into<String>,
    ) -> Result<Self, MznError> {
        let version = SolverVersion::parse(version)?;
        Ok(Self::from_fields(name, SolverFields::new(version, executable)))
    }

    pub fn from_fields(name: impl Into<String>, fields: SolverFields) -> Self {
        Self {
            name: name.into(),
            fields,
            identity: Identity::Derived,
            driver: None,
        }
    }

    pub fn with_driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.identity = Identity::Registered(id.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &SolverFields {
        &self.fields
    }

    pub fn version(&self) -> SolverVersion {
        self.fields.version
    }

    pub fn executable(&self) -> &str {
        &self.fields.executable
    }

    pub fn mznlib(&self) -> &str {
        &self.fields.mznlib
    }

    pub fn tags(&self) -> &[String] {
        &self.fields.tags
    }

    pub fn std_flags(&self) -> &[String] {
        &self.fields.std_flags
    }

    pub fn extra_flags(&self) -> &[String] {
        &self.fields.extra_flags
    }

    pub fn supports_mzn(&self) -> bool {
        self.fields.supports_mzn
    }

    pub fn supports_fzn(&self) -> bool {
        self.fields.supports_fzn
    }

    pub fn needs_solns2out(&self) -> bool {
        self.fields.needs_solns2out
    }

    pub fn needs_mzn_executable(&self) -> bool {
        self.fields.needs_mzn_executable
    }

    pub fn needs_stdlib_dir(&self) -> bool {
        self.fields.needs_stdlib_dir
    }

    pub fn is_gui_application(&self) -> bool {
        self.fields.is_gui_application
    }

    pub fn driver(&self) -> Option<&Arc<dyn Driver>> {
        self.driver.as_ref()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Id derived from the name: `org.minizinc.python.<lowercase name>`.
    pub fn derived_id(&self) -> String {
        format!("{DERIVED_ID_PREFIX}{}", self.name.to_lowercase())
    }

    /// Explicit identity if one is set, otherwise the name-derived id.
    pub fn effective_id(&self) -> Cow<'_, str> {
        match self.identity.explicit() {
            Some(id) => id,
            None => Cow::Owned(self.derived_id()),
        }
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.identity = Identity::Registered(id.into());
    }

    pub fn clear_id(&mut self) {
        self.identity = Identity::Derived;
    }

    pub(crate) fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_driver(&mut self, driver: Option<Arc<dyn Driver>>) {
        self.driver = driver;
    }

    pub fn set_version(&mut self, version: SolverVersion) {
        self.assign("version", |fields| &mut fields.version, version);
    }

    pub fn set_executable(&mut self, executable: impl Into<String>) {
        self.assign("executable", |fields| &mut fields.executable, executable.into());
    }

    pub fn set_mznlib(&mut self, mznlib: impl Into<String>) {
        self.assign("mznlib", |fields| &mut fields.mznlib, mznlib.into());
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.assign("tags", |fields| &mut fields.tags, tags);
    }

    pub fn set_std_flags(&mut self, flags: Vec<String>) {
        self.assign("stdFlags", |fields| &mut fields.std_flags, flags);
    }

    pub fn set_extra_flags(&mut self, flags: Vec<String>) {
        self.assign("extraFlags", |fields| &mut fields.extra_flags, flags);
    }

    pub fn set_supports_mzn(&mut self, value: bool) {
        self.assign("supportsMzn", |fields| &mut fields.supports_mzn, value);
    }

    pub fn set_supports_fzn(&mut self, value: bool) {
        self.assign("supportsFzn", |fields| &mut fields.supports_fzn, value);
    }

    pub fn set_needs_solns2out(&mut self, value: bool) {
        self.assign("needsSolns2Out", |fields| &mut fields.needs_solns2out, value);
    }

    pub fn set_needs_mzn_executable(&mut self, value: bool) {
        self.assign(
            "needsMznExecutable",
            |fields| &mut fields.needs_mzn_executable,
            value,
        );
    }

    pub fn set_needs_stdlib_dir(&mut self, value: bool) {
        self.assign("needsStdlibDir", |fields| &mut fields.needs_stdlib_dir, value);
    }

    pub fn set_is_gui_application(&mut self, value: bool) {
        self.assign(
            "isGUIApplication",
            |fields| &mut fields.is_gui_application,
            value,
        );
    }

    /// Applies several field edits at once, invalidating the identity at most
    /// once if the resulting fields differ from the previous ones.
    pub fn update(&mut self, edit: impl FnOnce(&mut SolverFields)) {
        let before = self.fields.clone();
        edit(&mut self.fields);
        if self.fields != before {
            self.invalidate("update");
        }
    }

    fn assign<T: PartialEq>(
        &mut self,
        field: &'static str,
        select: impl FnOnce(&mut SolverFields) -> &mut T,
        value: T,
    ) {
        let changed = {
            let slot = select(&mut self.fields);
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        };
        if changed {
            self.invalidate(field);
        }
    }

    fn invalidate(&mut self, field: &'static str) {
        if let Some(previous) = self.identity.explicit() {
            tracing::debug!(
                solver = %self.name,
                changed = field,
                previous = %previous,
                "configuration changed, discarding explicit identity"
            );
        }
        self.identity = Identity::Derived;
    }

    /// Canonical document with lexicographically sorted keys.
    pub fn document(&self) -> Value {
        let fields = &self.fields;
        canonicalize(json!({
            "name": self.name,
            "version": fields.version.to_string(),
            "id": self.effective_id(),
            "executable": fields.executable,
            "mznlib": fields.mznlib,
            "tags": fields.tags,
            "stdFlags": fields.std_flags,
            "extraFlags": fields.extra_flags,
            "supportsMzn": fields.supports_mzn,
            "supportsFzn": fields.supports_fzn,
            "needsSolns2Out": fields.needs_solns2out,
            "needsMznExecutable": fields.needs_mzn_executable,
            "needsStdlibDir": fields.needs_stdlib_dir,
            "isGUIApplication": fields.is_gui_application,
        }))
    }

    /// Pretty-printed canonical document; byte-identical across calls while
    /// the configuration is unchanged.
    pub fn to_json(&self) -> Result<String, MznError> {
        to_pretty_json(&self.document())
    }
}
