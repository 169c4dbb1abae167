use std::collections::BTreeMap;

use ::serde::de::DeserializeOwned;
use ::serde::{Deserialize, Serialize};
use mzn_core::errors::{ErrorInfo, MznError};
use mzn_core::SolverVersion;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

fn serde_error(code: &str, err: impl ToString) -> MznError {
    MznError::Serde(ErrorInfo::new(code, err.to_string()))
}

pub(crate) fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut ordered = BTreeMap::new();
            for (key, val) in map {
                ordered.insert(key, canonicalize(val));
            }
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => {
            let canonical_values = values.into_iter().map(canonicalize).collect();
            Value::Array(canonical_values)
        }
        other => other,
    }
}

/// Renders an already canonical value as JSON indented by four spaces, the
/// layout MiniZinc tooling writes for `.msc` documents.
pub(crate) fn to_pretty_json(value: &Value) -> Result<String, MznError> {
    let mut bytes = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut bytes, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|err| serde_error("mzn_solver.json_write", err))?;
    String::from_utf8(bytes).map_err(|err| serde_error("mzn_solver.json_write", err))
}

/// Serializes a value into compact canonical JSON bytes with deterministic ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, MznError> {
    let value =
        serde_json::to_value(value).map_err(|err| serde_error("mzn_solver.json_encode", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical)
        .map_err(|err| serde_error("mzn_solver.json_write", err))?;
    Ok(bytes)
}

/// Restores a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, MznError> {
    serde_json::from_slice(data).map_err(|err| serde_error("mzn_solver.json_read", err))
}

fn default_true() -> bool {
    true
}

/// On-disk shape of a solver configuration (`.msc`) document.
///
/// Only `id`, `name` and `version` are mandatory; unknown keys written by
/// other MiniZinc tooling are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverDocument {
    pub id: String,
    pub name: String,
    pub version: SolverVersion,
    #[serde(default)]
    pub executable: String,
    #[serde(default)]
    pub mznlib: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub std_flags: Vec<String>,
    #[serde(default)]
    pub extra_flags: Vec<String>,
    #[serde(default)]
    pub supports_mzn: bool,
    #[serde(default = "default_true")]
    pub supports_fzn: bool,
    #[serde(default, rename = "needsSolns2Out")]
    pub needs_solns2out: bool,
    #[serde(default)]
    pub needs_mzn_executable: bool,
    #[serde(default)]
    pub needs_stdlib_dir: bool,
    #[serde(default, rename = "isGUIApplication")]
    pub is_gui_application: bool,
}
