use mzn_core::errors::MznError;
use sha2::{Digest, Sha256};

use crate::config::SolverConfiguration;
use crate::serde::to_canonical_json_bytes;

/// SHA-256 over the compact canonical document, hex encoded.
pub fn configuration_digest(solver: &SolverConfiguration) -> Result<String, MznError> {
    let bytes = to_canonical_json_bytes(&solver.document())?;
    Ok(hex::encode(Sha256::digest(bytes)))
}
