#![deny(missing_docs)]
#![doc = "Shared error and version types for MiniZinc solver configurations."]

pub mod errors;
pub mod version;

pub use errors::{ErrorInfo, MznError};
pub use version::SolverVersion;
