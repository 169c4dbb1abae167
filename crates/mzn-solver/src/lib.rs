//! Solver configurations for MiniZinc drivers.
//!
//! A [`SolverConfiguration`] carries the metadata a driver needs to launch a
//! solver, tracks whether its identity is still valid, and can materialize
//! itself as a temporary `.msc` document for the duration of a scope.
//!
//! ```
//! use mzn_solver::SolverConfiguration;
//!
//! let mut solver = SolverConfiguration::new("Foo", "1.2.3", "/bin/foo").unwrap();
//! assert_eq!(solver.effective_id(), "org.minizinc.python.foo");
//!
//! let artifact = solver
//!     .with_materialized_configuration(|scope| scope.id().into_owned())
//!     .unwrap();
//! assert!(artifact.ends_with(".msc"));
//! assert_eq!(solver.effective_id(), "org.minizinc.python.foo");
//! ```

mod config;
mod driver;
mod hash;
mod loader;
mod materialize;
mod registry;
mod serde;

pub use crate::config::{Identity, SolverConfiguration, SolverFields, DERIVED_ID_PREFIX};
pub use crate::driver::{Driver, SolveArgs};
pub use crate::hash::configuration_digest;
pub use crate::loader::load_solver_configuration;
pub use crate::materialize::{ArtifactSettings, MaterializedConfiguration};
pub use crate::registry::{RegistryEntry, SolverRegistry};
pub use crate::serde::{from_json_slice, to_canonical_json_bytes, SolverDocument};
pub use mzn_core::{ErrorInfo, MznError, SolverVersion};
