//! Forwarding of solve requests to an injected MiniZinc driver.
//!
//! The configuration never solves anything itself: [`SolverConfiguration::solve`]
//! hands itself, the instance and the caller's arguments to the linked
//! [`Driver`] and returns whatever the driver produced.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use mzn_core::errors::{ErrorInfo, MznError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SolverConfiguration;

/// A collaborator able to run a solver process for a configuration.
pub trait Driver: fmt::Debug + Send + Sync {
    /// Solves `instance` with `solver`.
    ///
    /// The instance is opaque to the configuration; drivers downcast it to
    /// whatever model representation they understand. Errors are returned to
    /// the caller of [`SolverConfiguration::solve`] untouched.
    fn solve(
        &self,
        solver: &SolverConfiguration,
        instance: &dyn Any,
        args: &SolveArgs,
    ) -> Result<Value, MznError>;
}

/// Extra arguments passed through to [`Driver::solve`] unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveArgs {
    #[serde(default)]
    pub positional: Vec<Value>,
    #[serde(default)]
    pub named: BTreeMap<String, Value>,
}

impl SolveArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl SolverConfiguration {
    /// Forwards to the linked driver; fails with a lookup error when none is set.
    pub fn solve(&self, instance: &dyn Any, args: &SolveArgs) -> Result<Value, MznError> {
        let driver = self.driver().ok_or_else(|| {
            MznError::Lookup(
                ErrorInfo::new(
                    "mzn_solver.no_driver",
                    "solver is not linked to a MiniZinc driver",
                )
                .with_context("solver", self.name())
                .with_hint("attach a driver with with_driver or set_driver"),
            )
        })?;
        tracing::debug!(
            solver = %self.name(),
            id = %self.effective_id(),
            positional = args.positional.len(),
            named = args.named.len(),
            "forwarding solve to driver"
        );
        driver.solve(self, instance, args)
    }
}
