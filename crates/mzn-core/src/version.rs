//! Solver version triples extracted from free-form version strings.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::{ErrorInfo, MznError};

static VERSION_PATTERN: OnceLock<Regex> = OnceLock::new();

fn version_pattern() -> &'static Regex {
    VERSION_PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]+)\.([0-9]+)\.([0-9]+)").expect("valid version triple regex")
    })
}

/// Semantic version reported by a solver, always exactly three components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolverVersion {
    /// Major version component.
    pub major: u64,
    /// Minor version component.
    pub minor: u64,
    /// Patch version component.
    pub patch: u64,
}

impl SolverVersion {
    /// Creates a new version descriptor from its components.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Extracts the first `major.minor.patch` triple embedded in `text`.
    ///
    /// Anything around the triple is ignored, so `"Gecode 6.3.0 (release)"`
    /// parses as `6.3.0`. Text without a triple is rejected.
    pub fn parse(text: &str) -> Result<Self, MznError> {
        let captures = version_pattern().captures(text).ok_or_else(|| {
            MznError::Config(
                ErrorInfo::new(
                    "mzn_core.version_format",
                    "version string does not contain a major.minor.patch triple",
                )
                .with_context("input", text)
                .with_hint("expected something like \"1.2.3\""),
            )
        })?;
        let component = |idx: usize| -> Result<u64, MznError> {
            let digits = &captures[idx];
            digits.parse::<u64>().map_err(|err| {
                MznError::Config(
                    ErrorInfo::new("mzn_core.version_component", err.to_string())
                        .with_context("input", text)
                        .with_context("component", digits),
                )
            })
        };
        Ok(Self::new(component(1)?, component(2)?, component(3)?))
    }
}

impl fmt::Display for SolverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SolverVersion {
    type Err = MznError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SolverVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct SolverVersionVisitor;

impl<'de> Visitor<'de> for SolverVersionVisitor {
    type Value = SolverVersion;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a string containing a major.minor.patch version")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        SolverVersion::parse(value).map_err(|err| E::custom(err.info().clone()))
    }
}

impl<'de> Deserialize<'de> for SolverVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(SolverVersionVisitor)
    }
}
