//! Shared identifiers used across the learnsphere crates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The two generation stages of the content pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    /// Stage 1: produce a content spec from the source video
    SpecFromBasis,
    /// Stage 2: produce the renderable document from a content spec
    CodeFromSpec,
}

impl StageId {
    /// Stable string form used in logs and JSON output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SpecFromBasis => "spec-from-basis",
            Self::CodeFromSpec => "code-from-spec",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a configuration value came from.
///
/// Precedence (highest first): CLI, environment, config file, programmatic, default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value provided via CLI argument
    Cli,
    /// Value read from a `LEARNSPHERE_*` environment variable
    Env,
    /// Value loaded from the given configuration file
    ConfigFile(PathBuf),
    /// Value set directly by an embedding program
    Programmatic,
    /// Built-in default value
    Defaults,
}

impl ConfigSource {
    /// Short label used by `learnsphere config`
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::Env => "env",
            Self::ConfigFile(_) => "config",
            Self::Programmatic => "programmatic",
            Self::Defaults => "default",
        }
    }
}
