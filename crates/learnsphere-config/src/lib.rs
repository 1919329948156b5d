//! Configuration management for learnsphere
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > env > file > defaults. The TOML file carries `[defaults]` and `[llm]`
//! sections.

mod builder;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use learnsphere_utils::types::ConfigSource;
pub use model::*;
