//! Configuration utilities.

/// TOML file configuration with environment overrides.
pub mod toml_config;
