//! Configuration module for sqlblend.
//!
//! Handles compile defaults, the query SQL directory, and connection dialects.

mod settings;

pub use settings::{
    expand_env_vars, CompileSettings, ConnectionSettings, Settings, SettingsError,
    SourceSettings, CONFIG_ENV_VAR,
};
