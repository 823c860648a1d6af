// src/config/mod.rs

//! Configuration loading and validation for persistrig.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into the immutable runtime settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ConfigFile, ContextSection, OutputSection, RawConfigFile, StoreSection, TriggerSettings,
};
