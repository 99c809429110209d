// src/config/mod.rs

//! Configuration loading and validation for a supervised run.
//!
//! Responsibilities:
//! - Define the TOML-backed run options (`model.rs`) and the loose
//!   flag values they carry (`value.rs`).
//! - Load options from disk (`loader.rs`).
//! - Validate basic invariants like a non-empty worker command (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;
pub mod value;

pub use loader::{load_and_validate, load_from_path};
pub use model::{RunOptions, DEFAULT_SPEC_PATH};
pub use validate::validate_options;
pub use value::OptionValue;
