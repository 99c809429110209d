// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::RunOptions;
use crate::config::validate::validate_options;
use crate::errors::Result;

/// Load run options from a TOML file.
///
/// This only performs deserialization; it does **not** validate. Use
/// [`load_and_validate`] for that, or call [`validate_options`] after
/// applying CLI overrides.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RunOptions> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let options: RunOptions = toml::from_str(&contents)?;

    Ok(options)
}

/// Load run options from a TOML file and validate them.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RunOptions> {
    let options = load_from_path(&path)?;
    validate_options(&options)?;
    Ok(options)
}

/// Default config file looked up in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("MochaSupervisor.toml")
}
