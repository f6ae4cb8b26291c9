use std::path::Path;
use tracing::info;

use crate::error::CloudCompileError;
use crate::models::{Config, ConfigOverrides};

/// Load configuration with CLI overrides.
///
/// An explicit `config_file` must exist; otherwise `cloudcompile.toml` in
/// `working_dir` is used when present.
pub fn load_config(
    working_dir: &Path,
    config_file: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<Config, CloudCompileError> {
    let config = match config_file {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_from_dir(working_dir)?,
    };
    let config = config.with_overrides(overrides);

    info!(
        "Configuration loaded: url={}, protocol={}, timeout={}s",
        config.remote.url.as_deref().unwrap_or("<unset>"),
        config.remote.protocol,
        config.remote.timeout_seconds
    );

    Ok(config)
}
