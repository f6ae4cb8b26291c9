//! Common test utilities

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::MockServer;

use cloudcompile::commands::DispatchOptions;
use cloudcompile::core::{Destination, InputSource};
use cloudcompile::models::{Config, ConfigOverrides, ProtocolVersion};

/// Path prefix the mocked backend is mounted under, like an API gateway stage
pub const STAGE: &str = "/dev";

/// Config pointing at the mock server, without retries
pub fn config_for(server: &MockServer, protocol: ProtocolVersion) -> Config {
    Config::default().with_overrides(ConfigOverrides {
        url: Some(format!("{}{}/", server.uri(), STAGE)),
        protocol: Some(protocol),
        timeout: Some(5),
        retries: Some(0),
        forward_status: false,
    })
}

/// Create a scratch directory holding an input file with `content`
pub fn create_input(content: &[u8]) -> (TempDir, InputSource) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("input.ll");
    fs::write(&path, content).expect("Failed to write input file");
    (temp_dir, InputSource::File(path))
}

/// Output path inside the scratch directory (not created)
pub fn output_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("output")
}

/// Split options reading `input` and writing to `output`
pub fn split_options(input: InputSource, output: PathBuf) -> DispatchOptions {
    DispatchOptions {
        input,
        output: Destination::File(output),
        split: true,
        ..Default::default()
    }
}

/// Compile options reading `input` and writing to `output`
pub fn compile_options(input: InputSource, output: PathBuf, clang: &str) -> DispatchOptions {
    DispatchOptions {
        input,
        output: Destination::File(output),
        split: false,
        remote_command: Some(clang.to_string()),
        ..Default::default()
    }
}
