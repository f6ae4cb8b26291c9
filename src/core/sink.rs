use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::core::source::STDIO_MARKER;
use crate::error::Result;
use crate::models::RemoteResult;

/// Where the result is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn parse(arg: &str) -> Self {
        if arg == STDIO_MARKER {
            Destination::Stdout
        } else {
            Destination::File(PathBuf::from(arg))
        }
    }
}

/// Bytes to write for a result: newline-terminated keys for a split,
/// the object file verbatim for a compile
pub fn render(result: &RemoteResult) -> Vec<u8> {
    match result {
        RemoteResult::Split(split) => {
            if split.storage_keys.is_empty() {
                return Vec::new();
            }
            let mut text = split.storage_keys.join("\n");
            text.push('\n');
            text.into_bytes()
        }
        RemoteResult::Compile(compile) => compile.data.clone(),
    }
}

/// Write a result to its destination
pub fn write_result(result: &RemoteResult, destination: &Destination) -> Result<()> {
    let bytes = render(result);
    match destination {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
        Destination::File(path) => {
            std::fs::write(path, &bytes)?;
            debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
    }
    Ok(())
}
