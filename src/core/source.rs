use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CloudCompileError, Result};

/// Reserved path that selects the process's standard streams
pub const STDIO_MARKER: &str = "-";

/// Where the input bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Resolve a command line argument, checking that a named file exists
    pub fn parse(arg: &str) -> Result<Self> {
        if arg == STDIO_MARKER {
            return Ok(InputSource::Stdin);
        }
        let path = Path::new(arg);
        if !path.is_file() {
            return Err(CloudCompileError::Argument(format!(
                "Specify a valid file or use stdin ({}): {}",
                STDIO_MARKER, arg
            )));
        }
        Ok(InputSource::File(path.to_path_buf()))
    }
}

/// Read the whole input into memory
pub fn read_input(source: &InputSource) -> Result<Vec<u8>> {
    let data = match source {
        InputSource::Stdin => {
            let mut buf = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buf)?;
            buf
        }
        InputSource::File(path) => std::fs::read(path)?,
    };
    debug!("Read {} bytes of input", data.len());
    Ok(data)
}
