use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire protocol generation spoken by the remote backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// POST split with inline data, GET compile with query params.
    /// Success bodies may be double-encoded JSON.
    V1,
    /// POST split/compile with JSON bodies, flat JSON responses
    #[default]
    V2,
    /// Presigned upload ticket, raw PUT, then POST split/compile by key
    V3,
}

impl ProtocolVersion {
    /// Get the lowercase name for this version
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolVersion::V1 => "v1",
            ProtocolVersion::V2 => "v2",
            ProtocolVersion::V3 => "v3",
        }
    }

    /// Whether split requests go through an upload ticket first
    pub fn uses_upload_ticket(&self) -> bool {
        matches!(self, ProtocolVersion::V3)
    }

    /// Whether the split request body can carry compressed inline data
    pub fn supports_compression(&self) -> bool {
        !self.uses_upload_ticket()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Path suffix of the upload-ticket endpoint
pub const UPLOAD_PATH: &str = "upload/";

/// Remote operation whose response is a [`RemoteResult`](crate::models::RemoteResult)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Split,
    Compile,
}

impl Operation {
    /// Path suffix appended to the configured base endpoint
    pub fn path_suffix(&self) -> &'static str {
        match self {
            Operation::Split => "split/",
            Operation::Compile => "compile/",
        }
    }

    /// Name of the remote tool, used in diagnostics
    pub fn tool_name(&self) -> &'static str {
        match self {
            Operation::Split => "Splitter",
            Operation::Compile => "Compiler",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Split => "split",
            Operation::Compile => "compile",
        };
        write!(f, "{}", name)
    }
}
