//! Turns an HTTP status and body into a [`RemoteResult`] or a [`RemoteFailure`].
//!
//! Success is decided by the status alone (exactly 200). The shape of a
//! success body depends on the protocol version the interpreter was built
//! for; failure bodies share one layered envelope across all versions:
//!
//! - a top-level `message` is a platform (gateway) rejection
//! - otherwise a `body` holding a JSON document is the remote tool's own error
//! - anything else is surfaced as raw text

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::core::encoder::decode_base64;
use crate::error::RemoteFailure;
use crate::models::{
    CompileResult, Operation, ProtocolVersion, RemoteResult, SplitResult, UploadTicket,
};

/// Tool name reported for failures of the upload-ticket endpoint
const UPLOADER: &str = "Uploader";

/// Versioned response parser
#[derive(Debug, Clone, Copy)]
pub struct ResponseInterpreter {
    version: ProtocolVersion,
}

/// Flat split response (v2, v3)
#[derive(Debug, Deserialize)]
struct SplitResponse {
    s3_keys: Vec<String>,
    #[serde(default)]
    stdout: Option<RemoteText>,
    #[serde(default)]
    stderr: Option<RemoteText>,
    #[serde(default)]
    status: Option<i32>,
}

/// Flat compile response (v2, v3)
#[derive(Debug, Deserialize)]
struct CompileResponse {
    data: String,
    #[serde(default)]
    stderr: Option<RemoteText>,
    #[serde(default)]
    status: Option<i32>,
}

/// Captured process output as the backend serializes it: either a string or
/// a Node `Buffer` (`{"type":"Buffer","data":[...]}`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteText {
    Text(String),
    Buffer { data: Vec<u8> },
}

fn text_or_empty(text: Option<RemoteText>) -> String {
    match text {
        Some(RemoteText::Text(s)) => s,
        Some(RemoteText::Buffer { data }) => String::from_utf8_lossy(&data).into_owned(),
        None => String::new(),
    }
}

impl ResponseInterpreter {
    pub fn new(version: ProtocolVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Interpret the response of a split or compile call
    pub fn interpret(
        &self,
        operation: Operation,
        status: u16,
        body: &[u8],
    ) -> Result<RemoteResult, RemoteFailure> {
        match operation {
            Operation::Split => self.interpret_split(status, body).map(RemoteResult::Split),
            Operation::Compile => self.interpret_compile(status, body).map(RemoteResult::Compile),
        }
    }

    pub fn interpret_split(&self, status: u16, body: &[u8]) -> Result<SplitResult, RemoteFailure> {
        let tool = Operation::Split.tool_name();
        if status != 200 {
            return Err(interpret_failure(tool, status, body));
        }

        let parsed = match self.version {
            ProtocolVersion::V1 => parse_legacy_keys(body).map(|storage_keys| SplitResult {
                storage_keys,
                ..Default::default()
            }),
            ProtocolVersion::V2 | ProtocolVersion::V3 => serde_json::from_slice::<SplitResponse>(body)
                .ok()
                .map(|r| SplitResult {
                    storage_keys: r.s3_keys,
                    stdout: text_or_empty(r.stdout),
                    stderr: text_or_empty(r.stderr),
                    status: r.status,
                }),
        };

        parsed.ok_or_else(|| {
            debug!("Split response did not match the {} shape", self.version);
            interpret_failure(tool, status, body)
        })
    }

    pub fn interpret_compile(
        &self,
        status: u16,
        body: &[u8],
    ) -> Result<CompileResult, RemoteFailure> {
        let tool = Operation::Compile.tool_name();
        if status != 200 {
            return Err(interpret_failure(tool, status, body));
        }

        let parsed = match self.version {
            ProtocolVersion::V1 => parse_legacy_object(body).map(|data| CompileResult {
                data,
                ..Default::default()
            }),
            ProtocolVersion::V2 | ProtocolVersion::V3 => {
                serde_json::from_slice::<CompileResponse>(body)
                    .ok()
                    .and_then(|r| {
                        let data = decode_base64(&r.data).ok()?;
                        Some(CompileResult {
                            data,
                            stderr: text_or_empty(r.stderr),
                            status: r.status,
                        })
                    })
            }
        };

        parsed.ok_or_else(|| {
            debug!("Compile response did not match the {} shape", self.version);
            interpret_failure(tool, status, body)
        })
    }

    /// Interpret the response of the upload-ticket endpoint
    pub fn interpret_upload_ticket(
        &self,
        status: u16,
        body: &[u8],
    ) -> Result<UploadTicket, RemoteFailure> {
        if status != 200 {
            return Err(interpret_failure(UPLOADER, status, body));
        }
        serde_json::from_slice::<UploadTicket>(body)
            .map_err(|_| interpret_failure(UPLOADER, status, body))
    }
}

/// Classify a failed (or unparseable) response body
pub fn interpret_failure(tool: &'static str, status: u16, body: &[u8]) -> RemoteFailure {
    let raw = || String::from_utf8_lossy(body).trim().to_string();

    let mut envelope = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => return RemoteFailure::Decode { status, raw: raw() },
    };

    match envelope.remove("message") {
        Some(Value::Null) | None => {}
        Some(message) => {
            let message = match message {
                Value::String(text) => text,
                other => other.to_string(),
            };
            // Keep everything else the gateway sent, nested body decoded
            if let Some(Value::String(nested)) = envelope.get("body") {
                if let Ok(decoded) = serde_json::from_str::<Value>(nested) {
                    envelope.insert("body".to_string(), decoded);
                }
            }
            let detail = (!envelope.is_empty()).then(|| Value::Object(envelope));
            return RemoteFailure::Platform {
                status,
                message,
                detail,
            };
        }
    }

    match envelope.remove("body") {
        Some(Value::String(nested)) => match serde_json::from_str::<Value>(&nested) {
            Ok(body) => RemoteFailure::Application { tool, status, body },
            Err(_) => RemoteFailure::Decode { status, raw: raw() },
        },
        Some(Value::Null) | None => RemoteFailure::Decode { status, raw: raw() },
        Some(body) => RemoteFailure::Application { tool, status, body },
    }
}

/// v1 split bodies: the key list, possibly wrapped in a JSON string or a
/// `{"body": "<json>"}` proxy envelope
fn parse_legacy_keys(body: &[u8]) -> Option<Vec<String>> {
    let mut value: Value = serde_json::from_slice(body).ok()?;

    // At most one string wrapping plus one envelope
    for _ in 0..3 {
        if value.is_array() {
            break;
        }
        value = match value {
            Value::String(inner) => serde_json::from_str(&inner).ok()?,
            Value::Object(mut map) => match map.remove("body")? {
                Value::String(inner) => serde_json::from_str(&inner).ok()?,
                nested => nested,
            },
            _ => return None,
        };
    }

    serde_json::from_value(value).ok()
}

/// v1 compile bodies: base64 text, bare or JSON-quoted
fn parse_legacy_object(body: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(body).ok()?.trim();
    if text.starts_with('"') {
        let unquoted: String = serde_json::from_str(text).ok()?;
        decode_base64(&unquoted).ok()
    } else {
        decode_base64(text).ok()
    }
}
