use serde::Deserialize;

use crate::error::{CloudCompileError, Result};

/// Data handed to the remote backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadData {
    /// Bytes read locally, to be uploaded
    Inline(Vec<u8>),
    /// Key of an object already present in the backend's store
    Reference(String),
}

/// Everything one split or compile call needs, built once per invocation
#[derive(Debug, Clone)]
pub struct SourcePayload {
    data: PayloadData,
    compressed: bool,
    chunks: u32,
    remote_command: Option<String>,
}

impl SourcePayload {
    /// Payload for a split call over locally read bytes
    pub fn split(
        data: Vec<u8>,
        compressed: bool,
        chunks: u32,
        remote_command: Option<String>,
    ) -> Result<Self> {
        if chunks == 0 {
            return Err(CloudCompileError::Argument(
                "chunk count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            data: PayloadData::Inline(data),
            compressed,
            chunks,
            remote_command,
        })
    }

    /// Payload for a split call over an object that was uploaded earlier
    pub fn split_reference(
        key: impl Into<String>,
        chunks: u32,
        remote_command: Option<String>,
    ) -> Result<Self> {
        if chunks == 0 {
            return Err(CloudCompileError::Argument(
                "chunk count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            data: PayloadData::Reference(key.into()),
            compressed: false,
            chunks,
            remote_command,
        })
    }

    /// Payload for a compile call. `input` holds the storage key as text.
    ///
    /// Returns `Ok(None)` when the input is blank, meaning there is nothing to compile.
    pub fn compile(input: &[u8], remote_command: Option<String>) -> Result<Option<Self>> {
        let text = std::str::from_utf8(input).map_err(|_| {
            CloudCompileError::Argument("storage key input is not valid UTF-8".to_string())
        })?;
        let key = text.trim();
        if key.is_empty() {
            return Ok(None);
        }
        if key.lines().count() > 1 {
            return Err(CloudCompileError::Argument(
                "compile expects exactly one storage key, found several lines".to_string(),
            ));
        }
        Ok(Some(Self {
            data: PayloadData::Reference(key.to_string()),
            compressed: false,
            chunks: 1,
            remote_command,
        }))
    }

    pub fn data(&self) -> &PayloadData {
        &self.data
    }

    pub fn compressed(&self) -> bool {
        self.compressed
    }

    pub fn chunks(&self) -> u32 {
        self.chunks
    }

    /// Compiler invocation run remotely; an absent command is sent as an empty string
    pub fn remote_command(&self) -> &str {
        self.remote_command.as_deref().unwrap_or("")
    }
}

/// Presigned destination for a direct upload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadTicket {
    #[serde(rename = "key")]
    pub object_key: String,
    #[serde(rename = "url")]
    pub upload_url: String,
}

/// Successful split: the keys of the produced chunks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitResult {
    pub storage_keys: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub status: Option<i32>,
}

/// Successful compile: the decoded object file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileResult {
    pub data: Vec<u8>,
    pub stderr: String,
    pub status: Option<i32>,
}

/// Outcome of a split or compile call that reached the remote tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteResult {
    Split(SplitResult),
    Compile(CompileResult),
}

impl RemoteResult {
    /// Exit status reported by the remote tool, if the protocol carries one
    pub fn remote_status(&self) -> Option<i32> {
        match self {
            RemoteResult::Split(r) => r.status,
            RemoteResult::Compile(r) => r.status,
        }
    }

    /// Diagnostics printed by the remote tool
    pub fn stderr(&self) -> &str {
        match self {
            RemoteResult::Split(r) => &r.stderr,
            RemoteResult::Compile(r) => &r.stderr,
        }
    }

    /// Regular output printed by the remote tool
    pub fn stdout(&self) -> &str {
        match self {
            RemoteResult::Split(r) => &r.stdout,
            RemoteResult::Compile(_) => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rejects_zero_chunks() {
        let result = SourcePayload::split(b"int main(){}".to_vec(), false, 0, None);
        assert!(matches!(result, Err(CloudCompileError::Argument(_))));
    }

    #[test]
    fn test_split_payload_fields() {
        let payload =
            SourcePayload::split(b"abc".to_vec(), true, 4, Some("-O2".to_string())).unwrap();
        assert_eq!(payload.data(), &PayloadData::Inline(b"abc".to_vec()));
        assert!(payload.compressed());
        assert_eq!(payload.chunks(), 4);
        assert_eq!(payload.remote_command(), "-O2");
    }

    #[test]
    fn test_compile_trims_key() {
        let payload = SourcePayload::compile(b"  3f2a-key\n", None).unwrap().unwrap();
        assert_eq!(payload.data(), &PayloadData::Reference("3f2a-key".to_string()));
        assert_eq!(payload.remote_command(), "");
    }

    #[test]
    fn test_compile_blank_input_is_nothing() {
        assert!(SourcePayload::compile(b" \n\t", None).unwrap().is_none());
        assert!(SourcePayload::compile(b"", None).unwrap().is_none());
    }

    #[test]
    fn test_compile_rejects_multiple_keys() {
        let result = SourcePayload::compile(b"k1\nk2\n", None);
        assert!(matches!(result, Err(CloudCompileError::Argument(_))));
    }

    #[test]
    fn test_upload_ticket_deserialization() {
        let json = r#"{"key":"obj-1","url":"https://bucket.s3/obj-1?sig=x"}"#;
        let ticket: UploadTicket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.object_key, "obj-1");
        assert_eq!(ticket.upload_url, "https://bucket.s3/obj-1?sig=x");
    }

    #[test]
    fn test_remote_status_accessor() {
        let result = RemoteResult::Compile(CompileResult {
            data: vec![1, 2],
            stderr: "warning".to_string(),
            status: Some(1),
        });
        assert_eq!(result.remote_status(), Some(1));
        assert_eq!(result.stderr(), "warning");
        assert_eq!(result.stdout(), "");
    }
}
