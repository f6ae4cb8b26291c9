use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::encoder::encode;
use crate::core::interpreter::{interpret_failure, ResponseInterpreter};
use crate::core::retry::{is_transient, RetryPolicy};
use crate::error::{CloudCompileError, RemoteFailure, Result};
use crate::models::{
    CompileResult, Config, Operation, PayloadData, ProtocolVersion, SourcePayload, SplitResult,
    UploadTicket, UPLOAD_PATH,
};

/// HTTP client for the remote split/compile backend
pub struct DispatchClient {
    client: Client,
    endpoint: String,
    timeout_seconds: u64,
    interpreter: ResponseInterpreter,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

/// Split request carrying the input inline (v1, v2)
#[derive(Debug, Serialize)]
struct InlineSplitRequest<'a> {
    compressed: bool,
    data: &'a str,
    chunks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    clang_cmd: Option<&'a str>,
}

/// Split request pointing at an uploaded object (v3)
#[derive(Debug, Serialize)]
struct KeySplitRequest<'a> {
    key: &'a str,
    chunks: u32,
    clang_cmd: &'a str,
}

/// Compile request, sent as query params (v1) or JSON body (v2, v3)
#[derive(Debug, Serialize)]
struct CompileRequest<'a> {
    s3_key: &'a str,
    clang_cmd: &'a str,
}

impl DispatchClient {
    /// Create a client for the endpoint and protocol in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config.endpoint()?;

        // No idle pooling: every exchange opens and closes its own connection
        let client = Client::builder()
            .timeout(Duration::from_secs(config.remote.timeout_seconds))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(RemoteFailure::from)?;

        Ok(Self {
            client,
            endpoint,
            timeout_seconds: config.remote.timeout_seconds,
            interpreter: ResponseInterpreter::new(config.remote.protocol),
            retry: RetryPolicy::from(&config.retry),
            cancel: CancellationToken::new(),
        })
    }

    /// Abort outstanding requests when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.interpreter.version()
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{}", self.endpoint, suffix)
    }

    /// Ask the backend to split the payload into chunks.
    ///
    /// Returns `Ok(None)` without touching the network when the payload is empty.
    pub async fn request_split(&self, payload: &SourcePayload) -> Result<Option<SplitResult>> {
        let version = self.protocol();
        let url = self.url(Operation::Split.path_suffix());

        if payload.compressed() && !version.supports_compression() {
            warn!("Compression is not part of protocol {}, sending raw bytes", version);
        }

        let response = match payload.data() {
            PayloadData::Inline(bytes) if version.uses_upload_ticket() => {
                if bytes.is_empty() {
                    debug!("Input is empty, skipping upload and split requests");
                    return Ok(None);
                }
                let ticket = self.request_upload_ticket().await?;
                self.upload(&ticket, bytes).await?;
                self.split_by_key(&url, &ticket.object_key, payload).await?
            }
            PayloadData::Inline(bytes) => {
                let Some(encoded) = encode(bytes, payload.compressed())? else {
                    debug!("Input is empty, skipping split request");
                    return Ok(None);
                };
                let request = InlineSplitRequest {
                    compressed: encoded.compressed,
                    data: &encoded.data,
                    chunks: payload.chunks(),
                    clang_cmd: (version == ProtocolVersion::V2).then(|| payload.remote_command()),
                };
                debug!(
                    "Sending split request to {} ({} base64 chars, {} chunks)",
                    url,
                    encoded.data.len(),
                    payload.chunks()
                );
                self.exchange("split", || self.client.post(&url).json(&request))
                    .await?
            }
            PayloadData::Reference(key) if version.uses_upload_ticket() => {
                self.split_by_key(&url, key, payload).await?
            }
            PayloadData::Reference(_) => {
                return Err(CloudCompileError::Argument(format!(
                    "protocol {} cannot split an already uploaded object",
                    version
                )));
            }
        };

        let (status, body) = response;
        let result = self.interpreter.interpret_split(status, &body)?;
        info!("Split produced {} chunk(s)", result.storage_keys.len());
        Ok(Some(result))
    }

    async fn split_by_key(
        &self,
        url: &str,
        key: &str,
        payload: &SourcePayload,
    ) -> std::result::Result<(u16, Vec<u8>), RemoteFailure> {
        let request = KeySplitRequest {
            key,
            chunks: payload.chunks(),
            clang_cmd: payload.remote_command(),
        };
        debug!("Sending split request to {} for object {}", url, key);
        self.exchange("split", || self.client.post(url).json(&request))
            .await
    }

    /// Ask the backend to compile the object stored under the payload's key
    pub async fn request_compile(&self, payload: &SourcePayload) -> Result<CompileResult> {
        let PayloadData::Reference(key) = payload.data() else {
            return Err(CloudCompileError::Argument(
                "compile needs a storage key, not inline data".to_string(),
            ));
        };

        let url = self.url(Operation::Compile.path_suffix());
        let request = CompileRequest {
            s3_key: key,
            clang_cmd: payload.remote_command(),
        };
        debug!("Sending compile request to {} for object {}", url, key);

        let (status, body) = match self.protocol() {
            ProtocolVersion::V1 => {
                self.exchange("compile", || self.client.get(&url).query(&request))
                    .await?
            }
            ProtocolVersion::V2 | ProtocolVersion::V3 => {
                self.exchange("compile", || self.client.post(&url).json(&request))
                    .await?
            }
        };

        let result = self.interpreter.interpret_compile(status, &body)?;
        info!("Compile returned {} bytes", result.data.len());
        Ok(result)
    }

    /// Obtain a presigned upload destination
    pub async fn request_upload_ticket(&self) -> std::result::Result<UploadTicket, RemoteFailure> {
        let url = self.url(UPLOAD_PATH);
        debug!("Requesting upload ticket from {}", url);
        let (status, body) = self
            .exchange("upload ticket", || self.client.get(&url))
            .await?;
        let ticket = self.interpreter.interpret_upload_ticket(status, &body)?;
        debug!("Received upload ticket for object {}", ticket.object_key);
        Ok(ticket)
    }

    /// PUT the raw bytes to the ticket's URL. Succeeds only on a 2xx answer.
    pub async fn upload(
        &self,
        ticket: &UploadTicket,
        bytes: &[u8],
    ) -> std::result::Result<(), RemoteFailure> {
        debug!("Uploading {} bytes to object {}", bytes.len(), ticket.object_key);
        let (status, body) = self
            .exchange("upload", || {
                self.client.put(&ticket.upload_url).body(bytes.to_vec())
            })
            .await?;

        if !(200..300).contains(&status) {
            return Err(interpret_failure("Uploader", status, &body));
        }
        info!("Uploaded {} bytes as object {}", bytes.len(), ticket.object_key);
        Ok(())
    }

    /// Send one request, retrying transient faults, and read the full body.
    ///
    /// Any received response is returned regardless of its status.
    async fn exchange<F>(
        &self,
        what: &str,
        build: F,
    ) -> std::result::Result<(u16, Vec<u8>), RemoteFailure>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            let send = async {
                let response = build().send().await?;
                let status = response.status().as_u16();
                let body = response.bytes().await?;
                Ok::<_, reqwest::Error>((status, body.to_vec()))
            };

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("Cancelled {} request", what);
                    return Err(RemoteFailure::Cancelled);
                }
                outcome = send => outcome,
            };

            match outcome {
                Ok((status, body)) => {
                    debug!("{} request answered with HTTP {} ({} bytes)", what, status, body.len());
                    return Ok((status, body));
                }
                Err(e) if is_transient(&e) && self.retry.should_retry(attempt) => {
                    let delay = self.retry.compute_backoff(attempt);
                    warn!(
                        "{} request failed (attempt {}/{}): {}. Retrying in {:?}",
                        what, attempt, self.retry.max_attempts, e, delay
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(RemoteFailure::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                Err(e) if e.is_timeout() => {
                    return Err(RemoteFailure::Transport(format!(
                        "{} request timed out after {} seconds",
                        what, self.timeout_seconds
                    )));
                }
                Err(e) if e.is_connect() => {
                    return Err(RemoteFailure::Transport(format!(
                        "could not connect to {}: {}",
                        self.endpoint, e
                    )));
                }
                Err(e) => return Err(RemoteFailure::from(e)),
            }
        }
    }
}
