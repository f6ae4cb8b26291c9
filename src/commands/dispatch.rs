use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::commands::{run_compile, run_split};
use crate::core::{DispatchClient, Destination, InputSource};
use crate::error::Result;
use crate::models::{Config, RemoteResult};

/// One invocation's worth of CLI input
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub input: InputSource,
    pub output: Destination,
    /// Split instead of compile
    pub split: bool,
    /// Compress inline data before upload
    pub compress: bool,
    /// Number of chunks to split into
    pub chunks: u32,
    /// Compiler invocation run remotely
    pub remote_command: Option<String>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            input: InputSource::Stdin,
            output: Destination::Stdout,
            split: false,
            compress: false,
            chunks: 1,
            remote_command: None,
        }
    }
}

/// How a dispatch that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Input was empty, nothing was sent
    Skipped,
    /// The remote call succeeded and the result was written
    Completed { remote_status: Option<i32> },
}

impl DispatchOutcome {
    /// Process exit code, optionally taken from the remote tool's status
    pub fn exit_code(&self, forward_remote_status: bool) -> i32 {
        match self {
            DispatchOutcome::Completed {
                remote_status: Some(status),
            } if forward_remote_status => *status,
            _ => 0,
        }
    }
}

/// Run the split or compile selected by `options`
pub async fn run_dispatch(
    config: &Config,
    options: &DispatchOptions,
    cancel: CancellationToken,
) -> Result<DispatchOutcome> {
    let client = DispatchClient::new(config)?.with_cancellation(cancel);
    info!(
        "Dispatching {} over protocol {}",
        if options.split { "split" } else { "compile" },
        client.protocol()
    );

    let outcome = if options.split {
        run_split(&client, options).await?
    } else {
        run_compile(&client, options).await?
    };

    info!("Finished requests to remote backend");
    Ok(outcome)
}

/// Echo the remote tool's own output to the error stream
pub(crate) fn report_remote_output(result: &RemoteResult) {
    let stdout = result.stdout();
    if !stdout.trim().is_empty() {
        eprint!("{}", stdout);
        if !stdout.ends_with('\n') {
            eprintln!();
        }
    }

    let stderr = result.stderr();
    if !stderr.trim().is_empty() {
        eprint!("{}", stderr);
        if !stderr.ends_with('\n') {
            eprintln!();
        }
    }

    if let Some(status) = result.remote_status().filter(|s| *s != 0) {
        warn!("Remote tool exited with status {}", status);
    }
}
