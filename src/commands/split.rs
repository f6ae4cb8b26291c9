use tracing::{debug, info};

use crate::commands::dispatch::report_remote_output;
use crate::commands::{DispatchOptions, DispatchOutcome};
use crate::core::{read_input, write_result, DispatchClient};
use crate::error::Result;
use crate::models::{RemoteResult, SourcePayload};

/// Read the input, split it remotely and write the chunk keys
pub async fn run_split(client: &DispatchClient, options: &DispatchOptions) -> Result<DispatchOutcome> {
    let data = read_input(&options.input)?;
    if data.is_empty() {
        debug!("Empty input, nothing to split");
        return Ok(DispatchOutcome::Skipped);
    }

    let payload = SourcePayload::split(
        data,
        options.compress,
        options.chunks,
        options.remote_command.clone(),
    )?;

    let Some(split) = client.request_split(&payload).await? else {
        return Ok(DispatchOutcome::Skipped);
    };

    let result = RemoteResult::Split(split);
    report_remote_output(&result);
    write_result(&result, &options.output)?;
    info!("Wrote split keys to {:?}", options.output);

    Ok(DispatchOutcome::Completed {
        remote_status: result.remote_status(),
    })
}
