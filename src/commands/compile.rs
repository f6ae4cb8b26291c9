use tracing::{debug, info};

use crate::commands::dispatch::report_remote_output;
use crate::commands::{DispatchOptions, DispatchOutcome};
use crate::core::{read_input, write_result, DispatchClient};
use crate::error::Result;
use crate::models::{RemoteResult, SourcePayload};

/// Read a storage key, compile the object remotely and write the output
pub async fn run_compile(
    client: &DispatchClient,
    options: &DispatchOptions,
) -> Result<DispatchOutcome> {
    let input = read_input(&options.input)?;
    let Some(payload) = SourcePayload::compile(&input, options.remote_command.clone())? else {
        debug!("Empty input, nothing to compile");
        return Ok(DispatchOutcome::Skipped);
    };

    let compiled = client.request_compile(&payload).await?;

    let result = RemoteResult::Compile(compiled);
    report_remote_output(&result);
    write_result(&result, &options.output)?;
    info!("Wrote compiled output to {:?}", options.output);

    Ok(DispatchOutcome::Completed {
        remote_status: result.remote_status(),
    })
}
