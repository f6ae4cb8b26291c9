use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use cloudcompile::commands::{run_dispatch, DispatchOptions};
use cloudcompile::core::{load_config, Destination, InputSource};
use cloudcompile::models::{ConfigOverrides, ProtocolVersion};
use cloudcompile::Result;

/// CloudCompile - split and compile LLVM artifacts on a remote backend
#[derive(Parser)]
#[command(name = "cloudcompile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File to split or compile ("-" reads stdin). In compile mode it holds a storage key.
    file: String,

    /// Output file ("-" writes stdout)
    #[arg(short, long)]
    output: String,

    /// Compress the input before sending it
    #[arg(long)]
    compress: bool,

    /// Call the splitter instead of the compiler
    #[arg(long)]
    split: bool,

    /// Number of chunks to split the file into
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    chunks: u32,

    /// Command line passed to clang on the remote side
    #[arg(long)]
    clang: Option<String>,

    /// Override the remote base URL
    #[arg(long)]
    url: Option<String>,

    /// Override the wire protocol version
    #[arg(long, value_enum)]
    protocol: Option<ProtocolVersion>,

    /// Override the request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Number of retries for connection failures and timeouts
    #[arg(long)]
    retries: Option<u32>,

    /// Exit with the status reported by the remote tool
    #[arg(long)]
    forward_status: bool,

    /// Config file (defaults to ./cloudcompile.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so "-o -" output stays clean
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    match run(cli, cancel).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", e.diagnostic());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<i32> {
    let input = InputSource::parse(&cli.file)?;
    let output = Destination::parse(&cli.output);

    let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = load_config(
        &working_dir,
        cli.config.as_deref(),
        ConfigOverrides {
            url: cli.url,
            protocol: cli.protocol,
            timeout: cli.timeout,
            retries: cli.retries,
            forward_status: cli.forward_status,
        },
    )?;

    let options = DispatchOptions {
        input,
        output,
        split: cli.split,
        compress: cli.compress,
        chunks: cli.chunks,
        remote_command: cli.clang,
    };

    let outcome = run_dispatch(&config, &options, cancel).await?;
    Ok(outcome.exit_code(config.behavior.forward_remote_status))
}
