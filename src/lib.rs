//! CloudCompile - dispatch split and compile jobs to a remote compile backend
//!
//! CloudCompile reads a source artifact (or a storage key), ships it to a
//! remote HTTP service that runs `llvm-split`/`clang`, and writes the result
//! locally: a newline-separated list of chunk keys, or the compiled object.
//!
//! # Architecture
//!
//! - **commands**: one invocation of split or compile, end to end
//! - **core**: payload encoder, HTTP client, response interpreter, input/output
//! - **models**: Data structures (config, protocol versions, payloads, results)
//! - **error**: Error types

pub mod commands;
pub mod core;
pub mod error;
pub mod models;

pub use error::{CloudCompileError, RemoteFailure, Result};
