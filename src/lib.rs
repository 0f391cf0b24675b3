/*!
 * ganeshactl - management client for a running NFS server
 *
 * Talks to the server over its management bus:
 * - client and export registries (add, remove, describe, list)
 * - admin operations (grace, shutdown, reload)
 * - per-component log levels
 *
 * Each invocation issues exactly one remote call and resolves exactly one
 * completion.
 */

pub mod bus;
pub mod cli_style;
pub mod config;
pub mod decode;
pub mod error;
pub mod facade;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod signal;
pub mod wire;

// Re-export commonly used types
pub use config::{CtlConfig, LogLevel};
pub use error::{CtlError, Result};
pub use orchestrator::{execute, outcome, run_until_complete, Command};
pub use signal::{Completion, CompletionSignal, Payload};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
