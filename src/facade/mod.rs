//! Client-side facades over the server's remote interfaces
//!
//! Each facade owns one `BusConnection` and exposes one method per remote
//! operation. Every method takes the invocation's `CompletionSignal` by
//! value and fires it exactly once: with the decoded payload on success, or
//! with an `OperationError` when the call or the decode fails.

mod admin;
mod clients;
mod exports;
mod logs;

pub use admin::AdminControl;
pub use clients::ClientRegistry;
pub use exports::ExportRegistry;
pub use logs::LogControl;

use crate::bus::{BusConnection, BusTransport};
use crate::error::{DecodeError, OperationError};
use crate::signal::{CompletionSignal, Payload, SignalError};
use crate::wire::{WireArg, WireValue};
use tracing::debug;

/// Issue one call and route its outcome into `signal`
async fn dispatch<T, F>(
    conn: &BusConnection<T>,
    method: &str,
    args: Vec<WireArg>,
    signal: CompletionSignal,
    decode: F,
) -> Result<(), SignalError>
where
    T: BusTransport,
    F: FnOnce(&WireValue) -> Result<Payload, DecodeError>,
{
    let completion = match conn.invoke(method, args).await {
        Ok(reply) => {
            debug!(method, "Reply received");
            decode(&reply).map_err(|e| {
                debug!(method, error = %e, "Reply did not match the expected shape");
                OperationError::Decode(e)
            })
        }
        Err(e) => {
            debug!(method, path = conn.endpoint().path, error = %e, "Remote call failed");
            Err(OperationError::Remote(e))
        }
    };

    signal.fire(completion)
}
