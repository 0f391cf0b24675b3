//! Scripted bus for testing
//!
//! `MockTransport` answers each method from a queue of canned replies and
//! records every call it receives. `MockConnector` hands out transports per
//! endpoint and can pretend the whole service is down.

use super::{BusTransport, Connector, Endpoint};
use crate::error::{BusError, ConnectError};
use crate::wire::{WireArg, WireValue};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A call received by a `MockTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub args: Vec<WireArg>,
}

/// In-memory transport with canned replies
///
/// # Example
///
/// ```rust
/// use ganeshactl::bus::{BusTransport, MockTransport};
/// use ganeshactl::wire::WireValue;
///
/// # async fn example() {
/// let transport = MockTransport::new().reply("RemoveExport", WireValue::unit());
/// let reply = transport.invoke("RemoveExport", vec![]).await.unwrap();
/// assert_eq!(reply, WireValue::unit());
/// assert_eq!(transport.calls().len(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, VecDeque<Result<WireValue, BusError>>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for `method`
    pub fn reply(self, method: &str, body: WireValue) -> Self {
        self.push(method, Ok(body));
        self
    }

    /// Queue an error reply for `method`
    pub fn fail(self, method: &str, error: BusError) -> Self {
        self.push(method, Err(error));
        self
    }

    fn push(&self, method: &str, outcome: Result<WireValue, BusError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Every call received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BusTransport for MockTransport {
    async fn invoke(&self, method: &str, args: Vec<WireArg>) -> Result<WireValue, BusError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            args,
        });

        let next = self
            .replies
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(|queue| queue.pop_front());

        next.unwrap_or_else(|| {
            Err(BusError::Remote {
                name: "org.freedesktop.DBus.Error.UnknownMethod".to_string(),
                message: format!("No such method '{}'", method),
            })
        })
    }
}

/// Hands out `MockTransport`s keyed by object path and interface
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    transports: Arc<Mutex<HashMap<(String, String), MockTransport>>>,
    down: bool,
    attempts: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `endpoint` with `transport`
    pub fn with(self, endpoint: &Endpoint, transport: MockTransport) -> Self {
        self.transports.lock().unwrap().insert(
            (endpoint.path.to_string(), endpoint.interface.to_string()),
            transport,
        );
        self
    }

    /// Every open fails as if the service had no owner on the bus
    pub fn service_down(mut self) -> Self {
        self.down = true;
        self
    }

    /// Number of times `open` was called
    pub fn open_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn open(&self, endpoint: &Endpoint) -> Result<MockTransport, ConnectError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.down {
            return Err(ConnectError {
                service: endpoint.service.clone(),
                path: endpoint.path.to_string(),
                reason: "name has no owner".to_string(),
            });
        }

        self.transports
            .lock()
            .unwrap()
            .get(&(endpoint.path.to_string(), endpoint.interface.to_string()))
            .cloned()
            .ok_or_else(|| ConnectError {
                service: endpoint.service.clone(),
                path: endpoint.path.to_string(),
                reason: format!("no mock object for {}", endpoint.interface),
            })
    }

    fn bus_label(&self) -> String {
        "mock".to_string()
    }
}
