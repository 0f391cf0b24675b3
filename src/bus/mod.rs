//! Bus connection abstraction
//!
//! This module provides the connection handle the facades call through:
//! - `BusTransport`: one remote object, one async method invocation at a time
//! - `Connector`: opens a transport eagerly for a well-known endpoint
//! - `DbusConnector`: the real system/session bus, via zbus
//! - `MockConnector`: scripted replies for tests (`mock` feature)

mod dbus;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use dbus::{DbusConnector, DbusTransport};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockConnector, MockTransport};

use crate::error::{BusError, ConnectError};
use crate::wire::{WireArg, WireValue};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Well-known bus name of the NFS server
pub const SERVICE: &str = "org.ganesha.nfsd";

/// Property group holding the log component levels
pub const LOG_COMPONENT_GROUP: &str = "org.ganesha.nfsd.log.component";

/// Which message bus to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusKind::System => write!(f, "system"),
            BusKind::Session => write!(f, "session"),
        }
    }
}

/// Address of one remote object interface
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub service: String,
    pub path: &'static str,
    pub interface: &'static str,
}

impl Endpoint {
    pub fn client_manager(service: &str) -> Self {
        Self {
            service: service.to_string(),
            path: "/org/ganesha/nfsd/ClientMgr",
            interface: "org.ganesha.nfsd.clientmgr",
        }
    }

    pub fn export_manager(service: &str) -> Self {
        Self {
            service: service.to_string(),
            path: "/org/ganesha/nfsd/ExportMgr",
            interface: "org.ganesha.nfsd.exportmgr",
        }
    }

    pub fn admin(service: &str) -> Self {
        Self {
            service: service.to_string(),
            path: "/org/ganesha/nfsd/admin",
            interface: "org.ganesha.nfsd.admin",
        }
    }

    /// Log levels are exposed as properties on the admin object
    pub fn log_properties(service: &str) -> Self {
        Self {
            service: service.to_string(),
            path: "/org/ganesha/nfsd/admin",
            interface: "org.freedesktop.DBus.Properties",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} ({})", self.service, self.path, self.interface)
    }
}

/// Invokes methods on a single remote object interface
#[async_trait]
pub trait BusTransport: Send + Sync {
    /// Call `method` and return the reply body as a struct of out-arguments
    async fn invoke(&self, method: &str, args: Vec<WireArg>) -> Result<WireValue, BusError>;
}

/// Opens transports. Opening is eager and fails fast.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: BusTransport;

    async fn open(&self, endpoint: &Endpoint) -> Result<Self::Transport, ConnectError>;

    /// Bus name used in diagnostics
    fn bus_label(&self) -> String;
}

/// Connection handle owned by one facade.
///
/// Immutable after construction; lives for the rest of the process.
pub struct BusConnection<T: BusTransport> {
    endpoint: Endpoint,
    transport: T,
}

impl<T: BusTransport> BusConnection<T> {
    /// Connect eagerly; an unreachable service is reported here, not at call time
    pub async fn connect<C>(connector: &C, endpoint: Endpoint) -> Result<Self, ConnectError>
    where
        C: Connector<Transport = T>,
    {
        debug!("Connecting to {} on the {} bus", endpoint, connector.bus_label());
        let transport = connector.open(&endpoint).await?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub async fn invoke(&self, method: &str, args: Vec<WireArg>) -> Result<WireValue, BusError> {
        debug!(
            method,
            path = self.endpoint.path,
            interface = self.endpoint.interface,
            "Invoking remote method"
        );
        self.transport.invoke(method, args).await
    }
}
