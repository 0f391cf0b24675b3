use super::dispatch;
use crate::bus::{BusConnection, BusTransport, Connector, Endpoint};
use crate::decode;
use crate::error::ConnectError;
use crate::signal::{CompletionSignal, Payload, SignalError};
use crate::wire::WireArg;
use tracing::info;

/// `org.ganesha.nfsd.clientmgr`
pub struct ClientRegistry<T: BusTransport> {
    conn: BusConnection<T>,
}

impl<T: BusTransport> ClientRegistry<T> {
    pub async fn open<C>(connector: &C, service: &str) -> Result<Self, ConnectError>
    where
        C: Connector<Transport = T>,
    {
        let conn = BusConnection::connect(connector, Endpoint::client_manager(service)).await?;
        Ok(Self { conn })
    }

    pub async fn add_client(
        &self,
        address: &str,
        signal: CompletionSignal,
    ) -> Result<(), SignalError> {
        info!(address, "Adding client");
        dispatch(
            &self.conn,
            "AddClient",
            vec![WireArg::text(address)],
            signal,
            |reply| decode::acknowledgement(reply).map(Payload::Ack),
        )
        .await
    }

    pub async fn remove_client(
        &self,
        address: &str,
        signal: CompletionSignal,
    ) -> Result<(), SignalError> {
        info!(address, "Removing client");
        dispatch(
            &self.conn,
            "RemoveClient",
            vec![WireArg::text(address)],
            signal,
            |reply| decode::acknowledgement(reply).map(Payload::Ack),
        )
        .await
    }

    pub async fn list_clients(&self, signal: CompletionSignal) -> Result<(), SignalError> {
        dispatch(&self.conn, "ShowClients", vec![], signal, |reply| {
            decode::client_listing(reply).map(Payload::Clients)
        })
        .await
    }
}
