use super::dispatch;
use crate::bus::{BusConnection, BusTransport, Connector, Endpoint};
use crate::decode;
use crate::error::ConnectError;
use crate::model::Acknowledgement;
use crate::signal::{CompletionSignal, Payload, SignalError};
use crate::wire::WireArg;
use tracing::info;

/// `org.ganesha.nfsd.exportmgr`
pub struct ExportRegistry<T: BusTransport> {
    conn: BusConnection<T>,
}

impl<T: BusTransport> ExportRegistry<T> {
    pub async fn open<C>(connector: &C, service: &str) -> Result<Self, ConnectError>
    where
        C: Connector<Transport = T>,
    {
        let conn = BusConnection::connect(connector, Endpoint::export_manager(service)).await?;
        Ok(Self { conn })
    }

    /// Load the export matching `expression` from the config file at `config_path`
    pub async fn add_export(
        &self,
        config_path: &str,
        expression: &str,
        signal: CompletionSignal,
    ) -> Result<(), SignalError> {
        info!(config_path, expression, "Adding export");
        dispatch(
            &self.conn,
            "AddExport",
            vec![WireArg::text(config_path), WireArg::text(expression)],
            signal,
            |reply| {
                decode::message(reply).map(|message| {
                    Payload::Ack(Acknowledgement {
                        status: true,
                        message: format!("Done: {}", message),
                    })
                })
            },
        )
        .await
    }

    pub async fn remove_export(&self, id: u16, signal: CompletionSignal) -> Result<(), SignalError> {
        info!(id, "Removing export");
        dispatch(
            &self.conn,
            "RemoveExport",
            vec![WireArg::U16(id)],
            signal,
            |reply| decode::unit(reply).map(|()| Payload::Ack(Acknowledgement::done())),
        )
        .await
    }

    /// Id, path, pseudo path and tag of one export
    pub async fn describe_export(
        &self,
        id: u16,
        signal: CompletionSignal,
    ) -> Result<(), SignalError> {
        dispatch(
            &self.conn,
            "DisplayExport",
            vec![WireArg::U16(id)],
            signal,
            |reply| decode::export_descriptor(reply).map(Payload::Export),
        )
        .await
    }

    pub async fn list_exports(&self, signal: CompletionSignal) -> Result<(), SignalError> {
        dispatch(&self.conn, "ShowExports", vec![], signal, |reply| {
            decode::export_listing(reply).map(Payload::Exports)
        })
        .await
    }
}
