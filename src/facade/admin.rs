use super::dispatch;
use crate::bus::{BusConnection, BusTransport, Connector, Endpoint};
use crate::decode;
use crate::error::ConnectError;
use crate::signal::{CompletionSignal, Payload, SignalError};
use crate::wire::WireArg;
use tracing::info;

/// `org.ganesha.nfsd.admin`; every operation is fire-and-acknowledge
pub struct AdminControl<T: BusTransport> {
    conn: BusConnection<T>,
}

impl<T: BusTransport> AdminControl<T> {
    pub async fn open<C>(connector: &C, service: &str) -> Result<Self, ConnectError>
    where
        C: Connector<Transport = T>,
    {
        let conn = BusConnection::connect(connector, Endpoint::admin(service)).await?;
        Ok(Self { conn })
    }

    /// Start a grace period for `address`
    pub async fn grace(&self, address: &str, signal: CompletionSignal) -> Result<(), SignalError> {
        info!(address, "Starting grace period");
        self.acknowledged("grace", vec![WireArg::text(address)], signal)
            .await
    }

    pub async fn shutdown(&self, signal: CompletionSignal) -> Result<(), SignalError> {
        info!("Requesting server shutdown");
        self.acknowledged("shutdown", vec![], signal).await
    }

    /// Re-read the server configuration
    pub async fn reload(&self, signal: CompletionSignal) -> Result<(), SignalError> {
        info!("Requesting configuration reload");
        self.acknowledged("reload", vec![], signal).await
    }

    async fn acknowledged(
        &self,
        method: &str,
        args: Vec<WireArg>,
        signal: CompletionSignal,
    ) -> Result<(), SignalError> {
        dispatch(&self.conn, method, args, signal, |reply| {
            decode::acknowledgement(reply).map(Payload::Ack)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{MockConnector, MockTransport, SERVICE};
    use crate::error::OperationError;
    use crate::model::Acknowledgement;
    use crate::wire::WireValue;

    async fn admin(transport: MockTransport) -> AdminControl<MockTransport> {
        let connector = MockConnector::new().with(&Endpoint::admin(SERVICE), transport);
        AdminControl::open(&connector, SERVICE).await.unwrap()
    }

    #[tokio::test]
    async fn test_shutdown_acknowledged() {
        let transport = MockTransport::new().reply(
            "shutdown",
            WireValue::Struct(vec![true.into(), "Server shut down".into()]),
        );
        let control = admin(transport.clone()).await;

        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        control.shutdown(signal).await.unwrap();

        assert_eq!(
            waiter.await.unwrap(),
            Ok(Payload::Ack(Acknowledgement {
                status: true,
                message: "Server shut down".to_string(),
            }))
        );
        assert!(transport.calls()[0].args.is_empty());
    }

    #[tokio::test]
    async fn test_grace_passes_address() {
        let transport = MockTransport::new().reply(
            "grace",
            WireValue::Struct(vec![true.into(), "Grace started".into()]),
        );
        let control = admin(transport.clone()).await;

        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        control.grace("10.0.0.5", signal).await.unwrap();

        assert!(waiter.await.unwrap().is_ok());
        assert_eq!(transport.calls()[0].args, vec![WireArg::text("10.0.0.5")]);
    }

    #[tokio::test]
    async fn test_reload_with_unexpected_payload() {
        let transport = MockTransport::new().reply("reload", WireValue::unit());
        let control = admin(transport).await;

        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        control.reload(signal).await.unwrap();

        assert!(matches!(waiter.await.unwrap(), Err(OperationError::Decode(_))));
    }
}
