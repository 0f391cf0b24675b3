use super::dispatch;
use crate::bus::{BusConnection, BusTransport, Connector, Endpoint, LOG_COMPONENT_GROUP};
use crate::decode;
use crate::error::ConnectError;
use crate::model::Acknowledgement;
use crate::signal::{CompletionSignal, Payload, SignalError};
use crate::wire::WireArg;
use tracing::info;

/// Log levels, read and written through the standard properties interface
pub struct LogControl<T: BusTransport> {
    conn: BusConnection<T>,
}

impl<T: BusTransport> LogControl<T> {
    pub async fn open<C>(connector: &C, service: &str) -> Result<Self, ConnectError>
    where
        C: Connector<Transport = T>,
    {
        let conn = BusConnection::connect(connector, Endpoint::log_properties(service)).await?;
        Ok(Self { conn })
    }

    pub async fn get(&self, component: &str, signal: CompletionSignal) -> Result<(), SignalError> {
        dispatch(
            &self.conn,
            "Get",
            vec![WireArg::text(LOG_COMPONENT_GROUP), WireArg::text(component)],
            signal,
            |reply| decode::log_level(reply).map(|level| Payload::LogLevel { level }),
        )
        .await
    }

    pub async fn set(
        &self,
        component: &str,
        level: &str,
        signal: CompletionSignal,
    ) -> Result<(), SignalError> {
        info!(component, level, "Setting log level");
        dispatch(
            &self.conn,
            "Set",
            vec![
                WireArg::text(LOG_COMPONENT_GROUP),
                WireArg::text(component),
                WireArg::TextVariant(level.to_string()),
            ],
            signal,
            |reply| decode::unit(reply).map(|()| Payload::Ack(Acknowledgement::done())),
        )
        .await
    }

    pub async fn get_all(&self, signal: CompletionSignal) -> Result<(), SignalError> {
        dispatch(
            &self.conn,
            "GetAll",
            vec![WireArg::text(LOG_COMPONENT_GROUP)],
            signal,
            |reply| decode::log_components(reply).map(|components| Payload::LogComponents { components }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{MockConnector, MockTransport, SERVICE};
    use crate::wire::WireValue;

    async fn logs(transport: MockTransport) -> LogControl<MockTransport> {
        let connector = MockConnector::new().with(&Endpoint::log_properties(SERVICE), transport);
        LogControl::open(&connector, SERVICE).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_level() {
        let transport = MockTransport::new().reply(
            "Get",
            WireValue::Struct(vec![WireValue::Variant(Box::new("NIV_EVENT".into()))]),
        );
        let control = logs(transport.clone()).await;

        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        control.get("COMPONENT_NFS_V4", signal).await.unwrap();

        assert_eq!(
            waiter.await.unwrap(),
            Ok(Payload::LogLevel {
                level: "NIV_EVENT".to_string()
            })
        );
        assert_eq!(
            transport.calls()[0].args,
            vec![
                WireArg::text(LOG_COMPONENT_GROUP),
                WireArg::text("COMPONENT_NFS_V4")
            ]
        );
    }

    #[tokio::test]
    async fn test_set_wraps_level_in_variant() {
        let transport = MockTransport::new().reply("Set", WireValue::unit());
        let control = logs(transport.clone()).await;

        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        control.set("COMPONENT_ALL", "NIV_DEBUG", signal).await.unwrap();

        assert_eq!(
            waiter.await.unwrap(),
            Ok(Payload::Ack(Acknowledgement::done()))
        );
        assert_eq!(
            transport.calls()[0].args[2],
            WireArg::TextVariant("NIV_DEBUG".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_all() {
        let transport = MockTransport::new().reply(
            "GetAll",
            WireValue::Struct(vec![WireValue::Dict(vec![
                ("COMPONENT_ALL".into(), WireValue::Variant(Box::new("NIV_EVENT".into()))),
                ("COMPONENT_FSAL".into(), WireValue::Variant(Box::new("NIV_INFO".into()))),
            ])]),
        );
        let control = logs(transport).await;

        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        control.get_all(signal).await.unwrap();

        let Ok(Payload::LogComponents { components }) = waiter.await.unwrap() else {
            panic!("expected a component map");
        };
        assert_eq!(components["COMPONENT_FSAL"], "NIV_INFO");
    }
}
