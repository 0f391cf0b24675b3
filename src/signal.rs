/*!
 * Single-shot completion signal
 *
 * Correlates the one outstanding remote call of an invocation with its
 * result. `fire` consumes the signal, so a second fire does not compile;
 * `register_once` hands out the only receiver.
 */

use crate::error::OperationError;
use crate::model::{
    Acknowledgement, ClientListing, ExportDescriptor, ExportListing, LogComponentMap,
};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::oneshot;

/// Success payload of a completed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Ack(Acknowledgement),
    Clients(ClientListing),
    Exports(ExportListing),
    Export(ExportDescriptor),
    LogLevel { level: String },
    LogComponents { components: LogComponentMap },
}

/// Exactly one of these is produced per invocation
pub type Completion = std::result::Result<Payload, OperationError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("a subscriber is already registered")]
    AlreadyRegistered,

    /// Carries the result so it is never dropped silently
    #[error("fired with no subscriber registered")]
    NoSubscriber(Box<Completion>),

    #[error("subscriber went away before the result was delivered")]
    SubscriberGone(Box<Completion>),

    #[error("signal was dropped without firing")]
    NeverFired,
}

/// Firing side, owned by the facade that issues the call
#[derive(Debug, Default)]
pub struct CompletionSignal {
    subscriber: Option<oneshot::Sender<Completion>>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self { subscriber: None }
    }

    /// Register the single subscriber and get the future that resolves on fire
    pub fn register_once(&mut self) -> Result<CompletionFuture, SignalError> {
        if self.subscriber.is_some() {
            return Err(SignalError::AlreadyRegistered);
        }
        let (tx, rx) = oneshot::channel();
        self.subscriber = Some(tx);
        Ok(CompletionFuture { rx })
    }

    /// Deliver the result. Consumes the signal.
    pub fn fire(mut self, completion: Completion) -> Result<(), SignalError> {
        let Some(tx) = self.subscriber.take() else {
            return Err(SignalError::NoSubscriber(Box::new(completion)));
        };
        tx.send(completion)
            .map_err(|completion| SignalError::SubscriberGone(Box::new(completion)))
    }
}

/// Receiving side; resolves once with the fired result
#[derive(Debug)]
pub struct CompletionFuture {
    rx: oneshot::Receiver<Completion>,
}

impl Future for CompletionFuture {
    type Output = Result<Completion, SignalError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| SignalError::NeverFired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;

    #[tokio::test]
    async fn test_fire_delivers_success() {
        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        signal.fire(Ok(Payload::Ack(Acknowledgement::done()))).unwrap();

        let completion = waiter.await.unwrap();
        assert_eq!(completion, Ok(Payload::Ack(Acknowledgement::done())));
    }

    #[tokio::test]
    async fn test_fire_delivers_failure() {
        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        let err = OperationError::Remote(BusError::Transport("timeout".to_string()));
        signal.fire(Err(err.clone())).unwrap();

        assert_eq!(waiter.await.unwrap(), Err(err));
    }

    #[test]
    fn test_second_registration_is_rejected() {
        let mut signal = CompletionSignal::new();
        let _waiter = signal.register_once().unwrap();
        assert_eq!(signal.register_once().unwrap_err(), SignalError::AlreadyRegistered);
    }

    #[test]
    fn test_fire_without_subscriber_returns_result() {
        let signal = CompletionSignal::new();
        let completion: Completion = Ok(Payload::LogLevel {
            level: "NIV_EVENT".to_string(),
        });
        match signal.fire(completion.clone()) {
            Err(SignalError::NoSubscriber(returned)) => assert_eq!(*returned, completion),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_fire_after_subscriber_dropped() {
        let mut signal = CompletionSignal::new();
        drop(signal.register_once().unwrap());
        let result = signal.fire(Ok(Payload::Ack(Acknowledgement::done())));
        assert!(matches!(result, Err(SignalError::SubscriberGone(_))));
    }

    #[tokio::test]
    async fn test_dropped_signal_resolves_never_fired() {
        let mut signal = CompletionSignal::new();
        let waiter = signal.register_once().unwrap();
        drop(signal);
        assert_eq!(waiter.await.unwrap_err(), SignalError::NeverFired);
    }

    #[test]
    fn test_payload_json_is_tagged() {
        let json = serde_json::to_string(&Payload::LogLevel {
            level: "NIV_INFO".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"log_level","level":"NIV_INFO"}"#);
    }
}
