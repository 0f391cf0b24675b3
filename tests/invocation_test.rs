//! One full invocation per test, against a scripted bus

use ganeshactl::bus::{Endpoint, MockConnector, MockTransport, SERVICE};
use ganeshactl::error::{BusError, CtlError};
use ganeshactl::model::{Acknowledgement, Capabilities, Instant};
use ganeshactl::output::render_human;
use ganeshactl::wire::{WireArg, WireValue};
use ganeshactl::{execute, outcome, run_until_complete, Command, Payload};

fn instant(secs: u64, nanos: u64) -> WireValue {
    WireValue::Struct(vec![secs.into(), nanos.into()])
}

fn invoke(connector: &MockConnector, command: Command) -> ganeshactl::Result<Payload> {
    let completion = run_until_complete(execute(connector, SERVICE, &command, |_| {}))??;
    outcome(completion)
}

#[test]
fn test_show_client_scenario() {
    let row = WireValue::Struct(vec![
        "10.0.0.5".into(),
        true.into(),
        false.into(),
        false.into(),
        false.into(),
        true.into(),
        false.into(),
        false.into(),
        false.into(),
        instant(1_699_999_000, 0),
    ]);
    let transport = MockTransport::new().reply(
        "ShowClients",
        WireValue::Struct(vec![instant(1_700_000_000, 500), WireValue::Array(vec![row])]),
    );
    let connector =
        MockConnector::new().with(&Endpoint::client_manager(SERVICE), transport.clone());

    let Payload::Clients(listing) = invoke(&connector, Command::ShowClients).unwrap() else {
        panic!("expected a client listing");
    };

    assert_eq!(listing.timestamp, Instant::new(1_700_000_000, 500));
    let client = &listing.clients[0];
    assert_eq!(client.address, "10.0.0.5");
    assert_eq!(
        client.capabilities,
        Capabilities::from_flags([true, false, false, false, true, false, false, false])
    );
    assert_eq!(client.last_activity, Instant::new(1_699_999_000, 0));
    assert_eq!(transport.calls().len(), 1);
}

#[test]
fn test_describe_and_list_agree_on_path() {
    let exports = MockTransport::new()
        .reply(
            "DisplayExport",
            WireValue::Struct(vec![
                WireValue::Unsigned(77),
                "/gpfs/fs0".into(),
                "/fs0".into(),
                "fs0".into(),
            ]),
        )
        .reply(
            "ShowExports",
            WireValue::Struct(vec![
                instant(1_700_000_000, 0),
                WireValue::Array(vec![WireValue::Struct(vec![
                    WireValue::Unsigned(77),
                    "/gpfs/fs0".into(),
                    true.into(),
                    true.into(),
                    true.into(),
                    false.into(),
                    true.into(),
                    true.into(),
                    false.into(),
                    false.into(),
                    instant(1_699_000_000, 12),
                ])]),
            ]),
        );
    let connector = MockConnector::new().with(&Endpoint::export_manager(SERVICE), exports);

    let Payload::Export(desc) = invoke(&connector, Command::DisplayExport { id: 77 }).unwrap()
    else {
        panic!("expected an export descriptor");
    };
    let Payload::Exports(listing) = invoke(&connector, Command::ShowExports).unwrap() else {
        panic!("expected an export listing");
    };

    let entry = listing.exports.iter().find(|e| e.id == desc.id).unwrap();
    assert_eq!(entry.path, desc.path);
    assert!(render_human(&Payload::Exports(listing.clone())).contains("/gpfs/fs0"));
}

#[test]
fn test_set_log_sends_variant_and_acknowledges() {
    let transport = MockTransport::new().reply("Set", WireValue::unit());
    let connector =
        MockConnector::new().with(&Endpoint::log_properties(SERVICE), transport.clone());

    let payload = invoke(
        &connector,
        Command::SetLog {
            component: "COMPONENT_NFS_V4".to_string(),
            level: "NIV_FULL_DEBUG".to_string(),
        },
    )
    .unwrap();

    assert_eq!(payload, Payload::Ack(Acknowledgement::done()));
    assert_eq!(
        transport.calls()[0].args,
        vec![
            WireArg::text("org.ganesha.nfsd.log.component"),
            WireArg::text("COMPONENT_NFS_V4"),
            WireArg::TextVariant("NIV_FULL_DEBUG".to_string()),
        ]
    );
}

#[test]
fn test_grace_rejected_by_server() {
    let transport = MockTransport::new().reply(
        "grace",
        WireValue::Struct(vec![false.into(), "Grace period already active".into()]),
    );
    let connector = MockConnector::new().with(&Endpoint::admin(SERVICE), transport);

    let err = invoke(
        &connector,
        Command::Grace {
            address: "10.0.0.5".to_string(),
        },
    )
    .unwrap_err();

    assert!(matches!(err, CtlError::Rejected(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_unreachable_service_issues_nothing() {
    let connector = MockConnector::new().service_down();
    let err = invoke(&connector, Command::Shutdown).unwrap_err();

    assert!(matches!(err, CtlError::Connectivity { .. }));
    assert!(err.is_pre_call());
    assert_eq!(connector.open_attempts(), 1);
}

#[test]
fn test_transport_failure_is_remote_error() {
    let transport = MockTransport::new().fail(
        "AddClient",
        BusError::Remote {
            name: "org.freedesktop.DBus.Error.AccessDenied".to_string(),
            message: "Rejected send message".to_string(),
        },
    );
    let connector = MockConnector::new().with(&Endpoint::client_manager(SERVICE), transport);

    let err = invoke(
        &connector,
        Command::AddClient {
            address: "10.0.0.9".to_string(),
        },
    )
    .unwrap_err();

    assert!(matches!(err, CtlError::Remote(_)));
    assert!(err
        .to_string()
        .contains("org.freedesktop.DBus.Error.AccessDenied: Rejected send message"));
}
