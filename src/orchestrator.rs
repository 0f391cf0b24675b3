/*!
 * Command orchestration
 *
 * One process invocation runs exactly one `Command`: connect the facade it
 * needs, register the completion subscriber, issue the call, and wait for
 * the signal to fire. The invocation is in `AwaitingReply` from the moment
 * the call is issued until the signal fires, then `Terminated`. There is no
 * retry and no second call.
 */

use crate::bus::{BusTransport, Connector};
use crate::error::{ConnectError, CtlError, Result};
use crate::facade::{AdminControl, ClientRegistry, ExportRegistry, LogControl};
use crate::signal::{Completion, CompletionSignal, Payload};
use std::fmt;
use std::future::Future;
use tracing::{debug, info};

/// A single management request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddClient { address: String },
    RemoveClient { address: String },
    ShowClients,
    AddExport { config_path: String, expression: String },
    RemoveExport { id: u16 },
    DisplayExport { id: u16 },
    ShowExports,
    Shutdown,
    Grace { address: String },
    Reload,
    SetLog { component: String, level: String },
    GetLog { component: String },
    GetAllLogs,
}

impl Command {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddClient { .. } => "add_client",
            Command::RemoveClient { .. } => "remove_client",
            Command::ShowClients => "show_client",
            Command::AddExport { .. } => "add_export",
            Command::RemoveExport { .. } => "remove_export",
            Command::DisplayExport { .. } => "display_export",
            Command::ShowExports => "show_exports",
            Command::Shutdown => "shutdown",
            Command::Grace { .. } => "grace",
            Command::Reload => "reload",
            Command::SetLog { .. } => "set_log",
            Command::GetLog { .. } => "get_log",
            Command::GetAllLogs => "getall_logs",
        }
    }

    /// What the user is told once the request goes out
    pub fn issue_notice(&self) -> String {
        match self {
            Command::AddClient { address } => format!("Add a client {}", address),
            Command::RemoveClient { address } => format!("Remove a client {}", address),
            Command::ShowClients => "Show clients".to_string(),
            Command::AddExport { config_path, .. } => format!("Add Export in {}", config_path),
            Command::RemoveExport { id } => format!("Remove Export with id {}", id),
            Command::DisplayExport { id } => format!("Display export with id {}", id),
            Command::ShowExports => "Show exports".to_string(),
            Command::Shutdown => "Shutting down server.".to_string(),
            Command::Grace { .. } => "Start grace period.".to_string(),
            Command::Reload => "Reload server configuration.".to_string(),
            Command::SetLog { component, level } => {
                format!("Set log {} to {}", component, level)
            }
            Command::GetLog { component } => format!("Get property {}", component),
            Command::GetAllLogs => "Get all".to_string(),
        }
    }
}

/// Lifecycle of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingReply,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AwaitingReply => write!(f, "awaiting-reply"),
            Phase::Terminated => write!(f, "terminated"),
        }
    }
}

/// Run `command` against the server reached through `connector`.
///
/// `on_issue` is called once, after the connection is up and right before
/// the call goes out. A connection failure returns `CtlError::Connectivity`
/// without calling it and without issuing anything.
pub async fn execute<C, F>(
    connector: &C,
    service: &str,
    command: &Command,
    on_issue: F,
) -> Result<Completion>
where
    C: Connector,
    F: FnOnce(&Command),
{
    let connectivity = |e: ConnectError| CtlError::Connectivity {
        service: e.service,
        bus: connector.bus_label(),
        reason: e.reason,
    };

    let mut signal = CompletionSignal::new();
    let waiter = signal.register_once()?;

    info!(command = command.name(), service, "Executing command");

    match command {
        Command::AddClient { address } => {
            let clients = ClientRegistry::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            clients.add_client(address, signal).await?;
        }
        Command::RemoveClient { address } => {
            let clients = ClientRegistry::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            clients.remove_client(address, signal).await?;
        }
        Command::ShowClients => {
            let clients = ClientRegistry::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            clients.list_clients(signal).await?;
        }
        Command::AddExport {
            config_path,
            expression,
        } => {
            let exports = ExportRegistry::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            exports.add_export(config_path, expression, signal).await?;
        }
        Command::RemoveExport { id } => {
            let exports = ExportRegistry::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            exports.remove_export(*id, signal).await?;
        }
        Command::DisplayExport { id } => {
            let exports = ExportRegistry::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            exports.describe_export(*id, signal).await?;
        }
        Command::ShowExports => {
            let exports = ExportRegistry::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            exports.list_exports(signal).await?;
        }
        Command::Shutdown | Command::Grace { .. } | Command::Reload => {
            let admin = AdminControl::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            run_admin(&admin, command, signal).await?;
        }
        Command::SetLog { component, level } => {
            let logs = LogControl::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            logs.set(component, level, signal).await?;
        }
        Command::GetLog { component } => {
            let logs = LogControl::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            logs.get(component, signal).await?;
        }
        Command::GetAllLogs => {
            let logs = LogControl::open(connector, service)
                .await
                .map_err(connectivity)?;
            issued(command, on_issue);
            logs.get_all(signal).await?;
        }
    }

    let completion = waiter.await?;
    debug!(command = command.name(), phase = %Phase::Terminated, ok = completion.is_ok());
    Ok(completion)
}

fn issued<F: FnOnce(&Command)>(command: &Command, on_issue: F) {
    debug!(command = command.name(), phase = %Phase::AwaitingReply);
    on_issue(command);
}

async fn run_admin<T: BusTransport>(
    admin: &AdminControl<T>,
    command: &Command,
    signal: CompletionSignal,
) -> Result<()> {
    match command {
        Command::Grace { address } => admin.grace(address, signal).await?,
        Command::Reload => admin.reload(signal).await?,
        _ => admin.shutdown(signal).await?,
    }
    Ok(())
}

/// Turn a completion into the invocation's final result.
///
/// A `false` acknowledgement status is a failure even though the call itself
/// succeeded.
pub fn outcome(completion: Completion) -> Result<Payload> {
    match completion {
        Ok(Payload::Ack(ack)) if !ack.status => Err(CtlError::Rejected(ack.message)),
        Ok(payload) => Ok(payload),
        Err(e) => Err(e.into()),
    }
}

/// Drive `future` on a single-threaded runtime until it resolves
pub fn run_until_complete<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
