/*!
 * ganeshactl CLI - Command Line Interface
 *
 * One subcommand per remote operation. Arguments are validated before the
 * bus is touched; a missing argument exits with a usage hint.
 */

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use ganeshactl::{
    bus::{BusKind, DbusConnector},
    config::{CtlConfig, LogLevel},
    error::{CtlError, Result, EXIT_SUCCESS},
    logging,
    orchestrator::{execute, outcome, run_until_complete, Command},
    output::OutputWriter,
};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "ganeshactl")]
#[command(version, about = "Manage a running NFS server over its management bus", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/ganeshactl/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Write logs to a file as JSON instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    log: Option<PathBuf>,

    /// Connect to the session bus instead of the system bus
    #[arg(long, global = true)]
    session: bool,

    /// Well-known bus name of the server
    #[arg(long, value_name = "NAME", global = true)]
    service: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Adds the client with the given IP
    #[command(name = "add_client")]
    AddClient { ip: Option<String> },

    /// Removes the client with the given IP
    #[command(name = "remove_client")]
    RemoveClient { ip: Option<String> },

    /// Shows the current clients
    #[command(name = "show_client")]
    ShowClient,

    /// Adds an export from the given config file that matches the expression
    #[command(name = "add_export")]
    AddExport {
        config_file: Option<String>,
        expression: Option<String>,
    },

    /// Removes the export with the given id
    #[command(name = "remove_export")]
    RemoveExport { export_id: Option<String> },

    /// Displays the export with the given id
    #[command(name = "display_export")]
    DisplayExport { export_id: Option<String> },

    /// Shows all current exports
    #[command(name = "show_exports")]
    ShowExports,

    /// Shuts down the server
    Shutdown,

    /// Begins grace for the given IP
    Grace { ip: Option<String> },

    /// Reloads the server configuration
    Reload,

    /// Sets the given log level for the given component
    #[command(name = "set_log")]
    SetLog {
        component: Option<String>,
        level: Option<String>,
    },

    /// Gets the log level for the given component
    #[command(name = "get_log")]
    GetLog { component: Option<String> },

    /// Prints all log components
    #[command(name = "getall_logs")]
    GetallLogs,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let mut output = OutputWriter::new(cli.json);

    let code = match run(cli, &mut output) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            debug!(category = %e.category(), "Invocation failed");
            output.error(&e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli, output: &mut OutputWriter) -> Result<()> {
    let command = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ganeshactl", &mut std::io::stdout());
            return Ok(());
        }
        Some(command) => to_command(command)?,
        None => return Err(CtlError::Argument("Unknown/missing command.".to_string())),
    };

    let mut config = CtlConfig::load(cli.config.as_deref())?;

    // Command-line flags win over the file
    config.json_output |= cli.json;
    config.verbose |= cli.verbose;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.log.is_some() {
        config.log_file = cli.log;
    }
    if cli.session {
        config.bus = BusKind::Session;
    }
    if let Some(service) = cli.service {
        config.service = service;
    }

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    *output = OutputWriter::new(config.json_output);
    let writer = output.clone();

    let connector = DbusConnector::new(config.bus);
    let completion = run_until_complete(execute(
        &connector,
        &config.service,
        &command,
        |issued| writer.info(&issued.issue_notice()),
    ))??;

    let payload = outcome(completion)?;
    output.payload(&payload);
    Ok(())
}

/// Validate positional arguments; nothing here touches the bus
fn to_command(command: Commands) -> Result<Command> {
    let command = match command {
        Commands::AddClient { ip } => Command::AddClient {
            address: required(ip, "add_client requires an IP.")?,
        },
        Commands::RemoveClient { ip } => Command::RemoveClient {
            address: required(ip, "remove_client requires an IP.")?,
        },
        Commands::ShowClient => Command::ShowClients,
        Commands::AddExport {
            config_file,
            expression,
        } => {
            let hint = "add_export requires a config file and an expression.";
            Command::AddExport {
                config_path: required(config_file, hint)?,
                expression: required(expression, hint)?,
            }
        }
        Commands::RemoveExport { export_id } => Command::RemoveExport {
            id: export_id_arg(export_id, "remove_export requires an export ID.")?,
        },
        Commands::DisplayExport { export_id } => Command::DisplayExport {
            id: export_id_arg(export_id, "display_export requires an export ID.")?,
        },
        Commands::ShowExports => Command::ShowExports,
        Commands::Shutdown => Command::Shutdown,
        Commands::Grace { ip } => Command::Grace {
            address: required(ip, "grace requires an IP.")?,
        },
        Commands::Reload => Command::Reload,
        Commands::SetLog { component, level } => {
            let hint = "set_log requires a component and a log level.";
            Command::SetLog {
                component: required(component, hint)?,
                level: required(level, hint)?,
            }
        }
        Commands::GetLog { component } => Command::GetLog {
            component: required(component, "get_log requires a component.")?,
        },
        Commands::GetallLogs => Command::GetAllLogs,
        Commands::Completions { .. } => {
            return Err(CtlError::Argument("Unknown/missing command.".to_string()))
        }
    };
    Ok(command)
}

fn required(value: Option<String>, hint: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CtlError::Argument(hint.to_string()))
}

fn export_id_arg(value: Option<String>, hint: &str) -> Result<u16> {
    let raw = required(value, hint)?;
    raw.trim().parse::<u16>().map_err(|_| {
        CtlError::Argument(format!(
            "Invalid export ID '{}': expected an integer between 0 and {}.",
            raw,
            u16::MAX
        ))
    })
}
