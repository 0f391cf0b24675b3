//! Structured output writer supporting JSON Lines and human-readable modes.

use crate::bus::BusKind;
use crate::cli_style;
use crate::error::CtlError;
use crate::model::{Acknowledgement, ExportDescriptor, Instant};
use crate::signal::Payload;
use serde::Serialize;

/// Output mode for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// JSON shape of a failed invocation
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub category: String,
    pub exit_code: i32,
    pub error: String,
}

impl ErrorReport {
    pub fn from_error(err: &CtlError) -> Self {
        Self {
            kind: "error",
            category: err.category().to_string(),
            exit_code: err.exit_code(),
            error: sanitize_error(&err.to_string()),
        }
    }
}

/// Prints results to stdout and failures to stderr
#[derive(Debug, Clone)]
pub struct OutputWriter {
    pub mode: OutputMode,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            mode: if json { OutputMode::Json } else { OutputMode::Human },
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Print the payload of a completed call
    pub fn payload(&self, payload: &Payload) {
        match self.mode {
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(payload) {
                    println!("{}", json);
                }
            }
            OutputMode::Human => match payload {
                Payload::Ack(ack) => cli_style::print_success(&ack_text(ack)),
                other => println!("{}", render_human(other)),
            },
        }
    }

    /// Print an error message
    pub fn error(&self, err: &CtlError) {
        match self.mode {
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(&ErrorReport::from_error(err)) {
                    eprintln!("{}", json);
                }
            }
            OutputMode::Human => {
                cli_style::print_error(&sanitize_error(&err.to_string()), error_hint(err));
            }
        }
    }

    /// Print an info message (suppressed in JSON mode)
    pub fn info(&self, msg: &str) {
        if !self.is_json() {
            cli_style::print_info(msg);
        }
    }
}

/// Only a system-bus connection failure has somewhere else to look
fn error_hint(err: &CtlError) -> Option<&'static str> {
    match err {
        CtlError::Connectivity { bus, .. } if *bus == BusKind::System.to_string() => {
            Some("use --session or set `bus` in config.toml for a session-bus server")
        }
        _ => None,
    }
}

fn ack_text(ack: &Acknowledgement) -> String {
    if ack.message.is_empty() {
        "Done".to_string()
    } else {
        ack.message.clone()
    }
}

fn timestamp_line(timestamp: &Instant) -> String {
    format!("Timestamp: {}", timestamp.display_local())
}

fn describe_line(export: &ExportDescriptor) -> String {
    format!(
        "export {}: path = {}, pseudo = {}, tag = {}",
        export.id, export.path, export.pseudo_path, export.tag
    )
}

/// Human rendering of a payload, without a trailing newline
pub fn render_human(payload: &Payload) -> String {
    match payload {
        Payload::Ack(ack) => ack_text(ack),
        Payload::Clients(listing) => {
            let mut out = timestamp_line(&listing.timestamp);
            if listing.clients.is_empty() {
                out.push_str("\nNo clients");
            } else {
                out.push_str(&format!("\n{}\n", cli_style::Theme::header("Clients:")));
                out.push_str(&cli_style::client_table(&listing.clients).to_string());
            }
            out
        }
        Payload::Exports(listing) => {
            let mut out = timestamp_line(&listing.timestamp);
            if listing.exports.is_empty() {
                out.push_str("\nNo exports");
            } else {
                out.push_str(&format!("\n{}\n", cli_style::Theme::header("Exports:")));
                out.push_str(&cli_style::export_table(&listing.exports).to_string());
            }
            out
        }
        Payload::Export(export) => describe_line(export),
        Payload::LogLevel { level } => format!("Log level: {}", level),
        Payload::LogComponents { components } => cli_style::key_value_table(
            components.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
        .to_string(),
    }
}

/// Sanitize error messages by collapsing whitespace
pub fn sanitize_error(msg: &str) -> String {
    msg.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::model::{ClientListing, ExportListing, LogComponentMap};

    #[test]
    fn test_sanitize_error_newlines() {
        assert_eq!(sanitize_error("line1\nline2\nline3"), "line1 line2 line3");
    }

    #[test]
    fn test_sanitize_error_mixed() {
        assert_eq!(
            sanitize_error("  error:\n  detail\t  info  \r\n"),
            "error: detail info"
        );
        assert_eq!(sanitize_error(" \n \t \r "), "");
    }

    #[test]
    fn test_output_writer_mode_switch() {
        assert!(OutputWriter::new(true).is_json());
        assert_eq!(OutputWriter::new(false).mode, OutputMode::Human);
    }

    #[test]
    fn test_empty_listings() {
        let clients = render_human(&Payload::Clients(ClientListing {
            timestamp: Instant::new(1_700_000_000, 500),
            clients: vec![],
        }));
        assert!(clients.starts_with("Timestamp: "));
        assert!(clients.ends_with("500 nsecs\nNo clients"));

        let exports = render_human(&Payload::Exports(ExportListing {
            timestamp: Instant::new(1_700_000_000, 0),
            exports: vec![],
        }));
        assert!(exports.ends_with("\nNo exports"));
    }

    #[test]
    fn test_describe_line() {
        let text = render_human(&Payload::Export(ExportDescriptor {
            id: 77,
            path: "/gpfs/fs0".to_string(),
            pseudo_path: "/fs0".to_string(),
            tag: "fs0".to_string(),
        }));
        assert_eq!(text, "export 77: path = /gpfs/fs0, pseudo = /fs0, tag = fs0");
    }

    #[test]
    fn test_log_renderings() {
        assert_eq!(
            render_human(&Payload::LogLevel {
                level: "NIV_EVENT".to_string()
            }),
            "Log level: NIV_EVENT"
        );

        let mut components = LogComponentMap::new();
        components.insert("COMPONENT_FSAL".to_string(), "NIV_INFO".to_string());
        let text = render_human(&Payload::LogComponents { components });
        assert!(text.contains("COMPONENT_FSAL"));
        assert!(text.contains("NIV_INFO"));
    }

    #[test]
    fn test_empty_ack_message_reads_done() {
        let ack = Acknowledgement {
            status: true,
            message: String::new(),
        };
        assert_eq!(render_human(&Payload::Ack(ack)), "Done");
    }

    fn unreachable(bus: BusKind) -> CtlError {
        CtlError::Connectivity {
            service: "org.ganesha.nfsd".to_string(),
            bus: bus.to_string(),
            reason: "name has no owner".to_string(),
        }
    }

    #[test]
    fn test_session_hint_only_for_system_bus() {
        assert!(error_hint(&unreachable(BusKind::System))
            .unwrap()
            .contains("--session"));
        assert_eq!(error_hint(&unreachable(BusKind::Session)), None);
        assert_eq!(
            error_hint(&CtlError::Argument("get_log requires a component.".to_string())),
            None
        );
    }

    #[test]
    fn test_error_report_json() {
        let err = CtlError::Decode(DecodeError::Arity {
            context: "client",
            expected: 10,
            found: 9,
        });
        let json = serde_json::to_value(ErrorReport::from_error(&err)).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["category"], "decode");
        assert_eq!(json["exit_code"], 3);
        assert!(json["error"].as_str().unwrap().starts_with("malformed reply"));
    }
}
