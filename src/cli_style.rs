/*!
 * CLI style system
 *
 * Themed text, status icons and the comfy-table builders used for record
 * listings.
 */

use crate::model::{Capabilities, ClientRecord, ExportRecord};
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use console::{style, StyledObject};

// ============================================================================
// THEME COLORS
// ============================================================================

pub struct Theme;

impl Theme {
    /// Primary accent color (cyan)
    pub fn primary<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red()
    }

    /// Muted/secondary text (dim)
    pub fn muted<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }

    /// Header style (bold cyan)
    pub fn header<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }
}

// ============================================================================
// ICONS
// ============================================================================

pub struct Icons;

impl Icons {
    pub const SUCCESS: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const INFO: &'static str = "ℹ";
    pub const ARROW_RIGHT: &'static str = "→";
}

// ============================================================================
// TABLES
// ============================================================================

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// No outer borders
pub fn create_minimal_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_NO_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Two-column name/value listing
pub fn key_value_table<'a, I>(items: I) -> Table
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut table = create_minimal_table();

    for (key, value) in items {
        table.add_row(vec![
            Cell::new(key).fg(Color::Cyan),
            Cell::new(value)
                .fg(Color::White)
                .add_attribute(Attribute::Bold),
        ]);
    }

    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn flag_cell(set: bool) -> Cell {
    if set {
        Cell::new(Icons::SUCCESS).fg(Color::Green)
    } else {
        Cell::new("-").fg(Color::DarkGrey)
    }
}

fn capability_cells(capabilities: &Capabilities) -> impl Iterator<Item = Cell> {
    capabilities.flags().into_iter().map(flag_cell)
}

pub fn client_table(clients: &[ClientRecord]) -> Table {
    let mut table = create_table();
    let mut header = vec![header_cell("IP addr")];
    header.extend(Capabilities::LABELS.iter().map(|l| header_cell(l)));
    header.push(header_cell("last"));
    table.set_header(header);

    for client in clients {
        let mut row = vec![Cell::new(&client.address)];
        row.extend(capability_cells(&client.capabilities));
        row.push(Cell::new(client.last_activity.display_local()).fg(Color::DarkGrey));
        table.add_row(row);
    }

    table
}

pub fn export_table(exports: &[ExportRecord]) -> Table {
    let mut table = create_table();
    let mut header = vec![header_cell("Id"), header_cell("path")];
    header.extend(Capabilities::LABELS.iter().map(|l| header_cell(l)));
    header.push(header_cell("last"));
    table.set_header(header);

    for export in exports {
        let mut row = vec![Cell::new(export.id), Cell::new(&export.path)];
        row.extend(capability_cells(&export.capabilities));
        row.push(Cell::new(export.last_activity.display_local()).fg(Color::DarkGrey));
        table.add_row(row);
    }

    table
}

// ============================================================================
// MESSAGES
// ============================================================================

/// Print a styled error message with optional suggestion
pub fn print_error(message: &str, suggestion: Option<&str>) {
    eprintln!(
        "{} {}",
        Theme::error(format!("{} Error:", Icons::ERROR)),
        message
    );

    if let Some(hint) = suggestion {
        eprintln!(
            "  {} {}",
            Theme::muted(Icons::ARROW_RIGHT),
            Theme::muted(hint)
        );
    }
}

pub fn print_success(message: &str) {
    println!(
        "{} {}",
        Theme::success(Icons::SUCCESS.to_string()),
        Theme::success(message)
    );
}

pub fn print_info(message: &str) {
    println!("{} {}", Theme::primary(Icons::INFO.to_string()), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Instant;

    fn client(address: &str, flags: [bool; 8]) -> ClientRecord {
        ClientRecord {
            address: address.to_string(),
            capabilities: Capabilities::from_flags(flags),
            last_activity: Instant::new(1_699_999_000, 0),
        }
    }

    #[test]
    fn test_client_table_columns() {
        let mut table = client_table(&[client("10.0.0.5", [true; 8])]);
        // address + 8 flags + last
        assert_eq!(table.column_count(), 10);
        let rendered = table.to_string();
        assert!(rendered.contains("10.0.0.5"));
        assert!(rendered.contains("nfsv41"));
    }

    #[test]
    fn test_export_table_columns() {
        let export = ExportRecord {
            id: 77,
            path: "/gpfs/fs0".to_string(),
            capabilities: Capabilities::default(),
            last_activity: Instant::new(0, 0),
        };
        let mut table = export_table(&[export]);
        assert_eq!(table.column_count(), 11);
        assert!(table.to_string().contains("/gpfs/fs0"));
    }

    #[test]
    fn test_key_value_table() {
        let table = key_value_table([("COMPONENT_ALL", "NIV_EVENT")]);
        let rendered = table.to_string();
        assert!(rendered.contains("COMPONENT_ALL"));
        assert!(rendered.contains("NIV_EVENT"));
    }
}
