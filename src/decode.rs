/*!
 * Typed decoding of server replies
 *
 * Every reply shape is a fixed positional contract. Decoders check arity and
 * scalar types before reading anything and fail closed with a `DecodeError`;
 * they never guess which field moved. Lists are decoded in server order.
 */

use crate::error::DecodeError;
use crate::model::{
    Acknowledgement, Capabilities, ClientListing, ClientRecord, ExportDescriptor, ExportListing,
    ExportRecord, Instant, LogComponentMap,
};
use crate::wire::WireValue;

/// address + flags + timestamp
pub const CLIENT_FIELDS: usize = 1 + Capabilities::COUNT + 1;

/// id + path + flags + timestamp
pub const EXPORT_FIELDS: usize = 2 + Capabilities::COUNT + 1;

type Result<T> = std::result::Result<T, DecodeError>;

/// `(bs)` from AddClient, RemoveClient, grace, shutdown, reload
pub fn acknowledgement(reply: &WireValue) -> Result<Acknowledgement> {
    let fields = fields(reply, 2, "acknowledgement")?;
    Ok(Acknowledgement {
        status: boolean(&fields[0], "acknowledgement status")?,
        message: text(&fields[1], "acknowledgement message")?,
    })
}

/// `(s)` from AddExport
pub fn message(reply: &WireValue) -> Result<String> {
    let fields = fields(reply, 1, "message reply")?;
    text(&fields[0], "message reply")
}

/// `()` from RemoveExport and Properties.Set
pub fn unit(reply: &WireValue) -> Result<()> {
    fields(reply, 0, "empty reply").map(|_| ())
}

/// `((tt), a(sbbbbbbbb(tt)))` from ShowClients
pub fn client_listing(reply: &WireValue) -> Result<ClientListing> {
    let fields = fields(reply, 2, "client listing")?;
    let timestamp = instant(&fields[0], "client listing timestamp")?;
    let clients = array(&fields[1], "client list")?
        .iter()
        .map(client_record)
        .collect::<Result<Vec<_>>>()?;
    Ok(ClientListing { timestamp, clients })
}

/// One `(sbbbbbbbb(tt))` row
pub fn client_record(row: &WireValue) -> Result<ClientRecord> {
    let fields = fields(row, CLIENT_FIELDS, "client")?;
    Ok(ClientRecord {
        address: text(&fields[0], "client address")?,
        capabilities: capabilities(&fields[1..1 + Capabilities::COUNT], "client")?,
        last_activity: instant(&fields[CLIENT_FIELDS - 1], "client last activity")?,
    })
}

/// `((tt), a(qsbbbbbbbb(tt)))` from ShowExports
pub fn export_listing(reply: &WireValue) -> Result<ExportListing> {
    let fields = fields(reply, 2, "export listing")?;
    let timestamp = instant(&fields[0], "export listing timestamp")?;
    let exports = array(&fields[1], "export list")?
        .iter()
        .map(export_record)
        .collect::<Result<Vec<_>>>()?;
    Ok(ExportListing { timestamp, exports })
}

/// One `(qsbbbbbbbb(tt))` row
pub fn export_record(row: &WireValue) -> Result<ExportRecord> {
    let fields = fields(row, EXPORT_FIELDS, "export")?;
    Ok(ExportRecord {
        id: export_id(&fields[0])?,
        path: text(&fields[1], "export path")?,
        capabilities: capabilities(&fields[2..2 + Capabilities::COUNT], "export")?,
        last_activity: instant(&fields[EXPORT_FIELDS - 1], "export last activity")?,
    })
}

/// `(qsss)` from DisplayExport
pub fn export_descriptor(reply: &WireValue) -> Result<ExportDescriptor> {
    let fields = fields(reply, 4, "export descriptor")?;
    Ok(ExportDescriptor {
        id: export_id(&fields[0])?,
        path: text(&fields[1], "export path")?,
        pseudo_path: text(&fields[2], "export pseudo path")?,
        tag: text(&fields[3], "export tag")?,
    })
}

/// `(v)` from Properties.Get
pub fn log_level(reply: &WireValue) -> Result<String> {
    let fields = fields(reply, 1, "log level reply")?;
    text(&fields[0], "log level")
}

/// `(a{sv})` from Properties.GetAll
pub fn log_components(reply: &WireValue) -> Result<LogComponentMap> {
    let fields = fields(reply, 1, "log component reply")?;
    let entries = match fields[0].unwrap_variant() {
        WireValue::Dict(entries) => entries,
        other => {
            return Err(DecodeError::Type {
                context: "log components",
                expected: "dict",
                found: other.kind(),
            })
        }
    };

    let mut map = LogComponentMap::new();
    for (key, value) in entries {
        let name = text(key, "log component name")?;
        let level = text(value, "log component level")?;
        if map.contains_key(&name) {
            return Err(DecodeError::DuplicateKey {
                context: "log components",
                key: name,
            });
        }
        map.insert(name, level);
    }
    Ok(map)
}

/// A nested `(tt)` pair. Anything but exactly two integers is rejected.
pub fn instant(value: &WireValue, context: &'static str) -> Result<Instant> {
    let pair = fields(value, 2, context)?;
    Ok(Instant::new(
        unsigned(&pair[0], context)?,
        unsigned(&pair[1], context)?,
    ))
}

fn capabilities(flags: &[WireValue], context: &'static str) -> Result<Capabilities> {
    let mut out = [false; Capabilities::COUNT];
    for (slot, flag) in out.iter_mut().zip(flags) {
        *slot = boolean(flag, context)?;
    }
    Ok(Capabilities::from_flags(out))
}

fn export_id(value: &WireValue) -> Result<u16> {
    let raw = unsigned(value, "export id")?;
    u16::try_from(raw).map_err(|_| DecodeError::OutOfRange {
        context: "export id",
        value: raw.to_string(),
        target: "u16",
    })
}

fn fields<'a>(
    value: &'a WireValue,
    expected: usize,
    context: &'static str,
) -> Result<&'a [WireValue]> {
    match value.unwrap_variant() {
        WireValue::Struct(fields) if fields.len() == expected => Ok(fields),
        WireValue::Struct(fields) => Err(DecodeError::Arity {
            context,
            expected,
            found: fields.len(),
        }),
        other => Err(DecodeError::Type {
            context,
            expected: "struct",
            found: other.kind(),
        }),
    }
}

fn array<'a>(value: &'a WireValue, context: &'static str) -> Result<&'a [WireValue]> {
    match value.unwrap_variant() {
        WireValue::Array(items) => Ok(items),
        other => Err(DecodeError::Type {
            context,
            expected: "array",
            found: other.kind(),
        }),
    }
}

fn boolean(value: &WireValue, context: &'static str) -> Result<bool> {
    match value.unwrap_variant() {
        WireValue::Bool(b) => Ok(*b),
        other => Err(DecodeError::Type {
            context,
            expected: "bool",
            found: other.kind(),
        }),
    }
}

fn unsigned(value: &WireValue, context: &'static str) -> Result<u64> {
    match value.unwrap_variant() {
        WireValue::Unsigned(n) => Ok(*n),
        WireValue::Signed(n) => u64::try_from(*n).map_err(|_| DecodeError::OutOfRange {
            context,
            value: n.to_string(),
            target: "u64",
        }),
        other => Err(DecodeError::Type {
            context,
            expected: "unsigned",
            found: other.kind(),
        }),
    }
}

/// Canonical text for a string-like field.
///
/// Byte arrays are accepted as UTF-8 with trailing NULs removed.
fn text(value: &WireValue, context: &'static str) -> Result<String> {
    match value.unwrap_variant() {
        WireValue::Text(s) => Ok(s.clone()),
        WireValue::Array(items) => {
            let mut bytes = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    WireValue::Unsigned(b) if *b <= u64::from(u8::MAX) => bytes.push(*b as u8),
                    other => {
                        return Err(DecodeError::Type {
                            context,
                            expected: "text",
                            found: other.kind(),
                        })
                    }
                }
            }
            while bytes.last() == Some(&0) {
                bytes.pop();
            }
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        other => Err(DecodeError::Type {
            context,
            expected: "text",
            found: other.kind(),
        }),
    }
}
