/*!
 * Typed records decoded from server replies
 */

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A (seconds, nanoseconds) timestamp as returned by the server.
///
/// Ordering is lexicographic on `(secs, nanos)`, which the derive gives us
/// from field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Instant {
    pub secs: u64,
    pub nanos: u64,
}

impl Instant {
    pub fn new(secs: u64, nanos: u64) -> Self {
        Self { secs, nanos }
    }

    /// Convert to a calendar time, if the pair is representable
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.secs).ok()?;
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(secs, nanos)
    }

    /// Local time in `ctime` form followed by the nanosecond remainder
    pub fn display_local(&self) -> String {
        match self.to_datetime() {
            Some(dt) => format!(
                "{} {} nsecs",
                dt.with_timezone(&chrono::Local).format("%a %b %e %H:%M:%S %Y"),
                self.nanos
            ),
            None => format!("{}s {} nsecs", self.secs, self.nanos),
        }
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// Which protocol variants a client or export has been seen using.
///
/// The field order is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub nfsv3: bool,
    pub mnt: bool,
    pub nlm4: bool,
    pub rquota: bool,
    pub nfsv40: bool,
    pub nfsv41: bool,
    pub nfsv42: bool,
    pub ninep: bool,
}

impl Capabilities {
    /// Number of positional flags on the wire
    pub const COUNT: usize = 8;

    /// Column labels, in wire order
    pub const LABELS: [&'static str; Self::COUNT] =
        ["nfsv3", "mnt", "nlm4", "rquota", "nfsv40", "nfsv41", "nfsv42", "9p"];

    pub fn from_flags(flags: [bool; Self::COUNT]) -> Self {
        let [nfsv3, mnt, nlm4, rquota, nfsv40, nfsv41, nfsv42, ninep] = flags;
        Self {
            nfsv3,
            mnt,
            nlm4,
            rquota,
            nfsv40,
            nfsv41,
            nfsv42,
            ninep,
        }
    }

    pub fn flags(&self) -> [bool; Self::COUNT] {
        [
            self.nfsv3,
            self.mnt,
            self.nlm4,
            self.rquota,
            self.nfsv40,
            self.nfsv41,
            self.nfsv42,
            self.ninep,
        ]
    }
}

/// One entry of the server's client table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub address: String,
    pub capabilities: Capabilities,
    pub last_activity: Instant,
}

/// One entry of the server's export table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub id: u16,
    pub path: String,
    pub capabilities: Capabilities,
    pub last_activity: Instant,
}

/// Narrow description of a single export (no flags, no timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportDescriptor {
    pub id: u16,
    pub path: String,
    pub pseudo_path: String,
    pub tag: String,
}

/// Snapshot of the client table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientListing {
    pub timestamp: Instant,
    pub clients: Vec<ClientRecord>,
}

/// Snapshot of the export table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportListing {
    pub timestamp: Instant,
    pub exports: Vec<ExportRecord>,
}

/// Log component name to verbosity level
pub type LogComponentMap = BTreeMap<String, String>;

/// Acknowledgement for operations that carry no structured payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub status: bool,
    pub message: String,
}

impl Acknowledgement {
    pub fn done() -> Self {
        Self {
            status: true,
            message: "Done".to_string(),
        }
    }
}
