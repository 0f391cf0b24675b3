/*!
 * Substrate-neutral representation of bus arguments and replies
 *
 * The bus transport converts whatever its marshaling layer produces into
 * `WireValue` before anything else looks at it. Decoders never see the
 * transport's own types, which keeps them testable without a running bus.
 */

use std::fmt;

/// A structured value as delivered by the bus
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Double(f64),
    Text(String),
    /// Fixed-arity tuple; a method reply body is always one of these
    Struct(Vec<WireValue>),
    Array(Vec<WireValue>),
    /// Key/value pairs in the order the server sent them
    Dict(Vec<(WireValue, WireValue)>),
    /// A value boxed in a self-describing container
    Variant(Box<WireValue>),
}

impl WireValue {
    /// Reply body of a method that returns nothing
    pub fn unit() -> Self {
        WireValue::Struct(Vec::new())
    }

    /// Strip any number of variant wrappers
    pub fn unwrap_variant(&self) -> &WireValue {
        let mut value = self;
        while let WireValue::Variant(inner) = value {
            value = inner;
        }
        value
    }

    /// Short type name used in decode diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Bool(_) => "bool",
            WireValue::Unsigned(_) => "unsigned",
            WireValue::Signed(_) => "signed",
            WireValue::Double(_) => "double",
            WireValue::Text(_) => "text",
            WireValue::Struct(_) => "struct",
            WireValue::Array(_) => "array",
            WireValue::Dict(_) => "dict",
            WireValue::Variant(_) => "variant",
        }
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        WireValue::Bool(value)
    }
}

impl From<u64> for WireValue {
    fn from(value: u64) -> Self {
        WireValue::Unsigned(value)
    }
}

impl From<u16> for WireValue {
    fn from(value: u16) -> Self {
        WireValue::Unsigned(u64::from(value))
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        WireValue::Text(value.to_string())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        WireValue::Text(value)
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Bool(b) => write!(f, "{}", b),
            WireValue::Unsigned(n) => write!(f, "{}", n),
            WireValue::Signed(n) => write!(f, "{}", n),
            WireValue::Double(n) => write!(f, "{}", n),
            WireValue::Text(s) => write!(f, "{:?}", s),
            WireValue::Struct(fields) => {
                write!(f, "(")?;
                write_joined(f, fields)?;
                write!(f, ")")
            }
            WireValue::Array(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            WireValue::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            WireValue::Variant(inner) => write!(f, "<{}>", inner),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, values: &[WireValue]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

/// A single outgoing method argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireArg {
    /// `s`
    Text(String),
    /// `q`
    U16(u16),
    /// `v` wrapping an `s`
    TextVariant(String),
}

impl WireArg {
    pub fn text(value: impl Into<String>) -> Self {
        WireArg::Text(value.into())
    }
}
