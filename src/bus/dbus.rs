//! D-Bus transport backed by zbus

use super::{BusKind, BusTransport, Connector, Endpoint};
use crate::error::{BusError, ConnectError};
use crate::wire::{WireArg, WireValue};
use async_trait::async_trait;
use tracing::{debug, trace};
use zbus::fdo::DBusProxy;
use zbus::names::BusName;
use zbus::zvariant::{Structure, StructureBuilder, Value};
use zbus::{Connection, Proxy};

/// Opens proxies on the system or session bus
#[derive(Debug, Clone, Copy)]
pub struct DbusConnector {
    kind: BusKind,
}

impl DbusConnector {
    pub fn new(kind: BusKind) -> Self {
        Self { kind }
    }

    async fn connection(&self) -> zbus::Result<Connection> {
        match self.kind {
            BusKind::System => Connection::system().await,
            BusKind::Session => Connection::session().await,
        }
    }
}

#[async_trait]
impl Connector for DbusConnector {
    type Transport = DbusTransport;

    async fn open(&self, endpoint: &Endpoint) -> Result<DbusTransport, ConnectError> {
        let fail = |reason: String| ConnectError {
            service: endpoint.service.clone(),
            path: endpoint.path.to_string(),
            reason,
        };

        let conn = self
            .connection()
            .await
            .map_err(|e| fail(format!("cannot open {} bus: {}", self.kind, e)))?;

        // A proxy alone would not notice a missing service until the first call
        let name = BusName::try_from(endpoint.service.as_str())
            .map_err(|e| fail(format!("invalid service name: {}", e)))?;
        let dbus = DBusProxy::new(&conn)
            .await
            .map_err(|e| fail(e.to_string()))?;
        let owned = dbus
            .name_has_owner(name)
            .await
            .map_err(|e| fail(e.to_string()))?;
        if !owned {
            return Err(fail("name has no owner".to_string()));
        }

        let proxy = Proxy::new(
            &conn,
            endpoint.service.clone(),
            endpoint.path,
            endpoint.interface,
        )
        .await
        .map_err(|e| fail(e.to_string()))?;

        debug!("Opened proxy for {}", endpoint);
        Ok(DbusTransport { proxy })
    }

    fn bus_label(&self) -> String {
        self.kind.to_string()
    }
}

/// Proxy for one object path and interface
pub struct DbusTransport {
    proxy: Proxy<'static>,
}

#[async_trait]
impl BusTransport for DbusTransport {
    async fn invoke(&self, method: &str, args: Vec<WireArg>) -> Result<WireValue, BusError> {
        let message = if args.is_empty() {
            self.proxy.call_method(method, &()).await
        } else {
            self.proxy.call_method(method, &marshal(args)).await
        }
        .map_err(bus_error)?;

        let body = message.body();
        if body.deserialize::<()>().is_ok() {
            trace!(method, "Empty reply body");
            return Ok(WireValue::unit());
        }

        let reply: Structure<'_> = body.deserialize().map_err(bus_error)?;
        let fields = reply
            .fields()
            .iter()
            .map(to_wire)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WireValue::Struct(fields))
    }
}

fn marshal(args: Vec<WireArg>) -> Structure<'static> {
    args.into_iter()
        .fold(StructureBuilder::new(), |builder, arg| match arg {
            WireArg::Text(s) => builder.add_field(s),
            WireArg::U16(n) => builder.add_field(n),
            WireArg::TextVariant(s) => builder.append_field(Value::Value(Box::new(Value::from(s)))),
        })
        .build()
}

fn bus_error(err: zbus::Error) -> BusError {
    match err {
        zbus::Error::MethodError(name, description, _) => BusError::Remote {
            name: name.to_string(),
            message: description.unwrap_or_default(),
        },
        other => BusError::Transport(other.to_string()),
    }
}

fn to_wire(value: &Value<'_>) -> Result<WireValue, BusError> {
    Ok(match value {
        Value::Bool(b) => WireValue::Bool(*b),
        Value::U8(n) => WireValue::Unsigned(u64::from(*n)),
        Value::U16(n) => WireValue::Unsigned(u64::from(*n)),
        Value::U32(n) => WireValue::Unsigned(u64::from(*n)),
        Value::U64(n) => WireValue::Unsigned(*n),
        Value::I16(n) => WireValue::Signed(i64::from(*n)),
        Value::I32(n) => WireValue::Signed(i64::from(*n)),
        Value::I64(n) => WireValue::Signed(*n),
        Value::F64(n) => WireValue::Double(*n),
        Value::Str(s) => WireValue::Text(s.as_str().to_string()),
        Value::Signature(s) => WireValue::Text(s.as_str().to_string()),
        Value::ObjectPath(p) => WireValue::Text(p.as_str().to_string()),
        Value::Value(inner) => WireValue::Variant(Box::new(to_wire(inner)?)),
        Value::Array(items) => {
            WireValue::Array(items.iter().map(to_wire).collect::<Result<_, _>>()?)
        }
        Value::Dict(entries) => WireValue::Dict(
            entries
                .iter()
                .map(|(k, v)| Ok((to_wire(k)?, to_wire(v)?)))
                .collect::<Result<_, BusError>>()?,
        ),
        Value::Structure(s) => {
            WireValue::Struct(s.fields().iter().map(to_wire).collect::<Result<_, _>>()?)
        }
        #[allow(unreachable_patterns)]
        other => {
            return Err(BusError::Transport(format!(
                "unsupported value in reply: {}",
                other.value_signature()
            )))
        }
    })
}
