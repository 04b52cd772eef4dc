//! Typed values produced by argument parsing.

use std::any::Any;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use bigdecimal::{BigDecimal, num_bigint::BigInt};
use chrono::{NaiveDateTime, TimeDelta};
use url::Url;
use uuid::Uuid;

/// A value stored in a parse context.
///
/// Every typed leaf element produces one of these. Values are cheap to clone
/// apart from the arbitrary-precision numbers. [`Value::Any`] carries values
/// that have no dedicated variant, such as enum constants or resolved
/// command mappings.
#[derive(Clone)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit floating point.
    Double(f64),
    /// Arbitrary-precision integer.
    BigInt(BigInt),
    /// Arbitrary-precision decimal.
    BigDecimal(BigDecimal),
    /// String value.
    String(Arc<str>),
    /// UUID.
    Uuid(Uuid),
    /// Absolute URL.
    Url(Url),
    /// IPv4 or IPv6 address.
    Ip(IpAddr),
    /// Local date and time without zone.
    DateTime(NaiveDateTime),
    /// Signed duration.
    Duration(TimeDelta),
    /// Any other shareable value.
    Any(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wraps an arbitrary value.
    #[must_use]
    pub fn any<T: Any + Send + Sync>(value: T) -> Self {
        Self::Any(Arc::new(value))
    }

    /// Returns the name of this value's variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::BigInt(_) => "bigint",
            Self::BigDecimal(_) => "bigdecimal",
            Self::String(_) => "string",
            Self::Uuid(_) => "uuid",
            Self::Url(_) => "url",
            Self::Ip(_) => "ip",
            Self::DateTime(_) => "datetime",
            Self::Duration(_) => "duration",
            Self::Any(_) => "any",
        }
    }

    /// Returns the boolean if this is a bool.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an int.
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the integer if this is an int or a long.
    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n as i64),
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float if this is a double.
    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the big integer if this is one.
    #[must_use]
    pub const fn as_big_int(&self) -> Option<&BigInt> {
        match self {
            Self::BigInt(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the big decimal if this is one.
    #[must_use]
    pub const fn as_big_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Self::BigDecimal(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the UUID if this is one.
    #[must_use]
    pub const fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the URL if this is one.
    #[must_use]
    pub const fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Returns the address if this is an IP.
    #[must_use]
    pub const fn as_ip(&self) -> Option<IpAddr> {
        match self {
            Self::Ip(ip) => Some(*ip),
            _ => None,
        }
    }

    /// Returns the date-time if this is one.
    #[must_use]
    pub const fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the duration if this is one.
    #[must_use]
    pub const fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Borrows the wrapped value if this is [`Value::Any`] holding a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Any(inner) => inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Clones out the shared pointer if this is [`Value::Any`] holding a `T`.
    #[must_use]
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Any(inner) => Arc::clone(inner).downcast::<T>().ok(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::BigDecimal(a), Self::BigDecimal(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::Url(a), Self::Url(b)) => a == b,
            (Self::Ip(a), Self::Ip(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Any(a), Self::Any(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Long(n) => write!(f, "Long({n})"),
            Self::Double(n) => write!(f, "Double({n})"),
            Self::BigInt(n) => write!(f, "BigInt({n})"),
            Self::BigDecimal(n) => write!(f, "BigDecimal({n})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::Uuid(id) => write!(f, "Uuid({id})"),
            Self::Url(url) => write!(f, "Url({url})"),
            Self::Ip(ip) => write!(f, "Ip({ip})"),
            Self::DateTime(dt) => write!(f, "DateTime({dt})"),
            Self::Duration(d) => write!(f, "Duration({d})"),
            Self::Any(_) => write!(f, "Any(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::Double(n) => write!(f, "{n}"),
            Self::BigInt(n) => write!(f, "{n}"),
            Self::BigDecimal(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Uuid(id) => write!(f, "{id}"),
            Self::Url(url) => write!(f, "{url}"),
            Self::Ip(ip) => write!(f, "{ip}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Any(_) => write!(f, "<value>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Self::BigInt(n)
    }
}

impl From<BigDecimal> for Value {
    fn from(n: BigDecimal) -> Self {
        Self::BigDecimal(n)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

impl From<Url> for Value {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

impl From<IpAddr> for Value {
    fn from(ip: IpAddr) -> Self {
        Self::Ip(ip)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<TimeDelta> for Value {
    fn from(d: TimeDelta) -> Self {
        Self::Duration(d)
    }
}
