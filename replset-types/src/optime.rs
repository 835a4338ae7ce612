//! Operation-time markers.
//!
//! Servers report a member's optime in different shapes depending on
//! version and protocol: a bare timestamp, or a `{ts, t}` document carrying
//! the election term as well. [`Optime`] keeps whatever was received and
//! only interprets it on request.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A replication timestamp: seconds since the Unix epoch plus an increment
/// ordering operations within the same second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OpTimestamp {
    /// Seconds since the Unix epoch.
    pub secs: u32,
    /// Ordinal of the operation within `secs`.
    pub inc: u32,
}

impl OpTimestamp {
    /// Create a timestamp from its parts.
    pub const fn new(secs: u32, inc: u32) -> Self {
        Self { secs, inc }
    }

    /// Unpack the 64-bit BSON layout (seconds in the high word).
    pub const fn from_packed(packed: u64) -> Self {
        Self {
            secs: (packed >> 32) as u32,
            inc: packed as u32,
        }
    }

    /// Pack into the 64-bit BSON layout.
    pub const fn to_packed(self) -> u64 {
        ((self.secs as u64) << 32) | self.inc as u64
    }

    /// Whole seconds by which `self` trails `newer`, zero if it does not.
    pub fn secs_behind(self, newer: OpTimestamp) -> u64 {
        (newer.secs as u64).saturating_sub(self.secs as u64)
    }

    fn to_extended_json(self) -> Value {
        json!({ "$timestamp": { "t": self.secs, "i": self.inc } })
    }
}

/// Opaque operation-time payload of a member.
///
/// Serialized exactly as received. [`Optime::timestamp`] and
/// [`Optime::term`] understand the common shapes:
///
/// - `{"ts": <timestamp>, "t": <term>}` (protocol version 1)
/// - `{"$timestamp": {"t": .., "i": ..}}` (extended JSON)
/// - `{"t": .., "i": ..}` or `{"T": .., "I": ..}`
/// - a bare integer holding a packed timestamp
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Optime(Value);

impl Optime {
    /// Wrap an arbitrary value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// An absent optime (`null`).
    pub fn null() -> Self {
        Self(Value::Null)
    }

    /// A bare timestamp in extended JSON form.
    pub fn timestamp_only(ts: OpTimestamp) -> Self {
        Self(ts.to_extended_json())
    }

    /// A composite optime carrying a timestamp and an election term.
    pub fn with_term(ts: OpTimestamp, term: i64) -> Self {
        Self(json!({ "ts": ts.to_extended_json(), "t": term }))
    }

    /// Borrow the raw payload.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw payload.
    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Whether this is the `{ts, t}` shape.
    pub fn is_composite(&self) -> bool {
        self.0.as_object().is_some_and(|m| m.contains_key("ts"))
    }

    /// The replication timestamp, if the shape is recognized.
    pub fn timestamp(&self) -> Option<OpTimestamp> {
        match self.0.as_object().and_then(|m| m.get("ts")) {
            Some(ts) => parse_timestamp(ts),
            None => parse_timestamp(&self.0),
        }
    }

    /// The election term of a composite optime.
    pub fn term(&self) -> Option<i64> {
        let map = self.0.as_object()?;
        if !map.contains_key("ts") {
            return None;
        }
        map.get("t").and_then(as_i64)
    }
}

impl From<Value> for Optime {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<OpTimestamp> for Optime {
    fn from(ts: OpTimestamp) -> Self {
        Self::timestamp_only(ts)
    }
}

fn parse_timestamp(value: &Value) -> Option<OpTimestamp> {
    match value {
        Value::Number(n) => n.as_u64().map(OpTimestamp::from_packed),
        Value::Object(map) => {
            if let Some(inner) = map.get("$timestamp") {
                return parse_timestamp(inner);
            }
            if let Some(packed) = wrapped_integer(map) {
                return u64::try_from(packed).ok().map(OpTimestamp::from_packed);
            }
            let secs = map.get("t").or_else(|| map.get("T")).and_then(as_i64)?;
            let inc = map.get("i").or_else(|| map.get("I")).and_then(as_i64)?;
            Some(OpTimestamp::new(
                u32::try_from(secs).ok()?,
                u32::try_from(inc).ok()?,
            ))
        }
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::Object(map) => wrapped_integer(map),
        _ => None,
    }
}

// {"$numberLong": "123"} / {"$numberInt": "123"}
fn wrapped_integer(map: &Map<String, Value>) -> Option<i64> {
    map.get("$numberLong")
        .or_else(|| map.get("$numberInt"))
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}
