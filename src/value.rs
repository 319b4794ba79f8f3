// Copyright (C) 2022-2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of tracing-fluent.
//
// tracing-fluent is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// tracing-fluent is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with tracing-fluent.  If
// not, see <http://www.gnu.org/licenses/>.

//! Field values & records.
//!
//! A log field may hold just about anything, but a fluentd record is a MessagePack map, so
//! [`Value`] closes the universe of field values over what MessagePack can carry. A [`Record`] is
//! the map itself.
//!
//! Arbitrary [`serde::Serialize`] types may be turned into a [`Value`] through
//! [`Value::from_serialize`]; serde's own field attributes then govern naming & omission:
//!
//! ```rust
//! use serde::Serialize;
//! use tracing_fluent::value::Value;
//!
//! #[derive(Serialize)]
//! struct Request {
//!     #[serde(rename = "req_path")]
//!     path: String,
//!     #[serde(skip)]
//!     session_key: String,
//!     #[serde(skip_serializing_if = "Option::is_none")]
//!     referrer: Option<String>,
//! }
//!
//! let v = Value::from_serialize(&Request {
//!     path: "/".to_string(),
//!     session_key: "s3kr1t".to_string(),
//!     referrer: None,
//! })
//! .unwrap();
//! let map = v.as_map().unwrap();
//! assert_eq!(map.len(), 1);
//! assert_eq!(map["req_path"], Value::from("/"));
//! ```

use crate::error::{Error, Result};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use std::collections::BTreeMap;

/// An outbound record: field name to [`Value`]. Keys are unique; order is not significant.
pub type Record = BTreeMap<String, Value>;

/// A single field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// Opaque bytes; encoded as MessagePack "bin"
    Bin(Vec<u8>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Convert anything [`Serialize`] into a [`Value`].
    ///
    /// Structs & maps become [`Value::Map`], sequences [`Value::Array`], and so on. Map keys that
    /// aren't strings are rejected.
    pub fn from_serialize<T: Serialize + ?Sized>(x: &T) -> Result<Value> {
        serde_json::to_value(x)
            .map(Value::from)
            .map_err(Error::encode)
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bin(b) => write!(f, "<{} bytes>", b.len()),
            Value::Array(a) => f.debug_list().entries(a.iter().map(DisplayAsDebug)).finish(),
            Value::Map(m) => f
                .debug_map()
                .entries(m.iter().map(|(k, v)| (k, DisplayAsDebug(v))))
                .finish(),
        }
    }
}

// Lets nested values render with their `Display` form inside `debug_list` & `debug_map`.
struct DisplayAsDebug<'a>(&'a Value);

impl std::fmt::Debug for DisplayAsDebug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bin(b) => serializer.serialize_bytes(b),
            Value::Array(a) => {
                let mut seq = serializer.serialize_seq(Some(a.len()))?;
                for v in a {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl std::convert::From<serde_json::Value> for Value {
    fn from(x: serde_json::Value) -> Self {
        match x {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(a) => Value::Array(a.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(o) => {
                Value::Map(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $($t:ty),+) => {
        $(
            impl std::convert::From<$t> for Value {
                fn from(x: $t) -> Self {
                    Value::$variant(x.into())
                }
            }
        )+
    };
}

value_from!(Bool, bool);
value_from!(Int, i8, i16, i32, i64);
value_from!(UInt, u8, u16, u32, u64);
value_from!(Float, f32, f64);
value_from!(Str, String, &str);
value_from!(Bin, Vec<u8>);
value_from!(Array, Vec<Value>);
value_from!(Map, BTreeMap<String, Value>);

impl std::convert::From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl<T: Into<Value>> std::convert::From<Option<T>> for Value {
    fn from(x: Option<T>) -> Self {
        x.map(Into::into).unwrap_or(Value::Nil)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use serde::Serialize;

    #[test]
    fn from_serialize() {
        #[derive(Serialize)]
        struct Inner {
            depth: u32,
        }
        #[derive(Serialize)]
        struct Outer {
            #[serde(rename = "value_1")]
            value1: String,
            #[serde(skip)]
            _value2: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            value3: Option<i32>,
            inner: Inner,
            list: Vec<bool>,
        }

        let v = Value::from_serialize(&Outer {
            value1: "one".to_string(),
            _value2: "two".to_string(),
            value3: None,
            inner: Inner { depth: 3 },
            list: vec![true, false],
        })
        .unwrap();

        let mut inner = BTreeMap::new();
        inner.insert("depth".to_string(), Value::Int(3));
        let mut golden = BTreeMap::new();
        golden.insert("value_1".to_string(), Value::from("one"));
        golden.insert("inner".to_string(), Value::Map(inner));
        golden.insert(
            "list".to_string(),
            Value::Array(vec![Value::Bool(true), Value::Bool(false)]),
        );
        assert_eq!(v, Value::Map(golden));

        assert_eq!(
            Value::from_serialize(&u64::MAX).unwrap(),
            Value::UInt(u64::MAX)
        );
        assert_eq!(Value::from_serialize(&1.5f64).unwrap(), Value::Float(1.5));
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(42u8), Value::UInt(42));
        assert_eq!(Value::from("x"), Value::Str("x".to_string()));
        assert_eq!(Value::from(None::<i32>), Value::Nil);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
        assert!(Value::from(()).is_nil());
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(1).as_str(), None);
    }

    #[test]
    fn display() {
        let v = Value::Array(vec![Value::from(1), Value::from("a"), Value::Bin(vec![0; 3])]);
        assert_eq!(format!("{}", v), "[1, a, <3 bytes>]");
    }

    #[test]
    fn msgpack_bin() {
        let buf = rmp_serde::to_vec(&Value::Bin(vec![1, 2, 3])).unwrap();
        // bin 8: 0xc4, length, payload
        assert_eq!(buf, vec![0xc4, 3, 1, 2, 3]);
        let buf = rmp_serde::to_vec(&Value::Str("abc".to_string())).unwrap();
        assert_eq!(buf, vec![0xa3, b'a', b'b', b'c']);
    }
}
