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

//! Log entries.
//!
//! An [`Entry`] is one structured log event: a [`Severity`], a message, and a bag of named
//! [`Value`]s. Entries are usually produced from [`tracing`] [`Event`]s by [`Entry::from_event`],
//! but may equally be assembled by hand & handed to [`Hook::fire`](crate::hook::Hook::fire).
//!
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html

use crate::{
    level::Severity,
    value::{Record, Value},
};

/// The [`tracing`] field holding an event's formatted message
pub const MESSAGE_FIELD: &str = "message";

/// An event field by this name whose value names a [`Severity`] overrides the level taken from
/// the event's metadata; this is the only way for a [`tracing`] event to reach `Panic` or `Fatal`.
pub const SEVERITY_FIELD: &str = "severity";

/// One structured log event.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub severity: Severity,
    pub message: String,
    pub fields: Record,
}

impl Entry {
    /// A new entry with no fields.
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> Entry {
        Entry {
            severity,
            message: message.into(),
            fields: Record::new(),
        }
    }
    /// Add (or replace) the field `name`.
    pub fn with_field<K: Into<String>, V: Into<Value>>(mut self, name: K, value: V) -> Entry {
        self.fields.insert(name.into(), value.into());
        self
    }
    /// Build an [`Entry`] from a [`tracing`] [`Event`].
    ///
    /// The "message" field becomes the entry's message; every other field is kept under its own
    /// name. Integers, floats, booleans & strings retain their types; anything else is recorded
    /// via its [`Debug`](std::fmt::Debug) implementation.
    ///
    /// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
    pub fn from_event(event: &tracing::Event<'_>) -> Entry {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        Entry {
            severity: visitor
                .severity
                .unwrap_or_else(|| Severity::from(event.metadata().level())),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    severity: Option<Severity>,
    fields: Record,
}

impl FieldVisitor {
    fn insert(&mut self, field: &tracing::field::Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, Value::Int(value));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, Value::UInt(value));
    }
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.insert(field, Value::Float(value));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            MESSAGE_FIELD => self.message = Some(value.to_string()),
            SEVERITY_FIELD => match value.parse::<Severity>() {
                Ok(severity) => self.severity = Some(severity),
                Err(_) => self.insert(field, Value::from(value)),
            },
            _ => self.insert(field, Value::from(value)),
        }
    }
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // The tracing macros "pre-format" the `message` field, so `value` here is really a
        // `std::fmt::Arguments` whose debug form carries no enclosing quotes.
        let text = format!("{:?}", value);
        if field.name() == MESSAGE_FIELD {
            self.message = Some(text);
        } else {
            self.insert(field, Value::Str(text));
        }
    }
}
