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

//! Turning [`Entry`]s into tagged fluentd records.
//!
//! A [`Hook`] pairs a [`Transformer`] (the rules for turning an [`Entry`] into a tag & a
//! [`Record`]) with a transport [`Mode`]. Both are fixed at construction: [`HookBuilder`] is the
//! only way to set rules, and once built a [`Hook`] may be shared freely between threads.
//!
//! ```rust
//! use tracing_fluent::{entry::Entry, hook::Hook, level::Severity, value::Value};
//!
//! let transformer = Hook::builder()
//!     .ignore("password")
//!     .filter("message", |v| match v {
//!         Value::Str(s) => Value::Str(s.to_uppercase()),
//!         other => other,
//!     })
//!     .build_transformer();
//!
//! let entry = Entry::new(Severity::Error, "boom")
//!     .with_field("password", "hunter2")
//!     .with_field("tag", "svc.errors");
//! let (tag, record) = transformer.transform(&entry);
//! assert_eq!(tag, "svc.errors");
//! assert_eq!(record["message"], Value::from("BOOM"));
//! assert_eq!(record["level"], Value::from("error"));
//! assert!(!record.contains_key("password"));
//! ```

use crate::{
    config::Config,
    entry::Entry,
    error::Result,
    level::{Levels, Severity},
    transport::{Connector, Mode, TcpConnector},
    value::{Record, Value},
};

use std::collections::{HashMap, HashSet};

/// The record field from which the tag is taken when no static tag is configured
pub const TAG_FIELD: &str = "tag";

/// The record field that always carries the entry's severity
pub const LEVEL_FIELD: &str = "level";

/// The record field that carries the entry's message, unless configured otherwise
pub const DEFAULT_MESSAGE_FIELD: &str = "message";

/// Rewrites the value of one field.
///
/// Filters see every [`Value`] variant; one that doesn't apply should hand its input back
/// unchanged.
pub type Filter = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// Gets the last word on a record before it's tagged. May add, replace or remove any field
/// (including the tag & level fields).
pub type Customizer = Box<dyn Fn(&Entry, &mut Record) + Send + Sync>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       struct Transformer                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The rule set that maps an [`Entry`] to a tag & a [`Record`].
pub struct Transformer {
    levels: Levels,
    tag: Option<String>,
    message_field: String,
    ignore_fields: HashSet<String>,
    filters: HashMap<String, Filter>,
    customizers: Vec<Customizer>,
}

impl Transformer {
    pub fn levels(&self) -> Levels {
        self.levels
    }
    /// The static tag, if one was configured
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
    pub fn message_field(&self) -> &str {
        &self.message_field
    }
    /// True if entries of this severity are to be forwarded
    pub fn is_enabled(&self, severity: Severity) -> bool {
        self.levels.contains(severity)
    }
    /// Build the outbound tag & record for `entry`.
    ///
    /// In order:
    ///
    /// 1. copy the entry's fields, dropping ignored fields & running filters on the rest (the
    ///    message field's filter excepted)
    /// 2. set "level" to the entry's severity, whatever the fields said
    /// 3. set the message field from the entry's message, unless a field by that name was
    ///    copied in step 1; a filter on the message field applies only to the derived message
    /// 4. run the customizers, in the order in which they were added
    /// 5. resolve the tag (see [`Transformer::resolve_tag`])
    ///
    /// Panics raised by a customizer are not caught.
    pub fn transform(&self, entry: &Entry) -> (String, Record) {
        let mut record = Record::new();
        for (name, value) in &entry.fields {
            if self.ignore_fields.contains(name) {
                continue;
            }
            // The message filter is reserved for the derived message.
            let value = match self.filters.get(name) {
                Some(filter) if *name != self.message_field => filter(value.clone()),
                _ => value.clone(),
            };
            record.insert(name.clone(), value);
        }

        record.insert(
            LEVEL_FIELD.to_string(),
            Value::from(entry.severity.as_str()),
        );

        if !record.contains_key(&self.message_field) {
            let message = Value::from(entry.message.as_str());
            let message = match self.filters.get(&self.message_field) {
                Some(filter) => filter(message),
                None => message,
            };
            record.insert(self.message_field.clone(), message);
        }

        for customizer in &self.customizers {
            customizer(entry, &mut record);
        }

        let tag = self.resolve_tag(entry, &mut record);
        (tag, record)
    }
    /// Work out the tag for `record`:
    ///
    /// 1. a static tag, if configured, wins & the record is left alone
    /// 2. else a string-valued "tag" field is used, and removed from the record
    /// 3. else the entry's message is used; a non-string "tag" field stays put
    pub fn resolve_tag(&self, entry: &Entry, record: &mut Record) -> String {
        if let Some(tag) = &self.tag {
            return tag.clone();
        }
        match record.remove(TAG_FIELD) {
            Some(Value::Str(tag)) => tag,
            Some(other) => {
                record.insert(TAG_FIELD.to_string(), other);
                entry.message.clone()
            }
            None => entry.message.clone(),
        }
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut filters: Vec<&String> = self.filters.keys().collect();
        filters.sort();
        f.debug_struct("Transformer")
            .field("levels", &self.levels)
            .field("tag", &self.tag)
            .field("message_field", &self.message_field)
            .field("ignore_fields", &self.ignore_fields)
            .field("filters", &filters)
            .field("customizers", &self.customizers.len())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                       struct HookBuilder                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Assembles the rule set for a [`Hook`]; the finished hook can't be changed.
pub struct HookBuilder {
    rules: Transformer,
}

impl std::default::Default for HookBuilder {
    fn default() -> Self {
        HookBuilder {
            rules: Transformer {
                levels: Levels::default(),
                tag: None,
                message_field: DEFAULT_MESSAGE_FIELD.to_string(),
                ignore_fields: HashSet::new(),
                filters: HashMap::new(),
                customizers: Vec::new(),
            },
        }
    }
}

impl HookBuilder {
    /// Seed a builder with the rules described in `config`.
    pub fn from_config(config: &Config) -> HookBuilder {
        let mut builder = HookBuilder::default()
            .levels(config.levels())
            .message_field(config.message_field.clone());
        if let Some(tag) = &config.tag {
            builder = builder.tag(tag.clone());
        }
        for name in &config.ignore_fields {
            builder = builder.ignore(name.clone());
        }
        builder
    }
    /// Fire on these severities; an empty set restores the defaults.
    pub fn levels(mut self, levels: Levels) -> Self {
        self.rules.levels = if levels.is_empty() {
            Levels::default()
        } else {
            levels
        };
        self
    }
    /// Tag every record with `tag`, regardless of its fields.
    pub fn tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.rules.tag = Some(tag.into());
        self
    }
    /// Store the entry's message under `name` rather than "message".
    pub fn message_field<S: Into<String>>(mut self, name: S) -> Self {
        self.rules.message_field = name.into();
        self
    }
    /// Never forward the field `name`.
    pub fn ignore<S: Into<String>>(mut self, name: S) -> Self {
        self.rules.ignore_fields.insert(name.into());
        self
    }
    /// Pass the value of field `name` through `filter`; replaces any filter already set for it.
    pub fn filter<S, F>(mut self, name: S, filter: F) -> Self
    where
        S: Into<String>,
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.rules.filters.insert(name.into(), Box::new(filter));
        self
    }
    /// Append `customizer` to the list run on every record.
    pub fn customizer<F>(mut self, customizer: F) -> Self
    where
        F: Fn(&Entry, &mut Record) + Send + Sync + 'static,
    {
        self.rules.customizers.push(Box::new(customizer));
        self
    }
    /// Just the rules, with no transport attached.
    pub fn build_transformer(self) -> Transformer {
        self.rules
    }
    /// Connect now, and send every record over that one connection.
    pub fn build_persistent<C: Connector>(self, connector: C) -> Result<Hook<C>> {
        let mode = Mode::persistent(&connector)?;
        Ok(Hook {
            transformer: self.build_transformer(),
            mode,
        })
    }
    /// Connect afresh for every record.
    pub fn build_per_call<C: Connector>(self, connector: C) -> Hook<C> {
        Hook {
            transformer: self.build_transformer(),
            mode: Mode::per_call(connector),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          struct Hook                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Forwards [`Entry`]s to a collector.
pub struct Hook<C: Connector> {
    transformer: Transformer,
    mode: Mode<C>,
}

impl Hook<TcpConnector> {
    /// A hook with default rules holding one TCP connection to `host`:`port`.
    pub fn new<S: Into<String>>(host: S, port: u16) -> Result<Self> {
        HookBuilder::default().build_persistent(TcpConnector::new(host, port))
    }
    /// A hook built from `config`; `disable_connection_pool` selects per-call connections.
    pub fn from_config(config: &Config) -> Result<Self> {
        let builder = HookBuilder::from_config(config);
        if config.disable_connection_pool {
            Ok(builder.build_per_call(config.connector()))
        } else {
            builder.build_persistent(config.connector())
        }
    }
    pub fn builder() -> HookBuilder {
        HookBuilder::default()
    }
}

impl<C: Connector> Hook<C> {
    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }
    pub fn levels(&self) -> Levels {
        self.transformer.levels()
    }
    pub fn tag(&self) -> Option<&str> {
        self.transformer.tag()
    }
    pub fn message_field(&self) -> &str {
        self.transformer.message_field()
    }
    pub fn is_enabled(&self, severity: Severity) -> bool {
        self.transformer.is_enabled(severity)
    }
    pub fn is_persistent(&self) -> bool {
        self.mode.is_persistent()
    }
    /// Forward `entry`, if its severity calls for it.
    ///
    /// Entries below the severity gate are dropped silently. Connection & transport failures are
    /// returned as-is; nothing is retried or buffered.
    pub fn fire(&self, entry: &Entry) -> Result<()> {
        if !self.is_enabled(entry.severity) {
            return Ok(());
        }
        let (tag, record) = self.transformer.transform(entry);
        self.mode.send(&tag, &record)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! An in-memory connector that records what it's asked to do.

    use super::*;

    use crate::{error::Error, transport::Connection};

    use parking_lot::Mutex;

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[derive(Clone, Default)]
    pub struct Recorder {
        pub sent: Arc<Mutex<Vec<(String, Record)>>>,
        pub acquired: Arc<AtomicUsize>,
        pub released: Arc<AtomicUsize>,
        pub fail_acquire: bool,
        pub fail_send: bool,
    }

    impl Recorder {
        pub fn sent(&self) -> Vec<(String, Record)> {
            self.sent.lock().clone()
        }
        pub fn acquired(&self) -> usize {
            self.acquired.load(Ordering::SeqCst)
        }
        pub fn released(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }
    }

    fn refused() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused")
    }

    pub struct RecorderConnection(Recorder);

    impl Connection for RecorderConnection {
        fn send(&mut self, tag: &str, record: &Record) -> Result<()> {
            if self.0.fail_send {
                return Err(Error::transport(refused()));
            }
            self.0.sent.lock().push((tag.to_string(), record.clone()));
            Ok(())
        }
        fn release(self) {
            self.0.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Connector for Recorder {
        type Connection = RecorderConnection;
        fn acquire(&self) -> Result<RecorderConnection> {
            if self.fail_acquire {
                return Err(Error::Connect {
                    addr: "recorder".to_string(),
                    source: refused(),
                    back: backtrace::Backtrace::new(),
                });
            }
            self.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(RecorderConnection(self.clone()))
        }
    }
}
