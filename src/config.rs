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

//! Declarative [`Hook`](crate::hook::Hook) configuration.
//!
//! Everything about a hook that can be written down as data lives in [`Config`], which may be
//! deserialized from any serde format. Filters & customizers are code, and are attached through
//! [`HookBuilder`](crate::hook::HookBuilder).
//!
//! ```rust
//! use tracing_fluent::config::Config;
//!
//! let config = Config::from_json(r#"{"port": 24225, "tag": "app.access", "levels": ["error"]}"#)
//!     .unwrap();
//! assert_eq!(config.host, "127.0.0.1");
//! assert_eq!(config.port, 24225);
//! assert_eq!(config.tag.as_deref(), Some("app.access"));
//! ```

use crate::{
    error::{Error, Result},
    hook::DEFAULT_MESSAGE_FIELD,
    level::{Levels, Severity},
    transport::{TcpConnector, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT},
};

use backtrace::Backtrace;
use serde::Deserialize;

use std::time::Duration;

/// Connection parameters & the static portion of a hook's rule set.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Severities on which to fire; empty means the defaults
    pub levels: Vec<Severity>,
    /// Static tag overriding any tag found in the record
    pub tag: Option<String>,
    pub message_field: String,
    pub ignore_fields: Vec<String>,
    /// Connect for every record rather than holding one connection open
    pub disable_connection_pool: bool,
    /// Zero means the default
    pub connect_timeout_ms: u64,
    /// Zero (like absence) means writes never time out
    pub write_timeout_ms: Option<u64>,
}

impl std::default::Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            levels: Vec::new(),
            tag: None,
            message_field: DEFAULT_MESSAGE_FIELD.to_string(),
            ignore_fields: Vec::new(),
            disable_connection_pool: false,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            write_timeout_ms: None,
        }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Config> {
        serde_json::from_str(text).map_err(|err| Error::Config {
            source: Box::new(err),
            back: Backtrace::new(),
        })
    }
    /// The configured severities, falling back to the defaults when none were given.
    pub fn levels(&self) -> Levels {
        if self.levels.is_empty() {
            Levels::default()
        } else {
            self.levels.iter().copied().collect()
        }
    }
    /// A [`TcpConnector`] for the configured host & port.
    ///
    /// The socket layer rejects zero timeouts, so zero values are mapped as documented on the
    /// fields.
    pub fn connector(&self) -> TcpConnector {
        let connect_timeout = match self.connect_timeout_ms {
            0 => DEFAULT_CONNECT_TIMEOUT,
            ms => Duration::from_millis(ms),
        };
        TcpConnector::new(self.host.clone(), self.port)
            .with_connect_timeout(connect_timeout)
            .with_write_timeout(
                self.write_timeout_ms
                    .filter(|ms| *ms != 0)
                    .map(Duration::from_millis),
            )
    }
}
