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

//! A [`tracing-subscriber`] [`Layer`] implementation for sending [`tracing`] [`Event`]s to a
//! [fluentd] (or [fluent-bit]) daemon
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//! [`tracing`]: https://docs.rs/tracing/0.1.35/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
//! [fluentd]: https://www.fluentd.org
//! [fluent-bit]: https://fluentbit.io
//!
//! # Introduction
//!
//! fluentd thinks in terms of _records_ (maps from field name to value) each carrying a _tag_
//! that the daemon uses to route it. [`tracing`] events are already structured: a level, a
//! message, and any number of named fields. This crate provides the glue: a [`Layer`] that
//! turns each event into a record, works out its tag, and ships the pair to the daemon over
//! the [Forward] protocol.
//!
//! [Forward]: https://github.com/fluent/fluentd/wiki/Forward-Protocol-Specification-v1
//!
//! The rules for that translation are configurable: which severities to forward, fields to drop,
//! per-field filters, arbitrary "customizers" that get the last word on each record, and a static
//! tag to override whatever the event says. See [`hook`] for the details, and [`_docs`] for an
//! overview.
//!
//! # Usage
//!
//! The defaults forward everything at `INFO` or above to a daemon listening on localhost:24224,
//! taking the tag from a `tag` field on the event (or, failing that, from the message):
//!
//! ```no_run
//! use tracing::info;
//! use tracing_fluent::layer::FluentLayer;
//! use tracing_subscriber::registry::Registry;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! let subscriber = Registry::default().with(FluentLayer::try_default().unwrap());
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! info!(tag = "app.access", path = "/index.html", status = 200, "served");
//! ```
//!
//! will deliver a record like `{"path": "/index.html", "status": 200, "level": "info",
//! "message": "served"}` under the tag "app.access".
//!
//! That said, the rules & the transport are configurable:
//!
//! ```no_run
//! use tracing::info;
//! use tracing_fluent::{hook::Hook, layer::FluentLayer, transport::TcpConnector, value::Value};
//! use tracing_subscriber::registry::Registry;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! let hook = Hook::builder()
//!     .tag("myapp.log")
//!     .ignore("password")
//!     .filter("email", |_| Value::from("<redacted>"))
//!     .customizer(|_, record| {
//!         record.insert("service".to_string(), Value::from("myapp"));
//!     })
//!     .build_per_call(TcpConnector::new("fluentd.internal", 24224));
//! let subscriber = Registry::default().with(FluentLayer::new(hook));
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! info!(email = "someone@example.com", "signed up");
//! ```

pub mod _docs;
pub mod config;
pub mod entry;
pub mod error;
pub mod forward;
pub mod hook;
pub mod layer;
pub mod level;
pub mod transport;
pub mod value;
