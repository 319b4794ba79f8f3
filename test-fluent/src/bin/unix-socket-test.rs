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

//! Test writing to a fluentd `in_unix` socket; pass the socket path as the sole argument.

use tracing::{debug, error, info, trace, warn};
use tracing_fluent::{hook::Hook, layer::FluentLayer, transport::UnixConnector};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/var/run/fluentd/fluentd.sock".to_string());
    // A fresh connection for every event
    let hook = Hook::builder().build_per_call(UnixConnector::new(path));
    let subscriber = Registry::default().with(FluentLayer::new(hook));
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!(tag = "test.unix", "你好, Unix domain socket.");
    debug!(tag = "test.unix", "你好, Unix domain socket.");
    info!(tag = "test.unix", "你好, Unix domain socket.");
    warn!(tag = "test.unix", "你好, Unix domain socket.");
    error!(tag = "test.unix", "你好, Unix domain socket.");
}
