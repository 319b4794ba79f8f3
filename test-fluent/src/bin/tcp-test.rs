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

//! Test writing to a fluentd listening on port 24224 on the local host.

use tracing::{debug, error, info, trace, warn};
use tracing_fluent::{hook::Hook, layer::FluentLayer, transport::TcpConnector};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

pub fn main() {
    // Setup the real subscriber...
    let hook = Hook::builder()
        .tag("test.tcp")
        .build_persistent(TcpConnector::default())
        .unwrap();
    let subscriber = Registry::default().with(FluentLayer::new(hook));
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("你好, TCP socket.");
    debug!("你好, TCP socket.");
    info!(attempt = 1, "你好, TCP socket.");
    warn!(attempt = 2, "你好, TCP socket.");
    error!(attempt = 3, severity = "fatal", "你好, TCP socket.");
}
