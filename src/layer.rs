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

//! [tracing-fluent](crate) [`Layer`] implementation.
//!
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! [`FluentLayer`] is a thin adapter: it turns each [`Event`] into an [`Entry`] and hands it to
//! its [`Hook`]. All the interesting decisions live there.

use crate::{
    config::Config,
    entry::Entry,
    error::Result,
    hook::Hook,
    transport::{Connector, TcpConnector},
};

use tracing::Event;
use tracing_subscriber::layer::Context;

/// A [`tracing-subscriber`]-compliant [`Layer`] implementation that will send [`Event`]s to a
/// fluentd (or fluent-bit) daemon.
///
/// [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
pub struct FluentLayer<C: Connector> {
    hook: Hook<C>,
}

impl FluentLayer<TcpConnector> {
    /// Attempt to construct a [`FluentLayer`] holding one TCP connection to port 24224 on
    /// localhost, with default rules
    pub fn try_default() -> Result<Self> {
        Ok(FluentLayer {
            hook: Hook::new(crate::transport::DEFAULT_HOST, crate::transport::DEFAULT_PORT)?,
        })
    }
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(FluentLayer {
            hook: Hook::from_config(config)?,
        })
    }
}

impl<C: Connector> FluentLayer<C> {
    pub fn new(hook: Hook<C>) -> Self {
        FluentLayer { hook }
    }
    pub fn hook(&self) -> &Hook<C> {
        &self.hook
    }
}

// This crate's own diagnostics are never forwarded; a failing send would otherwise report itself
// to the collector it just failed to reach.
fn is_own(event: &Event<'_>) -> bool {
    let target = event.metadata().target();
    target == env!("CARGO_CRATE_NAME")
        || target
            .strip_prefix(env!("CARGO_CRATE_NAME"))
            .is_some_and(|rest| rest.starts_with("::"))
}

impl<S, C> tracing_subscriber::layer::Layer<S> for FluentLayer<C>
where
    S: tracing::Subscriber,
    C: Connector + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if is_own(event) {
            return;
        }
        let entry = Entry::from_event(event);
        self.hook.fire(&entry).unwrap_or_else(|err| {
            ::tracing::error!("failed to forward an event to fluentd: {}", err);
        })
    }
}

#[cfg(test)]
mod smoke {

    use super::*;

    use crate::{
        hook::{testing::Recorder, HookBuilder},
        level::Severity,
        value::Value,
    };

    use tracing::{debug, error, info, trace, warn};
    use tracing_subscriber::{
        layer::SubscriberExt, // Needed to get `with()`
        registry::Registry,
    };

    fn layer_with(builder: HookBuilder) -> (FluentLayer<Recorder>, Recorder) {
        let rec = Recorder::default();
        (FluentLayer::new(builder.build_per_call(rec.clone())), rec)
    }

    #[test]
    fn forwards_events() {
        let (layer, rec) = layer_with(HookBuilder::default());
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            trace!(target: "app", "not forwarded");
            debug!(target: "app", "nor this");
            info!(target: "app", user = 42, "Hello, 世界!");
            warn!(target: "app", tag = "svc.warnings", "careful");
            error!(target: "app", tag = "svc.errors", user = 42, "boom");
        });

        let sent = rec.sent();
        assert_eq!(sent.len(), 3);

        assert_eq!(sent[0].0, "Hello, 世界!");
        assert_eq!(sent[0].1["user"], Value::from(42i64));
        assert_eq!(sent[0].1["level"], Value::from("info"));

        assert_eq!(sent[1].0, "svc.warnings");
        assert_eq!(sent[1].1["level"], Value::from("warning"));

        assert_eq!(sent[2].0, "svc.errors");
        assert_eq!(sent[2].1.len(), 3);
        assert_eq!(sent[2].1["message"], Value::from("boom"));
        assert_eq!(sent[2].1["level"], Value::from("error"));
    }

    #[test]
    fn severity_override_reaches_the_gate() {
        let (layer, rec) = layer_with(
            HookBuilder::default().levels([Severity::Fatal].into_iter().collect()),
        );
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            error!(target: "app", "just an error");
            error!(target: "app", severity = "fatal", "the end");
        });
        let sent = rec.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "the end");
        assert_eq!(sent[0].1["level"], Value::from("fatal"));
    }

    #[test]
    fn own_events_are_not_forwarded() {
        let (layer, rec) = layer_with(HookBuilder::default());
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            error!(target: "tracing_fluent::transport", "internal");
            error!(target: "tracing_fluent", "internal");
            error!(target: "tracing_fluently", "someone else's");
        });
        let sent = rec.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "someone else's");
    }

    #[test]
    fn failures_do_not_propagate() {
        let rec = Recorder {
            fail_send: true,
            ..Default::default()
        };
        let layer = FluentLayer::new(HookBuilder::default().build_per_call(rec.clone()));
        assert!(!layer.hook().is_persistent());
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            error!(target: "app", "into the void");
        });
        assert!(rec.sent().is_empty());
        assert_eq!(rec.released(), 1);
    }

    #[test]
    fn over_tcp() {
        let (addr, rx) = crate::transport::testing::spawn_collector(1);
        let layer = FluentLayer::new(
            HookBuilder::default()
                .tag("app.test")
                .build_persistent(TcpConnector::new(addr.ip().to_string(), addr.port()))
                .unwrap(),
        );
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            info!(target: "app", n = 1, "first");
            info!(target: "app", n = 2, "second");
        });
        // Dropping the subscriber closes the connection
        let buf = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        let frames = crate::forward::testing::decode_all(&buf);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.tag == "app.test"));
        assert_eq!(frames[0].record["message"], serde_json::json!("first"));
        assert_eq!(frames[1].record["n"], serde_json::json!(2));
    }

    #[test]
    #[cfg(feature = "fluentd")]
    fn test_tracing_via_tcp() {
        // Setup the real subscriber...
        let subscriber = Registry::default().with(FluentLayer::try_default().unwrap());
        // and install it.
        let _guard = tracing::subscriber::set_default(subscriber);

        trace!(target: "app", "Hello, 世界!");
        debug!(target: "app", "Hello, 世界!");
        info!(target: "app", tag = "tracing.fluent", "Hello, 世界!");
        warn!(target: "app", tag = "tracing.fluent", "Hello, 世界!");
        error!(target: "app", tag = "tracing.fluent", "Hello, 世界!");
    }
}
