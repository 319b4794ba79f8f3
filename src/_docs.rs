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

//! # General tracing-fluent Documentation
//!
//! ## Introduction
//!
//! General (i.e. not documenting a particular struct or a method) documentation goes here.
//!
//! ## From tracing Events to fluentd Records
//!
//! The translation from tracing [Event]s to fluentd records happens in four steps:
//!
//! [Event]: tracing::Event
//!
//! 1. gathering the [Event]'s level, message & fields into an [Entry]
//! 2. deciding whether the [Entry] is to be forwarded at all
//! 3. transforming the [Entry] into a tag & a [Record]
//! 4. transporting the tagged [Record] to your daemon
//!
//! [Entry]: crate::entry::Entry
//! [Record]: crate::value::Record
//!
//! ### Gathering an Entry
//!
//! [Entry::from_event] visits each field of the [Event]. The "message" field becomes the entry's
//! message; the rest keep their names & (where [tracing] preserves them) their types. A field named
//! "severity" naming one of the [Severity] levels overrides the level from the event's metadata,
//! which is how an event can be logged at `Panic` or `Fatal`.
//!
//! [Entry::from_event]: crate::entry::Entry::from_event
//! [Severity]: crate::level::Severity
//!
//! ### The Severity Gate
//!
//! A [Hook] forwards only entries whose severity is in its configured set; by default, that's
//! everything from `Info` on up. Entries outside the set are dropped silently.
//!
//! [Hook]: crate::hook::Hook
//!
//! ### Transformation
//!
//! [Transformer::transform] applies the rules, in this order:
//!
//! 1. Fields are copied to a fresh [Record]. Ignored fields are skipped (even when they have a
//!    filter); fields with a filter are copied as `filter(value)`.
//! 2. "level" is set to the entry's severity. A field of that name in the entry is overwritten.
//! 3. If the record has no message field (by default, "message"), the entry's message is stored
//!    there, filtered if a filter is registered for that field name. A message field supplied
//!    explicitly on the entry is left exactly as copied in step 1; the message filter doesn't
//!    touch it.
//! 4. Customizers run, in the order they were added. Each sees the changes of those before it.
//! 5. The tag is resolved. A static tag wins outright, and the record is left alone. Otherwise a
//!    string-valued "tag" field supplies the tag and is removed from the record. Failing that, the
//!    entry's message is the tag (and a non-string "tag" field stays in the record).
//!
//! [Transformer::transform]: crate::hook::Transformer::transform
//!
//! ### Sending the Record
//!
//! The tagged record is encoded as a Forward protocol "Message Mode" frame ([forward]) and
//! written to a [Connection]. A [Hook] either holds one connection for its lifetime (serializing
//! concurrent senders) or opens a new one for every record. Failures are reported to the caller
//! and not retried.
//!
//! [forward]: crate::forward
//! [Connection]: crate::transport::Connection
//!
//! ## How This Process Plugs-In to the Tracing Framework
//!
//! [FluentLayer] implements [tracing_subscriber::layer::Layer], so it can be "stacked" on top of
//! other layers in your tracing [Subscriber]. Since a layer has no way to report failure to the
//! code that logged the event, [FluentLayer] reports send failures as tracing events of its own.
//! It then ignores those events (and all others originating in this crate) so that they don't
//! loop back to the daemon.
//!
//! [FluentLayer]: crate::layer::FluentLayer
//! [Subscriber]: tracing::Subscriber
