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

//! Fluent [Forward] protocol framing
//!
//! [Forward]: https://github.com/fluent/fluentd/wiki/Forward-Protocol-Specification-v1
//!
//! Only "Message Mode" is spoken: each record travels alone in a three-element MessagePack array:
//!
//! ```text
//! [tag, time, record]
//! ```
//!
//! `time` is sent as an `EventTime`, MessagePack extension type zero, whose eight-byte payload is
//! the big-endian seconds since the epoch followed by the big-endian nanoseconds.

use crate::{
    error::{Error, Result},
    value::Record,
};

use bytes::{BufMut, Bytes, BytesMut};
use chrono::prelude::*;

use std::io::Write;

/// MessagePack extension type code for `EventTime`
pub const EVENT_TIME_EXT: i8 = 0;

/// Encode `record` as a Message Mode frame tagged with `tag` & stamped with `time`.
pub fn encode_message(tag: &str, time: DateTime<Utc>, record: &Record) -> Result<Bytes> {
    let secs = u32::try_from(time.timestamp()).map_err(Error::encode)?;
    let nanos = time.timestamp_subsec_nanos();

    let mut w = BytesMut::with_capacity(128).writer();
    rmp::encode::write_array_len(&mut w, 3).map_err(Error::encode)?;
    rmp::encode::write_str(&mut w, tag).map_err(Error::encode)?;
    rmp::encode::write_ext_meta(&mut w, 8, EVENT_TIME_EXT).map_err(Error::encode)?;
    w.write_all(&secs.to_be_bytes()).map_err(Error::encode)?;
    w.write_all(&nanos.to_be_bytes()).map_err(Error::encode)?;
    rmp_serde::encode::write(&mut w, record).map_err(Error::encode)?;
    Ok(w.into_inner().freeze())
}
