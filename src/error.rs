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

//! [tracing-fluent](crate) errors

use backtrace::Backtrace;

/// [tracing-fluent](crate) error type
///
/// Like its syslog forebear, [tracing-fluent](crate) eschews libraries like [thiserror] &
/// [anyhow] in favor of a straightforward enumeration with a few match arms chosen on the basis of
/// what the caller will need to respond.
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
#[non_exhaustive]
pub enum Error {
    /// Failed to establish a connection to the collector
    Connect {
        addr: String,
        source: std::io::Error,
        back: Backtrace,
    },
    /// Failed to write a frame to an established connection
    Transport {
        source: std::io::Error,
        back: Backtrace,
    },
    /// Failed to MessagePack-encode a record
    Encode {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// Failed to parse or convert configuration
    Config {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// A string did not name a known severity
    BadSeverity { text: String, back: Backtrace },
}

impl Error {
    pub(crate) fn encode<E>(err: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Encode {
            source: Box::new(err),
            back: Backtrace::new(),
        }
    }
    pub(crate) fn transport(err: std::io::Error) -> Error {
        Error::Transport {
            source: err,
            back: Backtrace::new(),
        }
    }
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Connect { addr, source, .. } => {
                write!(f, "Failed to connect to the collector at {}: {}", addr, source)
            }
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            Error::Encode { source, .. } => write!(f, "While encoding a record, got {}", source),
            Error::Config { source, .. } => write!(f, "Bad configuration: {}", source),
            Error::BadSeverity { text, .. } => write!(f, "'{}' is not a known severity", text),
            _ => write!(f, "Other tracing-fluent error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Connect { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::Transport { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::Encode { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::Config { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::BadSeverity { back, .. } => write!(f, "{}\n{:?}", self, back),
            err => write!(f, "tracing-fluent error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    #[allow(unreachable_patterns)]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connect { source, .. } => Some(source),
            Error::Transport { source, .. } => Some(source),
            Error::Encode { source, .. } => Some(source.as_ref()),
            Error::Config { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
