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

//! Severity definitions.
//!
//! [`Severity`] is a superset of [`tracing::Level`]: besides the five levels [`tracing`] knows
//! about, it carries `Panic` & `Fatal`, which log collectors built around other logging
//! ecosystems expect to see. [`Levels`] is the set of severities on which a
//! [`Hook`](crate::hook::Hook) will fire.

use crate::error::{Error, Result};

use backtrace::Backtrace;
use serde::Deserialize;

type StdResult<T, E> = std::result::Result<T, E>;

/// Entry severity, ordered from most to least severe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Severity {
    /// the process is about to unwind
    Panic,
    /// the process is about to exit
    Fatal,
    /// error conditions
    Error,
    /// warning conditions
    Warn,
    /// informational message
    Info,
    /// debug-level message
    Debug,
    /// very verbose, diagnostic message
    Trace,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 7] = [
        Severity::Panic,
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
        Severity::Trace,
    ];

    /// The canonical string form, which is what lands in the outbound record's "level" field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Panic => "panic",
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warn => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
            Severity::Trace => "trace",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = Error;
    /// Accepts the canonical forms along with "warn", ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "panic" => Ok(Severity::Panic),
            "fatal" => Ok(Severity::Fatal),
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            "trace" => Ok(Severity::Trace),
            _ => Err(Error::BadSeverity {
                text: s.to_string(),
                back: Backtrace::new(),
            }),
        }
    }
}

impl std::convert::TryFrom<String> for Severity {
    type Error = Error;
    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl std::convert::From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::TRACE => Severity::Trace,
        }
    }
}

/// A set of [`Severity`] values.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Levels(u8);

impl Levels {
    /// The empty set
    pub const fn none() -> Levels {
        Levels(0)
    }
    /// Every severity
    pub fn all() -> Levels {
        Severity::ALL.into_iter().collect()
    }
    /// `severity` and everything more severe than it
    pub fn at_least(severity: Severity) -> Levels {
        Severity::ALL
            .into_iter()
            .filter(|s| *s <= severity)
            .collect()
    }
    pub fn insert(&mut self, severity: Severity) {
        self.0 |= severity.bit();
    }
    pub fn remove(&mut self, severity: Severity) {
        self.0 &= !severity.bit();
    }
    pub fn contains(&self, severity: Severity) -> bool {
        self.0 & severity.bit() != 0
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    /// Iterate over the members of this set, most severe first.
    pub fn iter(&self) -> impl Iterator<Item = Severity> + '_ {
        Severity::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl std::default::Default for Levels {
    /// Everything from `Info` on up; `Debug` & `Trace` are not forwarded by default.
    fn default() -> Self {
        Levels::at_least(Severity::Info)
    }
}

impl std::iter::FromIterator<Severity> for Levels {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        let mut levels = Levels::none();
        for s in iter {
            levels.insert(s);
        }
        levels
    }
}

impl std::fmt::Debug for Levels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod severity_tests {
    use super::*;

    #[test]
    fn test_strings() {
        assert_eq!(Severity::Error.as_str(), "error");
        assert_eq!(format!("{}", Severity::Warn), "warning");
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!("Panic".parse::<Severity>().unwrap(), Severity::Panic);
        assert!("loud".parse::<Severity>().is_err());
        for s in Severity::ALL {
            assert_eq!(s.as_str().parse::<Severity>().unwrap(), s);
        }
    }

    #[test]
    fn test_tracing_mapping() {
        assert_eq!(Severity::from(&tracing::Level::ERROR), Severity::Error);
        assert_eq!(Severity::from(&tracing::Level::WARN), Severity::Warn);
        assert_eq!(Severity::from(&tracing::Level::TRACE), Severity::Trace);
    }

    #[test]
    fn test_default_levels() {
        let levels = Levels::default();
        assert!(levels.contains(Severity::Panic));
        assert!(levels.contains(Severity::Fatal));
        assert!(levels.contains(Severity::Error));
        assert!(levels.contains(Severity::Warn));
        assert!(levels.contains(Severity::Info));
        assert!(!levels.contains(Severity::Debug));
        assert!(!levels.contains(Severity::Trace));
        assert_eq!(levels.iter().count(), 5);
    }

    #[test]
    fn test_set_ops() {
        let mut levels: Levels = [Severity::Error, Severity::Debug].into_iter().collect();
        assert!(levels.contains(Severity::Debug));
        levels.remove(Severity::Debug);
        assert!(!levels.contains(Severity::Debug));
        assert!(!levels.is_empty());
        assert!(Levels::none().is_empty());
        assert_eq!(Levels::all().iter().count(), 7);
        assert_eq!(format!("{:?}", levels), "{Error}");
    }
}
