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

//! The fluentd transport layer.
//!
//! This module defines the [`Connector`] & [`Connection`] traits that all transport mechanisms
//! must support, as well as TCP & Unix socket implementations. A [`Mode`] governs how a
//! [`Hook`](crate::hook::Hook) uses its [`Connector`]: either one long-lived connection shared by
//! every caller, or a fresh connection for each record.
//!
//! # Examples
//!
//! To reach a fluentd listening on its default forward port on localhost:
//!
//! ```rust
//! use tracing_fluent::transport::TcpConnector;
//! let connector = TcpConnector::default();
//! assert_eq!(connector.addr(), "127.0.0.1:24224");
//! ```
//!
//! Connecting to a socket that isn't there will fail:
//!
//! ```rust
//! use tracing_fluent::transport::{Connector, UnixConnector};
//! let connector = UnixConnector::new("/i/am/not/there.s");
//! assert!(connector.acquire().is_err());
//! ```

use crate::{
    error::{Error, Result},
    forward::encode_message,
    value::Record,
};

use backtrace::Backtrace;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use std::{
    io::Write,
    net::{Shutdown, TcpStream, ToSocketAddrs},
    path::{Path, PathBuf},
    time::Duration,
};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// The port on which fluentd's `in_forward` plugin listens by default
pub const DEFAULT_PORT: u16 = 24224;

/// The host to which we'll connect absent other instructions
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// How long to wait for a TCP connection by default
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                     transport abstractions                                     //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An established session with a collector.
pub trait Connection {
    /// Transmit `record` under `tag`.
    fn send(&mut self, tag: &str, record: &Record) -> Result<()>;
    /// Tear the session down. Best-effort: failures are swallowed.
    fn release(self)
    where
        Self: Sized,
    {
    }
}

/// Something that can produce [`Connection`]s.
pub trait Connector {
    type Connection: Connection;
    fn acquire(&self) -> Result<Self::Connection>;
}

/// How a [`Hook`](crate::hook::Hook) obtains its [`Connection`]s; chosen once, at construction.
pub enum Mode<C: Connector> {
    /// One connection, acquired up-front & never released between calls. Concurrent senders
    /// take turns. A transport failure closes it for good; every later send fails.
    Persistent(Mutex<Option<C::Connection>>),
    /// A fresh connection for every record, released right after sending.
    PerCall(C),
}

impl<C: Connector> Mode<C> {
    /// Acquire the long-lived connection now; errors are the caller's to handle.
    pub fn persistent(connector: &C) -> Result<Mode<C>> {
        Ok(Mode::Persistent(Mutex::new(Some(connector.acquire()?))))
    }
    pub fn per_call(connector: C) -> Mode<C> {
        Mode::PerCall(connector)
    }
    pub fn is_persistent(&self) -> bool {
        matches!(self, Mode::Persistent(_))
    }
    /// Send `record` under `tag` according to this mode.
    pub fn send(&self, tag: &str, record: &Record) -> Result<()> {
        match self {
            Mode::Persistent(slot) => {
                let mut slot = slot.lock();
                let conn = slot.as_mut().ok_or_else(|| {
                    Error::transport(std::io::Error::new(
                        std::io::ErrorKind::NotConnected,
                        "the connection was closed after an earlier failure",
                    ))
                })?;
                let rsp = conn.send(tag, record);
                // A failed write may have left a partial frame on the stream; nothing written
                // after it would be framed correctly.
                if let Err(Error::Transport { .. }) = rsp {
                    if let Some(conn) = slot.take() {
                        conn.release();
                    }
                }
                rsp
            }
            Mode::PerCall(connector) => {
                let mut conn = connector.acquire()?;
                let rsp = conn.send(tag, record);
                conn.release();
                rsp
            }
        }
    }
}

fn write_frame<W: Write>(mut writer: W, tag: &str, record: &Record) -> Result<()> {
    let frame = encode_message(tag, Utc::now(), record)?;
    writer.write_all(&frame).map_err(Error::transport)?;
    writer.flush().map_err(Error::transport)
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                              TCP                                               //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Connects to a collector over TCP.
#[derive(Clone, Debug)]
pub struct TcpConnector {
    host: String,
    port: u16,
    connect_timeout: Duration,
    write_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new<S: Into<String>>(host: S, port: u16) -> TcpConnector {
        TcpConnector {
            host: host.into(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: None,
        }
    }
    pub fn with_connect_timeout(mut self, timeout: Duration) -> TcpConnector {
        self.connect_timeout = timeout;
        self
    }
    pub fn with_write_timeout(mut self, timeout: Option<Duration>) -> TcpConnector {
        self.write_timeout = timeout;
        self
    }
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout
    }
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
    fn connect_err(&self, source: std::io::Error) -> Error {
        Error::Connect {
            addr: self.addr(),
            source,
            back: Backtrace::new(),
        }
    }
}

impl std::default::Default for TcpConnector {
    /// localhost:24224
    fn default() -> Self {
        TcpConnector::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl Connector for TcpConnector {
    type Connection = TcpConnection;
    fn acquire(&self) -> Result<TcpConnection> {
        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|err| self.connect_err(err))?;
        // Try each resolved address in turn, keeping the last failure for our caller.
        let mut last_err = std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no addresses to connect to",
        );
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_write_timeout(self.write_timeout)
                        .map_err(|err| self.connect_err(err))?;
                    debug!("connected to fluentd at {}", addr);
                    return Ok(TcpConnection { stream });
                }
                Err(err) => last_err = err,
            }
        }
        Err(self.connect_err(last_err))
    }
}

/// A TCP session with a collector.
pub struct TcpConnection {
    stream: TcpStream,
}

impl Connection for TcpConnection {
    fn send(&mut self, tag: &str, record: &Record) -> Result<()> {
        write_frame(&mut self.stream, tag, record)
    }
    fn release(self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          Unix sockets                                          //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Connects to a collector over a Unix domain (stream) socket.
#[derive(Clone, Debug)]
pub struct UnixConnector {
    path: PathBuf,
}

impl UnixConnector {
    pub fn new<P: AsRef<Path>>(path: P) -> UnixConnector {
        UnixConnector {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[cfg(unix)]
impl Connector for UnixConnector {
    type Connection = UnixConnection;
    fn acquire(&self) -> Result<UnixConnection> {
        let stream = UnixStream::connect(&self.path).map_err(|err| Error::Connect {
            addr: self.path.display().to_string(),
            source: err,
            back: Backtrace::new(),
        })?;
        debug!("connected to fluentd at {}", self.path.display());
        Ok(UnixConnection { stream })
    }
}

/// A Unix socket session with a collector.
#[cfg(unix)]
pub struct UnixConnection {
    stream: UnixStream,
}

#[cfg(unix)]
impl Connection for UnixConnection {
    fn send(&mut self, tag: &str, record: &Record) -> Result<()> {
        write_frame(&mut self.stream, tag, record)
    }
    fn release(self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A fake collector, good for as many connections as the test cares to make.

    use std::{
        io::Read,
        net::{SocketAddr, TcpListener},
        sync::mpsc,
        thread,
    };

    /// Accept `n` connections, reading each to EOF & reporting its bytes on the returned channel.
    pub fn spawn_collector(n: usize) -> (SocketAddr, mpsc::Receiver<Vec<u8>>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
        let addr = listener.local_addr().expect("listener has address");
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for _ in 0..n {
                let (mut stream, _) = listener.accept().expect("accept connection");
                let tx = tx.clone();
                thread::spawn(move || {
                    let mut buf = Vec::new();
                    stream.read_to_end(&mut buf).expect("read to EOF");
                    let _ = tx.send(buf);
                });
            }
        });
        (addr, rx)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::{forward::testing::decode_all, value::Value};

    use std::time::Duration as StdDuration;

    fn record(n: i64) -> Record {
        let mut r = Record::new();
        r.insert("n".to_string(), Value::from(n));
        r
    }

    #[test]
    fn tcp_round_trip() {
        let (addr, rx) = testing::spawn_collector(1);
        let connector = TcpConnector::new(addr.ip().to_string(), addr.port())
            .with_write_timeout(Some(StdDuration::from_secs(2)));
        let mut conn = connector.acquire().unwrap();
        conn.send("a.b", &record(1)).unwrap();
        conn.send("a.c", &record(2)).unwrap();
        conn.release();

        let buf = rx.recv_timeout(StdDuration::from_secs(5)).unwrap();
        let frames = decode_all(&buf);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].tag, "a.b");
        assert_eq!(frames[0].record["n"], serde_json::json!(1));
        assert_eq!(frames[1].tag, "a.c");
        assert_eq!(frames[1].record["n"], serde_json::json!(2));
    }

    #[test]
    fn per_call_mode_connects_each_time() {
        let (addr, rx) = testing::spawn_collector(3);
        let mode = Mode::per_call(TcpConnector::new(addr.ip().to_string(), addr.port()));
        assert!(!mode.is_persistent());
        for i in 0..3 {
            mode.send("t", &record(i)).unwrap();
        }
        let mut seen: Vec<i64> = (0..3)
            .map(|_| {
                let buf = rx.recv_timeout(StdDuration::from_secs(5)).unwrap();
                let frames = decode_all(&buf);
                assert_eq!(frames.len(), 1);
                frames[0].record["n"].as_i64().unwrap()
            })
            .collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn persistent_mode_shares_one_connection() {
        let (addr, rx) = testing::spawn_collector(1);
        let mode = Mode::persistent(&TcpConnector::new(addr.ip().to_string(), addr.port())).unwrap();
        assert!(mode.is_persistent());
        for i in 0..4 {
            mode.send("t", &record(i)).unwrap();
        }
        drop(mode);
        let buf = rx.recv_timeout(StdDuration::from_secs(5)).unwrap();
        assert_eq!(decode_all(&buf).len(), 4);
    }

    #[test]
    fn refused() {
        // Grab an ephemeral port, then let it go so that nothing is listening there.
        let port = {
            let l = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
            l.local_addr().unwrap().port()
        };
        let connector = TcpConnector::new("127.0.0.1", port)
            .with_connect_timeout(StdDuration::from_millis(250));
        match connector.acquire() {
            Err(Error::Connect { addr, .. }) => assert_eq!(addr, format!("127.0.0.1:{}", port)),
            Err(err) => panic!("unexpected error {}", err),
            Ok(_) => panic!("connected to nothing"),
        }
        let mode = Mode::per_call(connector);
        assert!(mode.send("t", &record(0)).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn unix_round_trip() {
        use std::{io::Read, os::unix::net::UnixListener};

        let dir = std::env::temp_dir().join(format!("tracing-fluent-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fluentd.sock");
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).unwrap();
            buf
        });

        let mut conn = UnixConnector::new(&path).acquire().unwrap();
        conn.send("unix.test", &record(7)).unwrap();
        conn.release();

        let frames = decode_all(&server.join().unwrap());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].tag, "unix.test");
        assert_eq!(frames[0].record["n"], serde_json::json!(7));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
