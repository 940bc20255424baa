//! Session bootstrap and lifecycle.
//!
//! A [`Session`] is one authenticated, version-negotiated logical connection
//! to a single node. Opening it runs a fixed handshake over a fresh stream;
//! afterwards all statement traffic flows through [`Cursor`]s bound to the
//! session.
//!
//! # Overview
//!
//! The handshake has four steps, in order:
//!
//! 1. authenticate, only when both a user and a password were supplied;
//! 2. ask the node for its RPC version string and record it;
//! 3. request a protocol version switch when the caller named one;
//! 4. select the working keyspace, unless the caller passed an empty name.
//!
//! Any failure along the way abandons the stream and returns the error, so a
//! half-bootstrapped session never escapes.
//!
//! Sessions are strictly synchronous. A [`Cursor`] borrows its session
//! exclusively, which keeps one statement in flight per connection at a time.
use std::fmt;
use std::io::{Read, Write};
use std::net::TcpStream;

use log::{debug, trace};

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::marshal;
use crate::protocol::{RpcClient, TransportError};

/// RPC port a node listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 9160;
/// Keyspace selected when the caller does not name one.
pub const DEFAULT_KEYSPACE: &str = "system";
/// Protocol major version assumed until negotiation says otherwise.
pub const DEFAULT_CQL_MAJOR: u32 = 2;

/// Bootstrap configuration for [`connect`] and [`Session::open`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub port: u16,
    /// Keyspace to select after the handshake; empty skips selection.
    pub keyspace: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Exact protocol version string to request from the node, if any.
    pub cql_version: Option<String>,
    /// Major version in effect when none is negotiated.
    pub cql_major: u32,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            keyspace: DEFAULT_KEYSPACE.to_string(),
            user: None,
            password: None,
            cql_version: None,
            cql_major: DEFAULT_CQL_MAJOR,
        }
    }
}

/// Version string reported by the remote RPC layer, with its dotted
/// components parsed when all of them are numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteVersion {
    raw: String,
    parts: Option<Vec<u32>>,
}

impl RemoteVersion {
    fn parse(raw: String) -> Self {
        let parts = raw
            .split('.')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<u32>>>();
        Self { raw, parts }
    }

    /// The string exactly as the node reported it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Dotted components, when every one of them parsed as a number.
    pub fn parts(&self) -> Option<&[u32]> {
        self.parts.as_deref()
    }
}

/// Opens a session against `host` over TCP.
pub fn connect(host: &str, opts: ConnectOptions) -> Result<Session<TcpStream>> {
    debug!("connecting to {host}:{}", opts.port);
    let stream = TcpStream::connect((host, opts.port)).map_err(TransportError::Io)?;
    Session::open(stream, host, opts)
}

/// An authenticated, version-negotiated logical connection to one node.
pub struct Session<T: Read + Write> {
    host: String,
    port: u16,
    keyspace: String,
    cql_major: u32,
    remote_version: RemoteVersion,
    client: Option<RpcClient<T>>,
}

impl<T: Read + Write> Session<T> {
    /// Runs the bootstrap handshake over an established byte stream.
    ///
    /// On any handshake failure the stream is dropped and the error comes
    /// back; there is no half-open state to clean up.
    pub fn open(stream: T, host: &str, opts: ConnectOptions) -> Result<Self> {
        let mut client = RpcClient::new(stream);

        if let (Some(user), Some(password)) = (&opts.user, &opts.password) {
            debug!("authenticating as '{user}'");
            client.login(user, password)?;
        }

        let remote_version = RemoteVersion::parse(client.describe_version()?);
        trace!("remote rpc version {}", remote_version.raw());

        let mut cql_major = opts.cql_major;
        if let Some(version) = &opts.cql_version {
            client.set_cql_version(version)?;
            // A non-numeric leading token leaves the configured major in
            // effect rather than failing the handshake.
            if let Some(major) = version.split('.').next().and_then(|t| t.parse().ok()) {
                cql_major = major;
            }
        }

        let mut session = Self {
            host: host.to_string(),
            port: opts.port,
            keyspace: opts.keyspace,
            cql_major,
            remote_version,
            client: Some(client),
        };

        if !session.keyspace.is_empty() {
            let statement = format!("USE {};", marshal::quote_str(&session.keyspace));
            let mut cursor = session.cursor()?;
            cursor.execute(&statement)?;
            cursor.close();
        }

        debug!("session {session} open");
        Ok(session)
    }

    /// Creates a cursor bound to this session.
    pub fn cursor(&mut self) -> Result<Cursor<'_, T>> {
        if self.client.is_none() {
            return Err(Error::Programming("session has been closed".to_string()));
        }
        Ok(Cursor::new(self))
    }

    /// Releases the transport. Closing an already-closed session is a no-op.
    pub fn close(&mut self) {
        if self.client.take().is_some() {
            debug!("session to {}:{} closed", self.host, self.port);
        }
    }

    /// Statements take effect as they execute; there is nothing to commit.
    pub fn commit(&mut self) {}

    /// The backing store cannot undo executed statements.
    pub fn rollback(&mut self) -> Result<()> {
        Err(Error::NotSupported(
            "rollback functionality not present".to_string(),
        ))
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Protocol major version in effect for this session.
    pub fn cql_major(&self) -> u32 {
        self.cql_major
    }

    /// Version string the remote RPC layer reported during bootstrap.
    pub fn remote_version(&self) -> &RemoteVersion {
        &self.remote_version
    }

    pub(crate) fn client_mut(&mut self) -> Result<&mut RpcClient<T>> {
        self.client
            .as_mut()
            .ok_or_else(|| Error::Programming("session has been closed".to_string()))
    }
}

impl<T: Read + Write> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("keyspace", &self.keyspace)
            .field("cql_major", &self.cql_major)
            .field("remote_version", &self.remote_version)
            .finish_non_exhaustive()
    }
}

impl<T: Read + Write> fmt::Display for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{host: '{}:{}', keyspace: '{}'}}",
            self.host, self.port, self.keyspace
        )
    }
}
