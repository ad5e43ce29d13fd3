//! Unified error type.

use std::fmt;
use std::net::SocketAddr;

/// The error type returned by ashiba's fallible operations.
///
/// Application-level errors (404, 405, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. The only failure
/// this type surfaces is the startup one: the listener could not bind.
#[derive(Debug)]
pub enum Error {
    /// Binding the listen socket failed — port in use, permission denied,
    /// or an unroutable host.
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
        }
    }
}
