//! Server configuration.
//!
//! Everything the bootstrap needs to know before it binds a socket: how
//! verbose to log and which HTTP framing to speak. Routes and hooks are
//! registered on the [`Server`](crate::Server) itself; the address goes to
//! [`listen`](crate::Server::listen).

use std::fmt;

use tracing::level_filters::LevelFilter;

/// Configuration consumed by [`Server::configure`](crate::Server::configure).
///
/// ```rust
/// use ashiba::{LogLevel, ServerConfig, TransportMode};
///
/// let config = ServerConfig {
///     log_level: LogLevel::Debug,
///     transport: TransportMode::Http2,
/// };
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    /// Maximum severity emitted by the process. The library itself only
    /// emits through `tracing`; the binary turns this into a subscriber
    /// filter via [`LogLevel::as_filter`].
    pub log_level: LogLevel,
    /// HTTP framing accepted on inbound connections.
    pub transport: TransportMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            transport: TransportMode::Http1,
        }
    }
}

/// Log severity threshold, lowest to highest.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Silent,
}

impl LogLevel {
    /// The `tracing` filter equivalent.
    ///
    /// `tracing` has no `fatal` level, so `Fatal` collapses to `ERROR`;
    /// `Silent` maps to `OFF`.
    pub fn as_filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error | Self::Fatal => LevelFilter::ERROR,
            Self::Silent => LevelFilter::OFF,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Silent => "silent",
        };
        f.write_str(s)
    }
}

/// Which HTTP framing the transport speaks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportMode {
    /// HTTP/1.1 only.
    Http1,
    /// HTTP/2-capable. Connections are negotiated per-client, so plain
    /// HTTP/1.1 clients keep working.
    Http2,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http1 => "http1",
            Self::Http2 => "http2",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_info_http1() {
        let config = ServerConfig::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.transport, TransportMode::Http1);
    }

    #[test]
    fn fatal_and_silent_map_onto_tracing() {
        assert_eq!(LogLevel::Fatal.as_filter(), LevelFilter::ERROR);
        assert_eq!(LogLevel::Silent.as_filter(), LevelFilter::OFF);
        assert_eq!(LogLevel::Trace.as_filter(), LevelFilter::TRACE);
    }
}
