use std::path::PathBuf;

/// Errors surfaced by transport endpoints and streams.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not bind a listening socket at the given path.
    #[error("could not bind socket at {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Could not connect to a listening socket at the given path.
    #[error("could not connect to socket at {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Accepting an incoming connection failed.
    #[error("accept failed: {0}")]
    Accept(std::io::Error),

    /// I/O failure on the underlying stream.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path exceeds the platform's `sun_path` limit.
    #[error("socket path {path} is {len} bytes, platform max is {max}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// The peer end of the transport is gone.
    #[error("transport closed by peer")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
