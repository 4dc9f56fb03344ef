//! # Error Types
//!
//! Purpose: Surface every failure mode of the pooled client as one enum so
//! callers can match on the phase that failed (dial, handshake, coding,
//! round trip) without string inspection.
//!
//! ## Design Principles
//! 1. **Distinct Acquisition Errors**: Dial, AUTH and SELECT failures are
//!    separate variants; none of them is retried inside the client.
//! 2. **Verbatim Transport Errors**: IO failures propagate unchanged.
//! 3. **Fail Before IO**: Value-coding errors are raised before any byte
//!    touches the network.

use std::io;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the pooled client.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file unreadable, invalid, or missing a data source.
    #[error("configuration error: {0}")]
    Config(String),

    /// TCP dial to the server failed.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// AUTH handshake rejected; the transport was torn down.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// SELECT handshake rejected; the transport was torn down.
    #[error("database selection failed: {0}")]
    Select(String),

    /// A nil value was passed to a write operation.
    #[error("invalid value: nil")]
    InvalidValue,

    /// Key absent where the operation requires it to exist.
    #[error("{0} does not exist in the database")]
    NotFound(String),

    /// Aggregate (hash or set) has no fields or members.
    #[error("{0} is empty or does not exist")]
    Empty(String),

    /// Network or IO failure while reading or writing a live connection.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// RESP framing or parse error.
    #[error("protocol error")]
    Protocol,

    /// Server returned an error reply.
    #[error("server error: {0}")]
    Server(String),

    /// Reply type did not match the issued command.
    #[error("unexpected reply")]
    UnexpectedReply,

    /// Structural encoding of a value failed.
    #[error("value encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Address could not be parsed into a socket address.
    #[error("invalid address")]
    InvalidAddress,

    /// The pool was closed; no further connections are handed out.
    #[error("pool is closed")]
    Closed,
}
