//! # redpool
//!
//! Purpose: A synchronous, connection-pooled client for a Redis-compatible
//! key-value store with automatic structural value coding. Structural
//! values (mappings, sequences, records) are rendered to canonical JSON on
//! the way out and sniffed back into structure on the way in; raw bytes
//! pass through untouched.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Connections are dialed lazily, handshaken
//!    once (AUTH + SELECT), validated on checkout, and reused until their
//!    idle lifetime expires.
//! 2. **Scoped Acquisition**: Every command borrows a connection through an
//!    RAII guard; release is guaranteed on every exit path.
//! 3. **Bounded Value Type**: Callers hand over a [`Value`], not an erased
//!    any-type; nil is rejected before any network IO.
//! 4. **No Hidden Retries**: Dial, handshake, and round-trip failures
//!    surface immediately as distinct error kinds.

mod client;
mod codec;
mod config;
mod error;
mod pool;
mod resp;

pub use client::Client;
pub use codec::{decode_list, decode_map, decode_scalar, encode, Sniffed, Value};
pub use config::{DataSource, Settings};
pub use error::{Error, Result};
pub use pool::{ConnectionPool, PoolConfig, PooledConnection};
pub use resp::Reply;
