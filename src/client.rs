//! # Pooled Client
//!
//! Purpose: Expose the string, hash-table, and set command surface. Each
//! method encodes its value through the codec, runs exactly one round trip
//! through the pool, and decodes the reply.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: [`Client`] hides pooling, handshake, and framing.
//! 2. **Scoped Acquisition**: `execute` borrows a connection for one round
//!    trip; the RAII guard releases it on every exit path.
//! 3. **Encode Before IO**: Nil values are rejected before a connection is
//!    ever acquired.
//! 4. **No Retries**: A failed dial, handshake, or round trip surfaces
//!    immediately to the caller.

use std::path::Path;

use crate::codec::{self, Value};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::pool::{ConnectionPool, PoolConfig};
use crate::resp::Reply;

/// Connection-pooled client bound to one (address, database) pair.
pub struct Client {
    pool: ConnectionPool,
}

impl Client {
    /// Creates a client from an explicit pool configuration.
    pub fn new(config: PoolConfig) -> Self {
        Client {
            pool: ConnectionPool::new(config),
        }
    }

    /// Creates a client for a named data source in parsed settings.
    pub fn from_settings(settings: &Settings, name: &str) -> Result<Self> {
        Ok(Client::new(settings.pool_config(name)?))
    }

    /// Creates a client for a named data source in a configuration file.
    pub fn open(path: impl AsRef<Path>, name: &str) -> Result<Self> {
        Client::from_settings(&Settings::from_path(path)?, name)
    }

    /// Issues one command: acquire, round trip, release.
    ///
    /// The reply is returned uninterpreted; a server error reply is still
    /// `Ok(Reply::Error(..))` at this layer.
    pub fn execute(&self, args: &[&[u8]]) -> Result<Reply> {
        let mut conn = self.pool.acquire()?;
        conn.exec(args)
    }

    /// Closes the pool. Idempotent; in-flight operations fail on their next
    /// round trip but pool state stays consistent.
    pub fn close(&self) {
        self.pool.close();
    }

    // --- string operations ---

    /// Whether the key exists. Any underlying error collapses to false.
    pub fn exists(&self, key: &str) -> bool {
        self.execute(&[b"EXISTS", key.as_bytes()])
            .and_then(Reply::integer)
            .map(|n| n > 0)
            .unwrap_or(false)
    }

    /// Stores a value under the key, encoding structural values as JSON.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let encoded = codec::encode(&value.into())?;
        self.execute(&[b"SET", key.as_bytes(), &encoded])?.ok()
    }

    /// Fetches the raw payload stored under the key.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.execute(&[b"GET", key.as_bytes()])?.bytes()
    }

    /// Deletes the key.
    pub fn del(&self, key: &str) -> Result<()> {
        self.execute(&[b"DEL", key.as_bytes()])?.ok()
    }

    /// Lists every key in the selected database.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.execute(&[b"KEYS", b"*"])?.strings()
    }

    /// Sets an expiration on the key, in seconds.
    ///
    /// Fails with [`Error::NotFound`] when the key does not exist.
    pub fn expire(&self, key: &str, seconds: u64) -> Result<()> {
        let ttl = seconds.to_string();
        let set = self
            .execute(&[b"EXPIRE", key.as_bytes(), ttl.as_bytes()])?
            .integer()?;
        if set == 1 {
            Ok(())
        } else {
            Err(Error::NotFound(key.to_string()))
        }
    }

    // --- hash-table operations ---

    /// Sets one field of a hash table.
    pub fn hset(&self, key: &str, field: &str, value: impl Into<Value>) -> Result<()> {
        let encoded = codec::encode(&value.into())?;
        self.execute(&[b"HSET", key.as_bytes(), field.as_bytes(), &encoded])?
            .ok()
    }

    /// Fetches the raw payload of one hash field.
    pub fn hget(&self, key: &str, field: &str) -> Result<Option<Vec<u8>>> {
        self.execute(&[b"HGET", key.as_bytes(), field.as_bytes()])?
            .bytes()
    }

    /// Deletes one hash field.
    pub fn hdel(&self, key: &str, field: &str) -> Result<()> {
        self.execute(&[b"HDEL", key.as_bytes(), field.as_bytes()])?
            .ok()
    }

    /// Whether the hash field exists. Any underlying error collapses to false.
    pub fn hexists(&self, key: &str, field: &str) -> bool {
        self.execute(&[b"HEXISTS", key.as_bytes(), field.as_bytes()])
            .and_then(Reply::integer)
            .map(|n| n > 0)
            .unwrap_or(false)
    }

    /// Lists the fields of a hash table.
    ///
    /// Fails with [`Error::Empty`] when the hash has no fields.
    pub fn hkeys(&self, key: &str) -> Result<Vec<String>> {
        let fields = self.execute(&[b"HKEYS", key.as_bytes()])?.strings()?;
        if fields.is_empty() {
            return Err(Error::Empty(key.to_string()));
        }
        Ok(fields)
    }

    /// Decodes every value of a hash table into one JSON array.
    ///
    /// Fails with [`Error::Empty`] when the hash has no fields.
    pub fn hvalues(&self, key: &str) -> Result<Vec<u8>> {
        let values = self.execute(&[b"HVALS", key.as_bytes()])?.items()?;
        if values.is_empty() {
            return Err(Error::Empty(key.to_string()));
        }
        codec::decode_list(values)
    }

    /// Decodes every field and value of a hash table into one JSON object.
    ///
    /// Fails with [`Error::Empty`] when the hash has no fields.
    pub fn hgetall(&self, key: &str) -> Result<Vec<u8>> {
        let pairs = self.execute(&[b"HGETALL", key.as_bytes()])?.pairs()?;
        if pairs.is_empty() {
            return Err(Error::Empty(key.to_string()));
        }
        codec::decode_map(pairs)
    }

    /// Number of fields in a hash table; an absent key counts zero.
    pub fn hlen(&self, key: &str) -> Result<u64> {
        let count = self.execute(&[b"HLEN", key.as_bytes()])?.integer()?;
        Ok(count.max(0) as u64)
    }

    // --- set operations ---

    /// Adds a member to a set.
    pub fn sadd(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let encoded = codec::encode(&value.into())?;
        self.execute(&[b"SADD", key.as_bytes(), &encoded])?.ok()
    }

    /// Whether the member is in the set. Any underlying error collapses to
    /// false, including a member that fails to encode.
    pub fn sismember(&self, key: &str, value: impl Into<Value>) -> bool {
        let Ok(encoded) = codec::encode(&value.into()) else {
            return false;
        };
        self.execute(&[b"SISMEMBER", key.as_bytes(), &encoded])
            .and_then(Reply::integer)
            .map(|n| n > 0)
            .unwrap_or(false)
    }

    /// Decodes every member of a set into one JSON array, in reply order.
    ///
    /// Fails with [`Error::Empty`] when the set has no members.
    pub fn smembers(&self, key: &str) -> Result<Vec<u8>> {
        let members = self.execute(&[b"SMEMBERS", key.as_bytes()])?.items()?;
        if members.is_empty() {
            return Err(Error::Empty(key.to_string()));
        }
        codec::decode_list(members)
    }

    /// Removes a member from a set.
    pub fn srem(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let encoded = codec::encode(&value.into())?;
        self.execute(&[b"SREM", key.as_bytes(), &encoded])?.ok()
    }
}
