//! # Data-Source Configuration
//!
//! Purpose: Load named data-source entries from a JSON document and resolve
//! them into pool configurations with defaults applied.
//!
//! The document shape is `{"dataSources": {"name": {...}}}`; every field of
//! a data source may be omitted. Defaults are applied as a pure function
//! over the parsed struct, never as mutable global state.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pool::PoolConfig;

const DEFAULT_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "6379";
const DEFAULT_CACHE: &str = "60s";

/// Parsed configuration document keyed by data-source name.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(rename = "dataSources")]
    pub data_sources: HashMap<String, DataSource>,
}

/// One named server/database/pool tuple.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataSource {
    /// Database index handed to SELECT.
    pub num: u32,
    /// Server host; defaults to 127.0.0.1.
    pub addr: String,
    /// Server port; defaults to 6379.
    pub port: String,
    /// AUTH credential; empty means no handshake.
    pub pass: String,
    /// Maximum idle connections kept by the pool.
    pub pool: usize,
    /// Idle lifetime in seconds-suffixed textual form, e.g. "60s".
    /// A bare number is read as seconds.
    pub cache: String,
}

impl Settings {
    /// Parses a configuration document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|err| Error::Config(format!("invalid configuration: {err}")))
    }

    /// Reads and parses a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|err| {
            Error::Config(format!(
                "read configuration file {} failed: {err}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json(&text)
    }

    /// Resolves the named data source into a pool configuration.
    ///
    /// A missing name is a hard configuration error.
    pub fn pool_config(&self, name: &str) -> Result<PoolConfig> {
        let source = self
            .data_sources
            .get(name)
            .ok_or_else(|| Error::Config(format!("missing data source {name}")))?;
        source.resolve()
    }
}

impl DataSource {
    /// Applies defaults and produces a pool configuration.
    pub fn resolve(&self) -> Result<PoolConfig> {
        let addr = non_empty(&self.addr, DEFAULT_ADDR);
        let port = non_empty(&self.port, DEFAULT_PORT);
        let cache = non_empty(&self.cache, DEFAULT_CACHE);
        let idle_lifetime = parse_seconds(cache)?;

        Ok(PoolConfig {
            addr: format!("{addr}:{port}"),
            password: if self.pass.is_empty() {
                None
            } else {
                Some(self.pass.clone())
            },
            database: self.num,
            max_idle: self.pool,
            idle_lifetime,
            ..PoolConfig::default()
        })
    }
}

fn non_empty<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn parse_seconds(text: &str) -> Result<Duration> {
    let digits = text.strip_suffix('s').unwrap_or(text);
    let seconds: u64 = digits
        .parse()
        .map_err(|_| Error::Config(format!("invalid idle lifetime {text}")))?;
    Ok(Duration::from_secs(seconds))
}
