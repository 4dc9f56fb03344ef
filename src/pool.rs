//! # Connection Pool
//!
//! Purpose: Reuse authenticated, database-selected TCP connections so each
//! command avoids the dial and handshake cost.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Keep a bounded set of idle connections; dial
//!    a fresh one whenever none survives validation.
//! 2. **Minimal Locking**: Hold the mutex only while moving idle
//!    connections; all network IO happens outside the critical section.
//! 3. **Handshake On Dial**: AUTH and SELECT run once per physical
//!    connection; a failed handshake tears the transport down immediately.
//! 4. **Validate On Checkout**: An idle connection past its lifetime is
//!    discarded; a younger one must answer a PING before reuse.

use std::collections::VecDeque;
use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::resp::{encode_command, read_reply, Reply};

/// Pool configuration for one (address, database) pair.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Server address, e.g. "127.0.0.1:6379".
    pub addr: String,
    /// AUTH credential; None skips the handshake.
    pub password: Option<String>,
    /// Database index handed to SELECT after dialing.
    pub database: u32,
    /// Maximum number of idle connections to keep.
    pub max_idle: usize,
    /// Idle connections older than this are discarded, never reused.
    pub idle_lifetime: Duration,
    /// Optional TCP read timeout.
    pub read_timeout: Option<Duration>,
    /// Optional TCP write timeout.
    pub write_timeout: Option<Duration>,
    /// Optional TCP connect timeout.
    pub connect_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            addr: "127.0.0.1:6379".to_string(),
            password: None,
            database: 0,
            max_idle: 8,
            idle_lifetime: Duration::from_secs(60),
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
        }
    }
}

struct PoolState {
    idle: VecDeque<Connection>,
    closed: bool,
}

struct PoolInner {
    config: PoolConfig,
    state: Mutex<PoolState>,
}

/// Connection pool handle. Cloning shares the same pool.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Creates a pool; no connection is dialed until the first acquire.
    pub fn new(config: PoolConfig) -> Self {
        let state = PoolState {
            idle: VecDeque::with_capacity(config.max_idle),
            closed: false,
        };
        ConnectionPool {
            inner: Arc::new(PoolInner {
                config,
                state: Mutex::new(state),
            }),
        }
    }

    /// Acquires a validated connection, dialing a new one when no idle
    /// connection survives the lifetime check and liveness probe.
    pub fn acquire(&self) -> Result<PooledConnection> {
        loop {
            let conn = {
                let mut state = self.inner.state.lock().expect("pool mutex poisoned");
                if state.closed {
                    return Err(Error::Closed);
                }
                state.idle.pop_front()
            };
            let Some(mut conn) = conn else { break };

            if conn.idle_for() > self.inner.config.idle_lifetime {
                debug!(addr = %self.inner.config.addr, "discarding idle connection past lifetime");
                continue;
            }
            match conn.ping() {
                Ok(()) => return Ok(PooledConnection::new(self.inner.clone(), conn)),
                Err(err) => {
                    warn!(addr = %self.inner.config.addr, error = %err, "liveness probe failed, discarding connection");
                }
            }
        }

        let conn = Connection::open(&self.inner.config)?;
        Ok(PooledConnection::new(self.inner.clone(), conn))
    }

    /// Closes the pool and every idle connection. Idempotent; connections
    /// still checked out are closed when their guard drops.
    pub fn close(&self) {
        let drained: Vec<Connection> = {
            let mut state = self.inner.state.lock().expect("pool mutex poisoned");
            state.closed = true;
            state.idle.drain(..).collect()
        };
        // Sockets shut down outside the lock.
        drop(drained);
    }
}

impl PoolInner {
    fn return_connection(&self, mut conn: Connection) {
        conn.returned_at = Instant::now();
        let mut state = self.state.lock().expect("pool mutex poisoned");
        if state.closed || state.idle.len() >= self.config.max_idle {
            return;
        }
        state.idle.push_back(conn);
    }
}

/// RAII guard: returns the connection to the pool on drop, or closes it
/// when a round trip failed or the pool no longer wants it.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    conn: Option<Connection>,
    valid: bool,
}

impl PooledConnection {
    fn new(pool: Arc<PoolInner>, conn: Connection) -> Self {
        PooledConnection {
            pool,
            conn: Some(conn),
            valid: true,
        }
    }

    /// Performs one request/reply round trip.
    pub fn exec(&mut self, args: &[&[u8]]) -> Result<Reply> {
        let conn = self.conn.as_mut().expect("connection present until drop");
        let reply = conn.exec(args);
        if reply.is_err() {
            // An IO or framing failure leaves the stream in an unknown
            // state; never pool this connection again.
            self.valid = false;
        }
        reply
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else { return };
        if self.valid {
            self.pool.return_connection(conn);
        }
    }
}

/// One physical connection with reusable framing buffers, already past the
/// AUTH and SELECT handshake.
pub(crate) struct Connection {
    reader: BufReader<TcpStream>,
    line_buf: Vec<u8>,
    write_buf: Vec<u8>,
    returned_at: Instant,
}

impl Connection {
    fn open(config: &PoolConfig) -> Result<Self> {
        let stream = dial(config)?;
        if let Some(timeout) = config.read_timeout {
            stream.set_read_timeout(Some(timeout))?;
        }
        if let Some(timeout) = config.write_timeout {
            stream.set_write_timeout(Some(timeout))?;
        }
        stream.set_nodelay(true)?;

        let mut conn = Connection {
            reader: BufReader::new(stream),
            line_buf: Vec::with_capacity(128),
            write_buf: Vec::with_capacity(256),
            returned_at: Instant::now(),
        };

        if let Some(password) = &config.password {
            if let Err(err) = conn.handshake(&[b"AUTH", password.as_bytes()]) {
                return Err(Error::Auth(err.to_string()));
            }
        }
        let database = config.database.to_string();
        if let Err(err) = conn.handshake(&[b"SELECT", database.as_bytes()]) {
            return Err(Error::Select(err.to_string()));
        }

        debug!(addr = %config.addr, database = config.database, "dialed new connection");
        Ok(conn)
    }

    fn handshake(&mut self, args: &[&[u8]]) -> Result<()> {
        self.exec(args)?.ok()
    }

    fn ping(&mut self) -> Result<()> {
        self.exec(&[b"PING"])?.ok()
    }

    pub(crate) fn exec(&mut self, args: &[&[u8]]) -> Result<Reply> {
        self.write_buf.clear();
        encode_command(args, &mut self.write_buf);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buf)?;
        stream.flush()?;

        read_reply(&mut self.reader, &mut self.line_buf)
    }

    fn idle_for(&self) -> Duration {
        self.returned_at.elapsed()
    }
}

fn dial(config: &PoolConfig) -> Result<TcpStream> {
    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|_| Error::InvalidAddress)?;
    let attempt = match config.connect_timeout {
        Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
        None => TcpStream::connect(addr),
    };
    attempt.map_err(|source| Error::Connect {
        addr: config.addr.clone(),
        source,
    })
}
