//! The five remote commands behind a Lua handle.
//!
//! [`Store`] is the seam between the Lua adapter and the network: the adapter
//! only ever talks to a `dyn Store`, so hosts and tests can substitute their
//! own implementation.  [`RedisStore`] is the real one, built on the `redis`
//! crate's synchronous connection.
//!
//! TTLs are whole seconds and are passed through with the store's own
//! semantics:
//!
//! | Command  | `ttl > 0`            | `ttl == 0`         | `ttl < 0`             |
//! |----------|----------------------|--------------------|-----------------------|
//! | `set`    | `SET k v EX ttl`     | `SET k v`          | `SET k v`             |
//! | `set_nx` | `SET k v EX ttl NX`  | `SETNX k v`        | `SET k v EX ttl NX` (server rejects) |
//! | `expire` | `EXPIRE k ttl`       | `EXPIRE k 0` (deletes) | `EXPIRE k ttl` (deletes) |

use std::cell::Cell;

use tracing::{debug, trace};

use crate::config::{ClientOptions, ConfigError};
use crate::context::CallContext;
use crate::error::{StoreError, StoreResult};

// ── Store ─────────────────────────────────────────────────────────────────────

/// Remote key/value commands, one request/response each.
pub trait Store {
    /// `SET`, with an expiry when `ttl_secs > 0`.
    fn set(&self, cx: &CallContext, key: &[u8], value: &[u8], ttl_secs: i64) -> StoreResult<()>;

    /// Set only if `key` is absent.  `Ok(false)` means the key already existed.
    fn set_nx(&self, cx: &CallContext, key: &[u8], value: &[u8], ttl_secs: i64)
        -> StoreResult<bool>;

    /// `Ok(None)` when the key does not exist.
    fn get(&self, cx: &CallContext, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn del(&self, cx: &CallContext, key: &[u8]) -> StoreResult<()>;

    /// `Ok(false)` when the key does not exist.
    fn expire(&self, cx: &CallContext, key: &[u8], ttl_secs: i64) -> StoreResult<bool>;
}

// ── RedisStore ────────────────────────────────────────────────────────────────

/// A lazily connected Redis client.
///
/// Construction never touches the network and never fails: an unusable
/// address is remembered and reported by every command instead.  The first
/// command opens a connection which is then reused until a transport error
/// discards it.
pub struct RedisStore {
    client: Result<redis::Client, ConfigError>,
    conn: Cell<Option<redis::Connection>>,
}

impl RedisStore {
    pub fn new(opts: &ClientOptions) -> Self {
        let client = opts.connection_info().and_then(|info| {
            redis::Client::open(info).map_err(|e| ConfigError::Rejected {
                addr: opts.addr.clone(),
                reason: e.to_string(),
            })
        });
        match &client {
            Ok(_) => debug!(target: "luaredis", addr = %opts.addr, db = opts.db, "client created"),
            Err(e) => debug!(target: "luaredis", addr = %opts.addr, error = %e, "client created with unusable address"),
        }
        Self {
            client,
            conn: Cell::new(None),
        }
    }

    /// `true` once a command has opened a connection that is still cached.
    pub fn is_connected(&self) -> bool {
        let conn = self.conn.take();
        let connected = conn.is_some();
        self.conn.set(conn);
        connected
    }

    fn connect(&self, cx: &CallContext) -> StoreResult<redis::Connection> {
        let client = self.client.as_ref().map_err(|e| StoreError::Config(e.clone()))?;
        let conn = match cx.timeout() {
            Some(t) => client.get_connection_with_timeout(t)?,
            None => client.get_connection()?,
        };
        debug!(target: "luaredis", addr = %client.get_connection_info().addr, "connected");
        Ok(conn)
    }

    /// Run one command on the cached connection, opening it if needed.
    fn run<T>(
        &self,
        cx: &CallContext,
        name: &'static str,
        cmd: &redis::Cmd,
    ) -> StoreResult<T>
    where
        T: redis::FromRedisValue,
    {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.connect(cx)?,
        };

        let result = query(&mut conn, cx, cmd).map_err(StoreError::from);

        match &result {
            Ok(_) => {
                trace!(target: "luaredis", command = name, "ok");
                self.conn.set(Some(conn));
            }
            Err(e) if e.is_connection_fatal() => {
                debug!(target: "luaredis", command = name, error = %e, "dropping connection");
            }
            Err(e) => {
                debug!(target: "luaredis", command = name, error = %e, "command failed");
                self.conn.set(Some(conn));
            }
        }
        result
    }
}

fn query<T: redis::FromRedisValue>(
    conn: &mut redis::Connection,
    cx: &CallContext,
    cmd: &redis::Cmd,
) -> redis::RedisResult<T> {
    conn.set_read_timeout(cx.timeout())?;
    conn.set_write_timeout(cx.timeout())?;
    cmd.query(conn)
}

impl Store for RedisStore {
    fn set(&self, cx: &CallContext, key: &[u8], value: &[u8], ttl_secs: i64) -> StoreResult<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if ttl_secs > 0 {
            cmd.arg("EX").arg(ttl_secs);
        }
        self.run::<()>(cx, "set", &cmd)
    }

    fn set_nx(
        &self,
        cx: &CallContext,
        key: &[u8],
        value: &[u8],
        ttl_secs: i64,
    ) -> StoreResult<bool> {
        if ttl_secs == 0 {
            let mut cmd = redis::cmd("SETNX");
            cmd.arg(key).arg(value);
            return self.run::<bool>(cx, "setnx", &cmd);
        }
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("EX").arg(ttl_secs).arg("NX");
        let reply = self.run::<redis::Value>(cx, "setnx", &cmd)?;
        Ok(!matches!(reply, redis::Value::Nil))
    }

    fn get(&self, cx: &CallContext, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.run::<Option<Vec<u8>>>(cx, "get", &cmd)
    }

    fn del(&self, cx: &CallContext, key: &[u8]) -> StoreResult<()> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        self.run::<i64>(cx, "del", &cmd).map(|_| ())
    }

    fn expire(&self, cx: &CallContext, key: &[u8], ttl_secs: i64) -> StoreResult<bool> {
        let mut cmd = redis::cmd("EXPIRE");
        cmd.arg(key).arg(ttl_secs);
        self.run::<bool>(cx, "expire", &cmd)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
