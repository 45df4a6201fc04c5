//! The `redis_client` userdata handed to Lua by `new_client`.
//!
//! # Lua API
//!
//! | Lua call                           | Returns                          |
//! |------------------------------------|----------------------------------|
//! | `h:set(key, value, ttl)`           | `err`                            |
//! | `h:setnx(key, value, ttl)`         | `ok, err`                        |
//! | `h:get(key)`                       | `value, exists, err`             |
//! | `h:del(key)`                       | `err`                            |
//! | `h:expire(key, ttl)`               | `ok, err`                        |
//!
//! `err` is `nil` on success and a message string on any remote failure;
//! remote failures never raise.  Bad arguments (wrong types, missing
//! arguments, a `self` that is not a client) do raise.

use std::rc::Rc;
use std::sync::Arc;

use mlua::prelude::*;

use crate::config::ClientOptions;
use crate::context::CallContext;
use crate::error::StoreError;
use crate::store::{RedisStore, Store};

/// Name reported by `tostring(h)`.
pub const CLIENT_TYPENAME: &str = "redis_client";

/// Builds the store behind each new handle.
pub type StoreFactory = Rc<dyn Fn(&ClientOptions) -> Box<dyn Store>>;

/// Default factory: a lazily connected [`RedisStore`].
pub fn redis_factory() -> StoreFactory {
    Rc::new(|opts: &ClientOptions| Box::new(RedisStore::new(opts)) as Box<dyn Store>)
}

// ── RedisClient ───────────────────────────────────────────────────────────────

/// Opaque handle owned by the Lua garbage collector.  Dropped (and its
/// connection closed) when Lua collects the userdata.
pub struct RedisClient {
    addr: String,
    store: Box<dyn Store>,
}

impl RedisClient {
    pub fn new(addr: impl Into<String>, store: Box<dyn Store>) -> Self {
        Self {
            addr: addr.into(),
            store,
        }
    }
}

/// Body of `new_client(address, password)`.  Never touches the network.
pub fn new_client(lua: &Lua, factory: &StoreFactory, opts: ClientOptions) -> LuaResult<LuaAnyUserData> {
    let store = factory(&opts);
    lua.create_userdata(RedisClient::new(opts.addr, store))
}

// ── Argument checking ─────────────────────────────────────────────────────────

/// Borrow `self` as a client, or raise `bad argument #1 (redis client expected)`.
fn check_client(this: &LuaValue, method: &str) -> LuaResult<LuaUserDataRef<RedisClient>> {
    match this {
        LuaValue::UserData(ud) => ud.borrow::<RedisClient>().map_err(|_| client_expected(method)),
        _ => Err(client_expected(method)),
    }
}

fn client_expected(method: &str) -> LuaError {
    LuaError::BadArgument {
        to: Some(method.to_owned()),
        pos: 1,
        name: Some("self".to_owned()),
        cause: Arc::new(LuaError::RuntimeError("redis client expected".into())),
    }
}

fn err_value(err: StoreError) -> Option<String> {
    Some(err.to_string())
}

// ── Methods ───────────────────────────────────────────────────────────────────

impl LuaUserData for RedisClient {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        // set(key, value, ttl) → err
        methods.add_function(
            "set",
            |_, (this, key, value, ttl): (LuaValue, LuaString, LuaString, i64)| {
                let client = check_client(&this, "set")?;
                let cx = CallContext::background();
                Ok(client
                    .store
                    .set(&cx, &key.as_bytes(), &value.as_bytes(), ttl)
                    .err()
                    .and_then(err_value))
            },
        );

        // setnx(key, value, ttl) → ok, err
        methods.add_function(
            "setnx",
            |_, (this, key, value, ttl): (LuaValue, LuaString, LuaString, i64)| {
                let client = check_client(&this, "setnx")?;
                let cx = CallContext::background();
                Ok(match client.store.set_nx(&cx, &key.as_bytes(), &value.as_bytes(), ttl) {
                    Ok(ok) => (ok, None),
                    Err(e) => (false, err_value(e)),
                })
            },
        );

        // get(key) → value, exists, err
        methods.add_function("get", |lua, (this, key): (LuaValue, LuaString)| {
            let client = check_client(&this, "get")?;
            let cx = CallContext::background();
            let (value, exists, err) = match client.store.get(&cx, &key.as_bytes()) {
                Ok(Some(v)) => (lua.create_string(&v)?, true, None),
                Ok(None) => (lua.create_string("")?, false, None),
                Err(e) => (lua.create_string("")?, false, err_value(e)),
            };
            Ok((value, exists, err))
        });

        // del(key) → err
        methods.add_function("del", |_, (this, key): (LuaValue, LuaString)| {
            let client = check_client(&this, "del")?;
            let cx = CallContext::background();
            Ok(client.store.del(&cx, &key.as_bytes()).err().and_then(err_value))
        });

        // expire(key, ttl) → ok, err
        methods.add_function("expire", |_, (this, key, ttl): (LuaValue, LuaString, i64)| {
            let client = check_client(&this, "expire")?;
            let cx = CallContext::background();
            Ok(match client.store.expire(&cx, &key.as_bytes(), ttl) {
                Ok(ok) => (ok, None),
                Err(e) => (false, err_value(e)),
            })
        });

        methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
            Ok(format!("{CLIENT_TYPENAME}({})", this.addr))
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
