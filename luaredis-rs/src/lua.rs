//! Lua 5.4 integration via the `mlua` crate.
//!
//! Registers the `redis` module in an interpreter's `package.preload`, so a
//! script can write:
//!
//! ```lua
//! local redis = require("redis")
//! local rdb = redis.new_client("localhost:6379", "")
//! local val, exists, err = rdb:get("key")
//! ```
//!
//! # Rust API
//!
//! | Entry point                  | Effect                                         |
//! |------------------------------|------------------------------------------------|
//! | [`preload`]                  | make `require("redis")` available              |
//! | [`preload_with`]             | same, with a custom store per handle           |
//! | [`loader`]                   | build the module table directly                |
//! | [`ScriptHost`]               | an interpreter with the module preloaded       |

use std::path::Path;
use std::rc::Rc;

use mlua::prelude::*;

use crate::client::{self, redis_factory, StoreFactory};
use crate::config::ClientOptions;
use crate::store::Store;

/// Name scripts pass to `require`.
pub const MODULE_NAME: &str = "redis";

// ── Module registration ───────────────────────────────────────────────────────

/// Register the `redis` module backed by real Redis connections.
pub fn preload(lua: &Lua) -> LuaResult<()> {
    register(lua, redis_factory())
}

/// Register the `redis` module with `factory` building the store behind
/// every `new_client` handle.
pub fn preload_with<F>(lua: &Lua, factory: F) -> LuaResult<()>
where
    F: Fn(&ClientOptions) -> Box<dyn Store> + 'static,
{
    register(lua, Rc::new(factory))
}

/// Build the module table `{ new_client = ... }` without going through
/// `require`.
pub fn loader(lua: &Lua) -> LuaResult<LuaTable> {
    module_table(lua, redis_factory())
}

fn register(lua: &Lua, factory: StoreFactory) -> LuaResult<()> {
    let package: LuaTable = lua.globals().get("package")?;
    let preload: LuaTable = package.get("preload")?;
    let open = lua.create_function(move |lua, _: LuaMultiValue| {
        module_table(lua, Rc::clone(&factory))
    })?;
    preload.set(MODULE_NAME, open)
}

fn module_table(lua: &Lua, factory: StoreFactory) -> LuaResult<LuaTable> {
    let module = lua.create_table()?;

    // new_client(address, password) → handle
    module.set(
        "new_client",
        lua.create_function(move |lua, (addr, password): (String, String)| {
            client::new_client(lua, &factory, ClientOptions::new(addr, password))
        })?,
    )?;

    Ok(module)
}

// ── ScriptHost ────────────────────────────────────────────────────────────────

/// A Lua 5.4 interpreter with the `redis` module preloaded.
///
/// Handles created by scripts live as long as the Lua values referring to
/// them; dropping the host closes every connection.
pub struct ScriptHost {
    lua: Lua,
}

impl ScriptHost {
    pub fn new() -> LuaResult<Self> {
        let lua = Lua::new();
        preload(&lua)?;
        Ok(Self { lua })
    }

    /// Like [`ScriptHost::new`], but every `new_client` handle is backed by
    /// the store `factory` returns.
    pub fn with_factory<F>(factory: F) -> LuaResult<Self>
    where
        F: Fn(&ClientOptions) -> Box<dyn Store> + 'static,
    {
        let lua = Lua::new();
        preload_with(&lua, factory)?;
        Ok(Self { lua })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Run a script file; errors carry the file name in their chunk info.
    pub fn load_file(&self, path: &Path) -> LuaResult<()> {
        self.lua.load(path).exec()
    }

    pub fn exec(&self, chunk: &str) -> LuaResult<()> {
        self.lua.load(chunk).exec()
    }

    /// Evaluate an expression or a `return` chunk.  Multiple return values
    /// convert into a tuple `R`.
    pub fn eval<R: FromLuaMulti>(&self, expr: &str) -> LuaResult<R> {
        self.lua.load(expr).eval()
    }

    /// Invoke a global function defined by a loaded script, e.g. a handler
    /// taking `(key, ttl)` and returning the adapter's `ok, err` pair.
    pub fn call<A, R>(&self, name: &str, args: A) -> LuaResult<R>
    where
        A: IntoLuaMulti,
        R: FromLuaMulti,
    {
        let func: LuaFunction = self.lua.globals().get(name)?;
        func.call(args)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
