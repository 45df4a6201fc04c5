//! Redis client bindings for embedded Lua 5.4 scripts.
//!
//! ```no_run
//! let host = luaredis::ScriptHost::new()?;
//! host.exec(r#"
//!     local rdb = require("redis").new_client("localhost:6379", "")
//!     local err = rdb:set("greeting", "hello", 60)
//!     assert(err == nil, err)
//! "#)?;
//! # Ok::<(), mlua::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod lua;
pub mod store;

pub use client::{RedisClient, StoreFactory};
pub use config::{ClientOptions, ConfigError};
pub use context::CallContext;
pub use error::{StoreError, StoreResult};
pub use lua::{loader, preload, preload_with, ScriptHost, MODULE_NAME};
pub use store::{RedisStore, Store};
