//! In-memory stand-in for a Redis server, shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use luaredis::{CallContext, ScriptHost, Store, StoreResult};
use redis::{ErrorKind, RedisError};

#[derive(Default)]
struct Entry {
    value: Vec<u8>,
    expires: Option<Instant>,
}

/// Shared key space with Redis TTL semantics for the five commands.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<HashMap<Vec<u8>, Entry>>>,
    /// Every TTL the store was handed, in call order.
    pub ttls: Rc<RefCell<Vec<i64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.live(key)
    }

    pub fn has_expiry(&self, key: &[u8]) -> bool {
        self.data
            .borrow()
            .get(key)
            .map(|e| e.expires.is_some())
            .unwrap_or(false)
    }

    /// Drop `key` if its deadline has passed; report whether it is still there.
    fn live(&self, key: &[u8]) -> bool {
        let mut data = self.data.borrow_mut();
        let expired = match data.get(key) {
            Some(e) => e.expires.is_some_and(|t| t <= Instant::now()),
            None => return false,
        };
        if expired {
            data.remove(key);
        }
        !expired
    }

    fn deadline(ttl: i64) -> Option<Instant> {
        (ttl > 0).then(|| Instant::now() + Duration::from_secs(ttl as u64))
    }
}

impl Store for MemoryStore {
    fn set(&self, _: &CallContext, key: &[u8], value: &[u8], ttl: i64) -> StoreResult<()> {
        self.ttls.borrow_mut().push(ttl);
        self.data.borrow_mut().insert(
            key.to_vec(),
            Entry {
                value: value.to_vec(),
                expires: Self::deadline(ttl),
            },
        );
        Ok(())
    }

    fn set_nx(&self, cx: &CallContext, key: &[u8], value: &[u8], ttl: i64) -> StoreResult<bool> {
        if ttl < 0 {
            self.ttls.borrow_mut().push(ttl);
            return Err(RedisError::from((
                ErrorKind::ResponseError,
                "invalid expire time in 'set' command",
            ))
            .into());
        }
        if self.live(key) {
            self.ttls.borrow_mut().push(ttl);
            return Ok(false);
        }
        self.set(cx, key, value, ttl)?;
        Ok(true)
    }

    fn get(&self, _: &CallContext, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        if !self.live(key) {
            return Ok(None);
        }
        Ok(self.data.borrow().get(key).map(|e| e.value.clone()))
    }

    fn del(&self, _: &CallContext, key: &[u8]) -> StoreResult<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn expire(&self, _: &CallContext, key: &[u8], ttl: i64) -> StoreResult<bool> {
        self.ttls.borrow_mut().push(ttl);
        if !self.live(key) {
            return Ok(false);
        }
        let mut data = self.data.borrow_mut();
        if ttl <= 0 {
            data.remove(key);
        } else if let Some(e) = data.get_mut(key) {
            e.expires = Self::deadline(ttl);
        }
        Ok(true)
    }
}

/// A host whose every `new_client` handle shares `store`'s key space.
pub fn memory_host(store: &MemoryStore) -> ScriptHost {
    let store = store.clone();
    ScriptHost::with_factory(move |_| Box::new(store.clone()) as Box<dyn Store>)
        .expect("create script host")
}
