mod common;

use common::{memory_host, MemoryStore};
use luaredis::config::parse_addr;
use proptest::prelude::*;

proptest! {
    /// Address parsing returns Ok or Err, never panics.
    #[test]
    fn parse_addr_does_not_panic(s in "\\PC*") {
        let _ = parse_addr(&s);
    }

    #[test]
    fn host_port_is_split_at_the_colon(
        host in "[a-z][a-z0-9.-]{0,30}",
        port in 1u16..=u16::MAX,
    ) {
        let addr = format!("{}:{}", host, port);
        let (h, p) = parse_addr(&addr).unwrap();
        prop_assert_eq!(h, host);
        prop_assert_eq!(p, port);
    }

    #[test]
    fn non_numeric_port_is_rejected(host in "[a-z]{1,10}", port in "[a-z]{1,5}") {
        let addr = format!("{}:{}", host, port);
        prop_assert!(parse_addr(&addr).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever integer a script passes as a TTL reaches the store unchanged.
    #[test]
    fn ttl_reaches_store_unchanged(ttl in any::<i64>()) {
        let store = MemoryStore::new();
        let host = memory_host(&store);
        host.lua().globals().set("ttl", ttl).unwrap();
        host.exec(r#"require("redis").new_client("", ""):expire("k", ttl)"#).unwrap();
        let ttls = store.ttls.borrow().clone();
        prop_assert_eq!(ttls, vec![ttl]);
    }

    /// Arbitrary byte strings survive the trip through the handle.
    #[test]
    fn stored_bytes_come_back_intact(
        key in proptest::collection::vec(any::<u8>(), 1..32),
        value in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let store = MemoryStore::new();
        let host = memory_host(&store);
        let lua = host.lua();
        lua.globals().set("key", lua.create_string(&key).unwrap()).unwrap();
        lua.globals().set("value", lua.create_string(&value).unwrap()).unwrap();
        let (got, exists): (mlua::String, bool) = host
            .eval(r#"
                local rdb = require("redis").new_client("", "")
                rdb:set(key, value, 0)
                local v, e = rdb:get(key)
                return v, e
            "#)
            .unwrap();
        prop_assert!(exists);
        prop_assert_eq!(&got.as_bytes()[..], &value[..]);
    }
}
