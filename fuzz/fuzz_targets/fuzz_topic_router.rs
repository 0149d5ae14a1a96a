//! Fuzz target: `router::decode` and `MessageRouter::dispatch`
//!
//! Splits the input into a topic and a payload and asserts that decoding
//! never panics, never yields more actions than segments, and that a
//! rejected message leaves the registry untouched.
//!
//! cargo fuzz run fuzz_topic_router

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use roomctl::app::context::RoomContext;
use roomctl::app::ports::{StorageError, StoragePort};
use roomctl::router::{MAX_SEGMENTS, MessageRouter, decode};

struct NullStore;

impl StoragePort for NullStore {
    fn get_i32(&self, _key: &str) -> Result<Option<i32>, StorageError> {
        Ok(None)
    }
    fn set_i32(&mut self, _key: &str, _value: i32) -> Result<(), StorageError> {
        Ok(())
    }
    fn commit(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    // First 0x00 separates topic from payload.
    let split = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let Ok(topic) = core::str::from_utf8(&data[..split]) else {
        return;
    };
    let payload = data.get(split + 1..).unwrap_or(&[]);

    let ctx = Arc::new(RoomContext::new(NullStore));
    let before = ctx.config.snapshot();

    match decode(topic, payload) {
        Ok(actions) => assert!(!actions.is_empty() && actions.len() <= MAX_SEGMENTS),
        Err(_) => {
            MessageRouter::new(ctx.clone()).dispatch(topic, payload);
            assert_eq!(ctx.config.snapshot(), before);
        }
    }
});
