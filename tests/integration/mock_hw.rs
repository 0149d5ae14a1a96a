//! Mock adapters for integration tests.
//!
//! Storage and output mocks share their state through `Arc`s so a test can
//! keep a handle after moving the mock into a `RoomContext` or `Driver`.

use roomctl::app::context::RoomContext;
use roomctl::app::ports::{ClockPort, OutputError, OutputPort, StorageError, StoragePort};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct NvsState {
    pub values: HashMap<String, i32>,
    pub commits: usize,
    pub set_calls: usize,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

#[derive(Clone, Default)]
pub struct MockNvs {
    pub state: Arc<Mutex<NvsState>>,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(values: &[(&str, i32)]) -> Self {
        let nvs = Self::new();
        nvs.state.lock().unwrap().values =
            values.iter().map(|(k, v)| ((*k).to_string(), *v)).collect();
        nvs
    }

    pub fn stored(&self, key: &str) -> Option<i32> {
        self.state.lock().unwrap().values.get(key).copied()
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn set_calls(&self) -> usize {
        self.state.lock().unwrap().set_calls
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }
}

impl StoragePort for MockNvs {
    fn get_i32(&self, key: &str) -> Result<Option<i32>, StorageError> {
        let s = self.state.lock().unwrap();
        if s.fail_reads {
            return Err(StorageError::Io);
        }
        Ok(s.values.get(key).copied())
    }

    fn set_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        let mut s = self.state.lock().unwrap();
        s.set_calls += 1;
        if s.fail_writes {
            return Err(StorageError::Io);
        }
        s.values.insert(key.to_string(), value);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StorageError> {
        self.state.lock().unwrap().commits += 1;
        Ok(())
    }
}

// ── MockOutput ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOutput {
    pub writes: Arc<Mutex<Vec<u8>>>,
    pub fail: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn history(&self) -> Vec<u8> {
        self.writes.lock().unwrap().clone()
    }
}

impl OutputPort for MockOutput {
    fn write(&mut self, bitmap: u8) -> Result<(), OutputError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(OutputError::HardwareWriteFailure);
        }
        self.writes.lock().unwrap().push(bitmap);
        Ok(())
    }
}

// ── FixedClock ────────────────────────────────────────────────

/// Settable clock; `u32::MAX` means "not synced".
#[derive(Clone)]
pub struct FixedClock(pub Arc<AtomicU32>);

#[allow(dead_code)]
impl FixedClock {
    pub fn at(ctod: u32) -> Self {
        Self(Arc::new(AtomicU32::new(ctod)))
    }

    pub fn unsynced() -> Self {
        Self::at(u32::MAX)
    }

    pub fn set(&self, ctod: u32) {
        self.0.store(ctod, Ordering::SeqCst);
    }
}

impl ClockPort for FixedClock {
    fn seconds_of_day(&self) -> Option<u32> {
        let v = self.0.load(Ordering::SeqCst);
        (v != u32::MAX).then_some(v)
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Loaded context over a fresh mock store.
#[allow(dead_code)]
pub fn loaded_context(values: &[(&str, i32)]) -> (Arc<RoomContext<MockNvs>>, MockNvs) {
    let nvs = MockNvs::with(values);
    let ctx = Arc::new(RoomContext::new(nvs.clone()));
    ctx.config.load();
    (ctx, nvs)
}
