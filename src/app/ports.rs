//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ConfigStore / scheduler (domain)
//! ```
//!
//! Driven adapters (NVS, I2C port expander, wall clock) implement these
//! traits. The domain core consumes them via generics, so it never touches
//! hardware directly.
//!
//! The messaging transport has no port trait: it only ever calls
//! [`MessageRouter::dispatch`](crate::router::MessageRouter::dispatch)
//! from its delivery context.

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent i32 key-value storage, one namespace per adapter instance.
///
/// - Keys are at most 15 characters (NVS limit, 16 bytes with NUL).
/// - `set_i32` may be buffered until [`commit`](StoragePort::commit);
///   callers that need durability must commit.
pub trait StoragePort {
    /// Read a value. `Ok(None)` when the key has never been written.
    fn get_i32(&self, key: &str) -> Result<Option<i32>, StorageError>;

    /// Stage a value for the next commit.
    fn set_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError>;

    /// Flush staged writes to flash.
    fn commit(&mut self) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → digital outputs)
// ───────────────────────────────────────────────────────────────

/// Digital-output write capability. Bit `i` of the bitmap is output `i`;
/// mapping bits to physical pins is the adapter's business.
pub trait OutputPort {
    fn write(&mut self, bitmap: u8) -> Result<(), OutputError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → schedules)
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time source.
pub trait ClockPort {
    /// Seconds since local midnight in `[0, 86400)`, or `None` while the
    /// clock has not been synchronised.
    fn seconds_of_day(&self) -> Option<u32>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StoragePort`] operations and adapter construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The storage subsystem or namespace could not be opened.
    InitFailed,
    /// Key is empty, too long, or contains a NUL byte.
    InvalidKey,
    /// Generic I/O error from the backend (read, write or commit).
    Io,
}

/// Errors from [`OutputPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// The bus transaction to the output hardware failed.
    HardwareWriteFailure,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InitFailed => write!(f, "storage init failed"),
            Self::InvalidKey => write!(f, "invalid storage key"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::HardwareWriteFailure => write!(f, "hardware write failed"),
        }
    }
}
