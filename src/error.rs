//! Unified error types for the room controller.
//!
//! A single `Error` enum that every subsystem can convert into. All
//! variants are `Copy` so they can be passed from the message-handling
//! context into logs without allocation.

use core::fmt;

use crate::app::ports::{OutputError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A parameter registry operation failed.
    Config(ConfigError),
    /// An inbound topic/payload pair could not be decoded.
    Message(MessageError),
    /// The output driver rejected a bitmap write.
    Output(OutputError),
    /// The storage subsystem could not be opened at boot. Fatal.
    StorageInit(StorageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Message(e) => write!(f, "message: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::StorageInit(e) => write!(f, "storage init: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The key is not part of the fixed parameter set.
    KeyNotFound,
    /// The live value was updated but the storage write or commit failed.
    PersistenceWriteFailure,
    /// A [`SystemConfig`](crate::config::SystemConfig) field is out of range.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound => write!(f, "key not found"),
            Self::PersistenceWriteFailure => write!(f, "persistence write failed"),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Message errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// No `set` verb or sensor segment, a verb with no key before it, or
    /// too many segments.
    MalformedTopic,
    /// Payload is not a base-10 `i32`.
    MalformedPayload,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTopic => write!(f, "malformed topic"),
            Self::MalformedPayload => write!(f, "malformed payload"),
        }
    }
}

impl From<MessageError> for Error {
    fn from(e: MessageError) -> Self {
        Self::Message(e)
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
