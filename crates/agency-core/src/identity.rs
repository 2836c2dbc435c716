//! # Document Identifiers
//!
//! Every stored document is addressed by a [`DocId`]: an opaque
//! 24-character lowercase hex string encoding 12 bytes.
//!
//! ## Layout
//!
//! ```text
//! | 4 bytes UNIX seconds (BE) | 5 bytes per-process random | 3 bytes counter (BE) |
//! ```
//!
//! Ids minted by one process sort by creation second, and the counter keeps
//! ids distinct within a second. Ids coming from clients are only checked
//! for shape; nothing is inferred from their bytes beyond [`DocId::timestamp`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Length of the hex representation.
pub const DOC_ID_LEN: usize = 24;

fn process_unique() -> &'static [u8; 5] {
    static UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    UNIQUE.get_or_init(|| {
        let mut bytes = [0u8; 5];
        OsRng.fill_bytes(&mut bytes);
        bytes
    })
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU32::new(OsRng.next_u32() & 0x00ff_ffff));
    counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff
}

/// Opaque 24-character document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(String);

impl DocId {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        let secs = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let counter = next_counter();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        Self(hex_encode(&bytes))
    }

    /// Parse an identifier supplied by a client or read from storage.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidId`] unless the input is exactly
    /// 24 hexadecimal characters. Upper-case input is accepted and stored
    /// lower-case.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.len() != DOC_ID_LEN || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidId(value.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation second encoded in the first four bytes.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs = u32::from_str_radix(&self.0[..8], 16).ok()?;
        Utc.timestamp_opt(i64::from(secs), 0).single()
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DocId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DocId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
