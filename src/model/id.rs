//! # Record Identifier
//!
//! Opaque 12-byte identifier assigned to every armor and weapon record.
//! Rendered as 24 lowercase hexadecimal characters on the wire.
//!
//! Layout of a generated id:
//! - bytes 0..4: seconds since the Unix epoch (big-endian)
//! - bytes 4..9: per-process random value
//! - bytes 9..12: per-process counter (big-endian, wraps at 2^24)

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Raw identifier length in bytes
pub const ID_LEN: usize = 12;

/// Length of the hexadecimal form
pub const ID_HEX_LEN: usize = ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Identifier parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the provided hex string {0:?} is not a valid identifier (expected {ID_HEX_LEN} hexadecimal characters)")]
pub struct IdError(pub String);

/// Unique, server-assigned record identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GearId([u8; ID_LEN]);

impl GearId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp() as u32;
        let process = PROCESS_UNIQUE.get_or_init(rand::random::<[u8; 5]>);
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
            .fetch_add(1, Ordering::Relaxed)
            & COUNTER_MASK;

        let mut bytes = [0u8; ID_LEN];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; ID_LEN] {
        self.0
    }

    /// Parse the 24-character hexadecimal form
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.len() != ID_HEX_LEN {
            return Err(IdError(s.to_string()));
        }

        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| IdError(s.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// True for the all-zero id a body without `_id` decodes to
    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }

    /// Creation second embedded in the id
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(seconds), 0)
            .single()
            .unwrap_or_default()
    }
}

impl FromStr for GearId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for GearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GearId({})", self.to_hex())
    }
}

impl Serialize for GearId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for GearId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GearIdVisitor;

        impl<'de> Visitor<'de> for GearIdVisitor {
            type Value = GearId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a {}-character hexadecimal identifier", ID_HEX_LEN)
            }

            /// An empty string is the nil id
            fn visit_str<E: de::Error>(self, v: &str) -> Result<GearId, E> {
                if v.is_empty() {
                    return Ok(GearId::default());
                }
                GearId::parse(v).map_err(E::custom)
            }

            fn visit_unit<E: de::Error>(self) -> Result<GearId, E> {
                Ok(GearId::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<GearId, E> {
                Ok(GearId::default())
            }

            fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<GearId, D::Error> {
                deserializer.deserialize_any(self)
            }
        }

        deserializer.deserialize_any(GearIdVisitor)
    }
}
