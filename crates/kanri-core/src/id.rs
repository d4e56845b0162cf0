use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CoreError;

const RECORD_ID_BYTES: usize = 12;
const RECORD_ID_HEX_LEN: usize = 2 * RECORD_ID_BYTES;

fn decode_hex_id(s: &str) -> Result<[u8; RECORD_ID_BYTES], CoreError> {
    if s.len() != RECORD_ID_HEX_LEN {
        return Err(CoreError::InvalidRecordId(format!(
            "expected {RECORD_ID_HEX_LEN} hex characters, got {}",
            s.len()
        )));
    }
    let bytes = hex::decode(s).map_err(|e| CoreError::InvalidRecordId(e.to_string()))?;
    let arr: [u8; RECORD_ID_BYTES] = bytes
        .try_into()
        .map_err(|_| CoreError::InvalidRecordId("expected 12 bytes".into()))?;
    Ok(arr)
}

/// 4-byte unix-seconds prefix keeps ids roughly creation-ordered,
/// the random suffix makes collisions negligible.
fn generate_id() -> [u8; RECORD_ID_BYTES] {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32;
    let mut out = [0u8; RECORD_ID_BYTES];
    out[..4].copy_from_slice(&secs.to_be_bytes());
    out[4..].copy_from_slice(&rand::random::<[u8; 8]>());
    out
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChangeRequestId([u8; RECORD_ID_BYTES]);

impl ChangeRequestId {
    pub fn new() -> Self {
        Self(generate_id())
    }

    pub fn from_bytes(bytes: [u8; RECORD_ID_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_ID_BYTES] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        Ok(Self(decode_hex_id(s)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ChangeRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChangeRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ChangeRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeRequestId({})", self.to_hex())
    }
}

impl Serialize for ChangeRequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChangeRequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId([u8; RECORD_ID_BYTES]);

impl UserId {
    pub fn new() -> Self {
        Self(generate_id())
    }

    pub fn from_bytes(bytes: [u8; RECORD_ID_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_ID_BYTES] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        Ok(Self(decode_hex_id(s)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.to_hex())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId([u8; RECORD_ID_BYTES]);

impl NotificationId {
    pub fn new() -> Self {
        Self(generate_id())
    }

    pub fn from_bytes(bytes: [u8; RECORD_ID_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_ID_BYTES] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        Ok(Self(decode_hex_id(s)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotificationId({})", self.to_hex())
    }
}

impl Serialize for NotificationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for NotificationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}
