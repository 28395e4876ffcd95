//! Wire payloads — typed payload objects carried in bus messages.
//!
//! A bus [`Message`] carries one or more [`PayloadObject`]s. Each object is
//! tagged with a [`PoNum`] naming the schema of its contents, and the
//! contents are CBOR-encoded so the receiving side can decode named fields.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// Payload-type number, written in dotted form (`2.1.1.1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoNum(u32);

/// Meter readings: `Reading<u64>`.
pub const TIMESERIES_READING: PoNum = PoNum::from_octets([2, 0, 9, 16]);

/// Light info readings and light actuation commands.
pub const LIGHT_STATE: PoNum = PoNum::from_octets([2, 1, 1, 1]);

impl PoNum {
    /// Build a payload-type number from its four dotted octets.
    #[must_use]
    pub const fn from_octets(octets: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(octets))
    }

    /// The four dotted octets, most significant first.
    #[must_use]
    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PoNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl FromStr for PoNum {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PayloadError::InvalidPoNum(s.to_string());
        let mut octets = [0u8; 4];
        let mut parts = s.split('.');
        for octet in &mut octets {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *octet = part.parse().map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::from_octets(octets))
    }
}

/// One typed object inside a bus message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadObject {
    pub po_num: PoNum,
    pub contents: Vec<u8>,
}

impl PayloadObject {
    /// Wrap already-encoded contents.
    #[must_use]
    pub fn new(po_num: PoNum, contents: Vec<u8>) -> Self {
        Self { po_num, contents }
    }

    /// Encode `value` as CBOR under `po_num`.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Encode`] if `value` cannot be serialized.
    pub fn encode<T: Serialize>(po_num: PoNum, value: &T) -> Result<Self, PayloadError> {
        let contents = serde_cbor::to_vec(value).map_err(PayloadError::Encode)?;
        Ok(Self { po_num, contents })
    }

    /// Decode the contents into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Decode`] if the contents are not a valid
    /// CBOR encoding of `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        serde_cbor::from_slice(&self.contents).map_err(PayloadError::Decode)
    }

    /// Whether the object carries no contents at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// A single message exchanged on the bus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub payload_objects: Vec<PayloadObject>,
}

impl Message {
    /// A message carrying a single payload object.
    #[must_use]
    pub fn single(po: PayloadObject) -> Self {
        Self {
            payload_objects: vec![po],
        }
    }

    /// First payload object tagged with `po_num`, if any.
    #[must_use]
    pub fn one_with_po(&self, po_num: PoNum) -> Option<&PayloadObject> {
        self.payload_objects.iter().find(|po| po.po_num == po_num)
    }

    /// Frame the whole message for a byte-oriented transport.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Encode`] if framing fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PayloadError> {
        serde_cbor::to_vec(self).map_err(PayloadError::Encode)
    }

    /// Parse a frame produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Decode`] if `bytes` is not a framed message.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PayloadError> {
        serde_cbor::from_slice(bytes).map_err(PayloadError::Decode)
    }
}
