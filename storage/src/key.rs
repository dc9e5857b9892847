//! Fixed-width key codec for relation indexes.
//!
//! A key is `first (u64) ++ second (u64) ++ third (u16)`, each field written
//! big-endian. Byte-lexicographic order of keys therefore matches numeric order
//! of `(first, second, third)`, and every key sharing `first` sorts into one
//! contiguous run. The forward index stores `(source, target, type)`, the
//! reverse index `(target, source, type)`.

use reldb_core::error::{ErrorCode, RelDbError};
use std::fmt;
use std::ops::Range;
use thiserror::Error;

pub const KEY_SIZE: usize = 18;

/// Bumped whenever the byte layout below changes.
pub const KEY_FORMAT_VERSION: u8 = 1;

const FIRST: Range<usize> = 0..8;
const SECOND: Range<usize> = 8..16;
const THIRD: Range<usize> = 16..KEY_SIZE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl RelDbError for KeyError {
    fn error_code(&self) -> ErrorCode {
        match self {
            KeyError::InvalidLength { .. } => ErrorCode::InvalidArgument,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationKey([u8; KEY_SIZE]);

/// Encodes a triple into its 18-byte key.
pub fn pack(first: u64, second: u64, third: u16) -> RelationKey {
    let mut bytes = [0u8; KEY_SIZE];
    bytes[FIRST].copy_from_slice(&first.to_be_bytes());
    bytes[SECOND].copy_from_slice(&second.to_be_bytes());
    bytes[THIRD].copy_from_slice(&third.to_be_bytes());
    RelationKey(bytes)
}

/// The leading 8 bytes shared by every key whose first field is `first`.
pub fn prefix(first: u64) -> [u8; 8] {
    first.to_be_bytes()
}

impl RelationKey {
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        <[u8; KEY_SIZE]>::try_from(bytes)
            .map(Self)
            .map_err(|_| KeyError::InvalidLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; KEY_SIZE] {
        self.0
    }

    pub fn unpack_first(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.0[FIRST]);
        u64::from_be_bytes(buf)
    }

    pub fn unpack_second(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.0[SECOND]);
        u64::from_be_bytes(buf)
    }

    pub fn unpack_third(&self) -> u16 {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(&self.0[THIRD]);
        u16::from_be_bytes(buf)
    }

    pub fn unpack(&self) -> (u64, u64, u16) {
        (self.unpack_first(), self.unpack_second(), self.unpack_third())
    }

    pub fn has_prefix(&self, first: u64) -> bool {
        self.0[FIRST] == prefix(first)
    }

    /// The same relation keyed from the other endpoint.
    pub fn mirrored(&self) -> Self {
        pack(self.unpack_second(), self.unpack_first(), self.unpack_third())
    }
}

impl TryFrom<&[u8]> for RelationKey {
    type Error = KeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl From<[u8; KEY_SIZE]> for RelationKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RelationKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RelationKey")
            .field(&self.unpack_first())
            .field(&self.unpack_second())
            .field(&self.unpack_third())
            .finish()
    }
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}
