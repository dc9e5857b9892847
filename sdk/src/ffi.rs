//! C ABI over [`RelationIndex`].
//!
//! Handles returned by [`create_db`] are owned by the caller until passed to
//! [`destroy_db`]. Key buffers returned by [`reldb_get`] and
//! [`reldb_reverse_get`] are owned by the caller until passed, exactly once, to
//! [`reldb_free_key_vector`]. Null handles and null buffers are tolerated:
//! queries return an empty result or `0.0`, mutations do nothing.
//!
//! Rust hosts can wrap a returned buffer in [`OwnedKeyVector`] to have it
//! released on drop.

use reldb_core::config::RelDbConfig;
use reldb_storage::key::{RelationKey, KEY_SIZE};
use reldb_storage::RelationIndex;
use std::ptr::{self, NonNull};
use tracing::{debug, warn};

/// A caller-owned array of `n` pointers, each to an 18-byte key.
#[repr(C)]
#[derive(Debug)]
pub struct KeyVector {
    pub n: u64,
    pub data: *mut *mut u8,
}

/// Loads configuration and installs the tracing subscriber.
/// Returns `false` when a subscriber was already installed.
#[no_mangle]
pub extern "C" fn reldb_init_logging() -> bool {
    let config = RelDbConfig::load().unwrap_or_else(|err| {
        eprintln!("reldb: falling back to default config: {err}");
        RelDbConfig::default()
    });
    reldb_core::init_tracing(&config.logging)
}

#[no_mangle]
pub extern "C" fn reldb_key_size() -> usize {
    KEY_SIZE
}

#[no_mangle]
pub extern "C" fn create_db() -> *mut RelationIndex {
    let handle = Box::into_raw(Box::new(RelationIndex::new()));
    debug!(?handle, "created relation index");
    handle
}

/// # Safety
///
/// `handle` must be null or a pointer returned by [`create_db`] that has not
/// been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn destroy_db(handle: *mut RelationIndex) {
    if handle.is_null() {
        return;
    }
    debug!(?handle, "destroying relation index");
    drop(unsafe { Box::from_raw(handle) });
}

/// # Safety
///
/// `handle` must be null or a live handle from [`create_db`].
#[no_mangle]
pub unsafe extern "C" fn reldb_insert(
    handle: *mut RelationIndex,
    source: u64,
    target: u64,
    rel_type: u16,
    weight: f64,
) {
    if let Some(index) = unsafe { handle.as_mut() } {
        index.insert(source, target, rel_type, weight);
    }
}

/// # Safety
///
/// `handle` must be null or a live handle from [`create_db`].
#[no_mangle]
pub unsafe extern "C" fn reldb_remove(
    handle: *mut RelationIndex,
    source: u64,
    target: u64,
    rel_type: u16,
) {
    if let Some(index) = unsafe { handle.as_mut() } {
        index.remove(source, target, rel_type);
    }
}

/// # Safety
///
/// `handle` must be null or a live handle from [`create_db`]. The result must
/// be released with [`reldb_free_key_vector`].
#[no_mangle]
pub unsafe extern "C" fn reldb_get(handle: *const RelationIndex, source: u64) -> *mut KeyVector {
    let keys = unsafe { handle.as_ref() }
        .map(|index| index.get(source))
        .unwrap_or_default();
    into_key_vector(keys)
}

/// # Safety
///
/// Same contract as [`reldb_get`].
#[no_mangle]
pub unsafe extern "C" fn reldb_reverse_get(
    handle: *const RelationIndex,
    target: u64,
) -> *mut KeyVector {
    let keys = unsafe { handle.as_ref() }
        .map(|index| index.reverse_get(target))
        .unwrap_or_default();
    into_key_vector(keys)
}

/// Weight of the forward relation encoded in `key`, `0.0` if absent.
///
/// # Safety
///
/// `handle` must be null or a live handle from [`create_db`]; `key` must be
/// null or point to at least 18 readable bytes.
#[no_mangle]
pub unsafe extern "C" fn reldb_get_weight(handle: *const RelationIndex, key: *const u8) -> f64 {
    match (unsafe { handle.as_ref() }, unsafe { read_key(key) }) {
        (Some(index), Some(key)) => index.weight_or_default(&key),
        _ => 0.0,
    }
}

/// Whether a forward relation is stored under `key`. Distinguishes a stored
/// `0.0` weight from an absent relation.
///
/// # Safety
///
/// Same contract as [`reldb_get_weight`].
#[no_mangle]
pub unsafe extern "C" fn reldb_contains(handle: *const RelationIndex, key: *const u8) -> bool {
    match (unsafe { handle.as_ref() }, unsafe { read_key(key) }) {
        (Some(index), Some(key)) => index.contains(&key),
        _ => false,
    }
}

/// # Safety
///
/// `handle` must be null or a live handle from [`create_db`].
#[no_mangle]
pub unsafe extern "C" fn reldb_len(handle: *const RelationIndex) -> u64 {
    unsafe { handle.as_ref() }.map_or(0, |index| index.len() as u64)
}

/// Releases every key, the pointer array and the container.
///
/// # Safety
///
/// `vec` must be null or a buffer returned by [`reldb_get`] or
/// [`reldb_reverse_get`] that has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn reldb_free_key_vector(vec: *mut KeyVector) {
    if vec.is_null() {
        return;
    }
    let vec = unsafe { Box::from_raw(vec) };
    if vec.data.is_null() {
        if vec.n != 0 {
            warn!(n = vec.n, "key vector with null data and non-zero length");
        }
        return;
    }
    let data = unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(vec.data, vec.n as usize)) };
    for &key in data.iter() {
        if !key.is_null() {
            drop(unsafe { Box::from_raw(key.cast::<[u8; KEY_SIZE]>()) });
        }
    }
}

fn into_key_vector(keys: Vec<RelationKey>) -> *mut KeyVector {
    let data: Box<[*mut u8]> = keys
        .into_iter()
        .map(|key| Box::into_raw(Box::new(key.into_bytes())).cast::<u8>())
        .collect();
    let n = data.len() as u64;
    let data = Box::into_raw(data).cast::<*mut u8>();
    Box::into_raw(Box::new(KeyVector { n, data }))
}

unsafe fn read_key(key: *const u8) -> Option<RelationKey> {
    if key.is_null() {
        return None;
    }
    let bytes = unsafe { ptr::read_unaligned(key.cast::<[u8; KEY_SIZE]>()) };
    Some(RelationKey::from_bytes(bytes))
}

/// Scoped owner of a [`KeyVector`] returned across the C boundary; frees it on
/// drop.
#[derive(Debug)]
pub struct OwnedKeyVector {
    raw: NonNull<KeyVector>,
}

impl OwnedKeyVector {
    /// Takes ownership of `raw`. Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `raw` must come from [`reldb_get`] or [`reldb_reverse_get`] and must not
    /// be freed by anyone else.
    pub unsafe fn from_raw(raw: *mut KeyVector) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw })
    }

    pub fn len(&self) -> usize {
        unsafe { self.raw.as_ref() }.n as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<RelationKey> {
        let vec = unsafe { self.raw.as_ref() };
        if vec.data.is_null() {
            return Vec::new();
        }
        let data = unsafe { std::slice::from_raw_parts(vec.data, vec.n as usize) };
        data.iter()
            .filter(|key| !key.is_null())
            .map(|&key| RelationKey::from_bytes(unsafe { ptr::read(key.cast::<[u8; KEY_SIZE]>()) }))
            .collect()
    }

    /// Gives the buffer back to the caller without freeing it.
    pub fn into_raw(self) -> *mut KeyVector {
        let raw = self.raw.as_ptr();
        std::mem::forget(self);
        raw
    }
}

impl Drop for OwnedKeyVector {
    fn drop(&mut self) {
        unsafe { reldb_free_key_vector(self.raw.as_ptr()) };
    }
}
