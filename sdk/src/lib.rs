//! Host-facing surface of reldb: the C ABI in [`ffi`] and the named,
//! string-typed [`RelationStore`] for Rust hosts.

pub mod ffi;
pub mod store;

pub use ffi::{KeyVector, OwnedKeyVector};
pub use reldb_core::config::{RelDbConfig, StoreConfig};
pub use reldb_core::error::{ErrorCode, RelDbError};
pub use reldb_core::model::{NamedRelation, Relation};
pub use reldb_storage::key::{pack, KeyError, RelationKey, KEY_FORMAT_VERSION, KEY_SIZE};
pub use reldb_storage::RelationIndex;
pub use store::{RelationStore, StoreError, TypeRegistry};
