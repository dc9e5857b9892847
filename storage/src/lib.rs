pub mod index;
pub mod key;

pub use index::RelationIndex;
pub use key::{pack, KeyError, RelationKey, KEY_SIZE};
