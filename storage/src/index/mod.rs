pub mod relation;

pub use relation::RelationIndex;
