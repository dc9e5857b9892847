use reldb_core::config::StoreConfig;
use reldb_core::error::{ErrorCode, RelDbError};
use reldb_core::model::{NamedRelation, Relation};
use reldb_storage::RelationIndex;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("database already exists: {0}")]
    DatabaseExists(String),
    #[error("database not found: {0}")]
    DatabaseNotFound(String),
    #[error("no database selected")]
    NoDatabaseSelected,
    #[error("relation type registry is full")]
    TypeRegistryFull,
    #[error("unknown relation type id: {0}")]
    UnknownRelationType(u16),
}

impl RelDbError for StoreError {
    fn error_code(&self) -> ErrorCode {
        match self {
            StoreError::DatabaseExists(_) => ErrorCode::AlreadyExists,
            StoreError::DatabaseNotFound(_) => ErrorCode::NotFound,
            StoreError::NoDatabaseSelected => ErrorCode::FailedPrecondition,
            StoreError::TypeRegistryFull => ErrorCode::ResourceExhausted,
            StoreError::UnknownRelationType(_) => ErrorCode::Internal,
        }
    }
}

/// Interns relation type names as `u16` ids, starting at 1 in first-use order.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    ids: HashMap<String, u16>,
    names: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Result<u16, StoreError> {
        if let Some(id) = self.ids.get(name) {
            return Ok(*id);
        }
        let id = u16::try_from(self.names.len() + 1).map_err(|_| StoreError::TypeRegistryFull)?;
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        Ok(id)
    }

    pub fn id(&self, name: &str) -> Option<u16> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: u16) -> Option<&str> {
        let slot = usize::from(id).checked_sub(1)?;
        self.names.get(slot).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Named relation indexes sharing one type-name registry, with one selected
/// database receiving inserts, removals and queries.
#[derive(Debug, Default)]
pub struct RelationStore {
    databases: HashMap<String, RelationIndex>,
    selected: Option<String>,
    types: TypeRegistry,
}

impl RelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store, creating and selecting `default_database` when set.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut store = Self::new();
        if let Some(name) = &config.default_database {
            store.create_db(name)?;
            store.select_db(name)?;
        }
        Ok(store)
    }

    pub fn create_db(&mut self, name: &str) -> Result<(), StoreError> {
        if self.databases.contains_key(name) {
            return Err(StoreError::DatabaseExists(name.to_owned()));
        }
        debug!(database = name, "create database");
        self.databases.insert(name.to_owned(), RelationIndex::new());
        Ok(())
    }

    /// Drops a database and all of its relations. Clears the selection if it
    /// pointed at `name`.
    pub fn destroy_db(&mut self, name: &str) -> Result<(), StoreError> {
        let index = self
            .databases
            .remove(name)
            .ok_or_else(|| StoreError::DatabaseNotFound(name.to_owned()))?;
        debug!(database = name, relations = index.len(), "destroy database");
        if self.selected.as_deref() == Some(name) {
            self.selected = None;
        }
        Ok(())
    }

    pub fn select_db(&mut self, name: &str) -> Result<(), StoreError> {
        if !self.databases.contains_key(name) {
            return Err(StoreError::DatabaseNotFound(name.to_owned()));
        }
        debug!(database = name, "select database");
        self.selected = Some(name.to_owned());
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn database(&self, name: &str) -> Option<&RelationIndex> {
        self.databases.get(name)
    }

    pub fn database_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.databases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn insert(
        &mut self,
        source: u64,
        target: u64,
        rel_type: &str,
        weight: f64,
    ) -> Result<(), StoreError> {
        let name = self.selected.as_deref().ok_or(StoreError::NoDatabaseSelected)?;
        let index = self
            .databases
            .get_mut(name)
            .ok_or_else(|| StoreError::DatabaseNotFound(name.to_owned()))?;
        let id = self.types.intern(rel_type)?;
        index.insert(source, target, id, weight);
        Ok(())
    }

    /// Removes a relation from the selected database. Returns whether it existed.
    /// An unregistered type name cannot match anything and is not interned.
    pub fn remove(&mut self, source: u64, target: u64, rel_type: &str) -> Result<bool, StoreError> {
        let name = self.selected.as_deref().ok_or(StoreError::NoDatabaseSelected)?;
        let index = self
            .databases
            .get_mut(name)
            .ok_or_else(|| StoreError::DatabaseNotFound(name.to_owned()))?;
        let Some(id) = self.types.id(rel_type) else {
            return Ok(false);
        };
        let removed = index.remove(source, target, id).is_some();
        if removed {
            debug!(database = name, source, target, rel_type, "removed relation");
        }
        Ok(removed)
    }

    /// Relations leaving `source` in the selected database.
    pub fn get(&self, source: u64) -> Result<Vec<NamedRelation>, StoreError> {
        let index = self.selected_index()?;
        self.resolve(index.outgoing(source))
    }

    /// Relations entering `target` in the selected database.
    pub fn reverse_get(&self, target: u64) -> Result<Vec<NamedRelation>, StoreError> {
        let index = self.selected_index()?;
        self.resolve(index.incoming(target))
    }

    fn selected_index(&self) -> Result<&RelationIndex, StoreError> {
        let name = self.selected.as_deref().ok_or(StoreError::NoDatabaseSelected)?;
        self.databases
            .get(name)
            .ok_or_else(|| StoreError::DatabaseNotFound(name.to_owned()))
    }

    fn resolve(
        &self,
        relations: impl Iterator<Item = Relation>,
    ) -> Result<Vec<NamedRelation>, StoreError> {
        relations
            .map(|relation| {
                self.types
                    .name(relation.rel_type)
                    .map(|name| relation.named(name))
                    .ok_or(StoreError::UnknownRelationType(relation.rel_type))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids_start_at_one() {
        let mut registry = TypeRegistry::new();
        assert_eq!(registry.intern("access").unwrap(), 1);
        assert_eq!(registry.intern("owns").unwrap(), 2);
        assert_eq!(registry.intern("access").unwrap(), 1);
        assert_eq!(registry.name(2), Some("owns"));
        assert_eq!(registry.name(0), None);
        assert_eq!(registry.name(3), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_type_registry_exhaustion() {
        let mut registry = TypeRegistry::new();
        for i in 0..u16::MAX {
            registry.intern(&i.to_string()).unwrap();
        }
        assert_eq!(registry.intern("0").unwrap(), 1);
        assert_eq!(registry.intern("overflow"), Err(StoreError::TypeRegistryFull));
        assert_eq!(registry.len(), usize::from(u16::MAX));
    }

    #[test]
    fn test_requires_selected_database() {
        let mut store = RelationStore::new();
        assert_eq!(
            store.insert(1, 2, "access", 1.0),
            Err(StoreError::NoDatabaseSelected)
        );
        assert_eq!(store.get(1), Err(StoreError::NoDatabaseSelected));
        assert_eq!(
            StoreError::NoDatabaseSelected.error_code(),
            ErrorCode::FailedPrecondition
        );
    }

    #[test]
    fn test_remove_with_unknown_type_does_not_intern() {
        let mut store = RelationStore::new();
        store.create_db("debug").unwrap();
        store.select_db("debug").unwrap();

        assert_eq!(store.remove(1, 2, "never-seen"), Ok(false));
        assert!(store.types().is_empty());
    }
}
