use crate::key::{self, RelationKey};
use reldb_core::model::Relation;
use std::collections::BTreeMap;
use tracing::trace;

/// Ordered dual index over weighted, typed relations.
///
/// `forward` is keyed by `(source, target, type)` and `reverse` by
/// `(target, source, type)`. Both entries of a relation are always written and
/// erased together. Per-node lookups are prefix scans: all keys sharing a
/// leading 8-byte field sort contiguously, so a lower-bound seek followed by a
/// forward walk yields exactly that node's relations.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    forward: BTreeMap<RelationKey, f64>,
    reverse: BTreeMap<RelationKey, f64>,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self {
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }

    /// Inserts a relation, replacing the weight of an existing one.
    pub fn insert(&mut self, source: u64, target: u64, rel_type: u16, weight: f64) {
        trace!(source, target, rel_type, weight, "insert relation");
        self.forward.insert(key::pack(source, target, rel_type), weight);
        self.reverse.insert(key::pack(target, source, rel_type), weight);
    }

    /// Removes a relation from both indexes. Returns the weight it had, if any.
    pub fn remove(&mut self, source: u64, target: u64, rel_type: u16) -> Option<f64> {
        trace!(source, target, rel_type, "remove relation");
        let removed = self.forward.remove(&key::pack(source, target, rel_type));
        self.reverse.remove(&key::pack(target, source, rel_type));
        removed
    }

    /// Forward keys `(source, target, type)` of every relation leaving `source`,
    /// in ascending key order.
    pub fn get(&self, source: u64) -> Vec<RelationKey> {
        scan(&self.forward, source).map(|(key, _)| *key).collect()
    }

    /// Reverse keys `(target, source, type)` of every relation entering `target`,
    /// in ascending key order.
    pub fn reverse_get(&self, target: u64) -> Vec<RelationKey> {
        scan(&self.reverse, target).map(|(key, _)| *key).collect()
    }

    /// Weight stored under a forward key, `None` if no such relation exists.
    pub fn get_weight(&self, key: &RelationKey) -> Option<f64> {
        self.forward.get(key).copied()
    }

    /// Weight stored under a reverse key.
    pub fn reverse_weight(&self, key: &RelationKey) -> Option<f64> {
        self.reverse.get(key).copied()
    }

    /// Collapses absence to `0.0`, matching the C boundary.
    pub fn weight_or_default(&self, key: &RelationKey) -> f64 {
        self.get_weight(key).unwrap_or(0.0)
    }

    pub fn contains(&self, key: &RelationKey) -> bool {
        self.forward.contains_key(key)
    }

    /// Decoded relations leaving `source`, ordered by `(target, type)`.
    pub fn outgoing(&self, source: u64) -> impl Iterator<Item = Relation> + '_ {
        scan(&self.forward, source).map(|(key, weight)| {
            let (source, target, rel_type) = key.unpack();
            Relation::new(source, target, rel_type, *weight)
        })
    }

    /// Decoded relations entering `target`, ordered by `(source, type)`.
    pub fn incoming(&self, target: u64) -> impl Iterator<Item = Relation> + '_ {
        scan(&self.reverse, target).map(|(key, weight)| {
            // Reverse keys lead with the target.
            let (target, source, rel_type) = key.unpack();
            Relation::new(source, target, rel_type, *weight)
        })
    }

    /// Every relation, in forward key order.
    pub fn relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.forward.iter().map(|(key, weight)| {
            let (source, target, rel_type) = key.unpack();
            Relation::new(source, target, rel_type, *weight)
        })
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }
}

/// Walks `map` from the first key `>= pack(node, 0, 0)` while the leading field
/// still equals `node`.
fn scan(map: &BTreeMap<RelationKey, f64>, node: u64) -> impl Iterator<Item = (&RelationKey, &f64)> {
    map.range(key::pack(node, 0, 0)..)
        .take_while(move |(key, _)| key.unpack_first() == node)
}

impl Extend<Relation> for RelationIndex {
    fn extend<I: IntoIterator<Item = Relation>>(&mut self, iter: I) {
        for relation in iter {
            self.insert(relation.source, relation.target, relation.rel_type, relation.weight);
        }
    }
}

impl FromIterator<Relation> for RelationIndex {
    fn from_iter<I: IntoIterator<Item = Relation>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}
