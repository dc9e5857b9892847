use serde::{Deserialize, Serialize};

/// A decoded relation as stored in a relation index: numeric type id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub source: u64,
    pub target: u64,
    #[serde(rename = "type")]
    pub rel_type: u16,
    pub weight: f64,
}

/// A relation whose type id has been resolved back to its registered name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRelation {
    pub source: u64,
    pub target: u64,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub weight: f64,
}

impl Relation {
    pub fn new(source: u64, target: u64, rel_type: u16, weight: f64) -> Self {
        Self {
            source,
            target,
            rel_type,
            weight,
        }
    }

    pub fn named(self, rel_type: impl Into<String>) -> NamedRelation {
        NamedRelation {
            source: self.source,
            target: self.target,
            rel_type: rel_type.into(),
            weight: self.weight,
        }
    }
}

impl NamedRelation {
    pub fn new(source: u64, target: u64, rel_type: impl Into<String>, weight: f64) -> Self {
        Self {
            source,
            target,
            rel_type: rel_type.into(),
            weight,
        }
    }
}
