//! Search API query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A Search API query.
///
/// Fields are declared in alphabetical order so the serialized JSON has a
/// stable key order; signed search URLs depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregate: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub with_field: Vec<String>,
    /// Pagination cursor; travels outside the serialized query.
    #[serde(skip)]
    pub next_cursor: Option<String>,
}

impl SearchQuery {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: Some(expression.into()),
            ..Default::default()
        }
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Add a sort clause, `direction` being `asc` or `desc`.
    pub fn sort_by(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        let mut clause = BTreeMap::new();
        clause.insert(field.into(), direction.into());
        self.sort_by.push(clause);
        self
    }

    pub fn aggregate(mut self, field: impl Into<String>) -> Self {
        push_unique(&mut self.aggregate, field.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        push_unique(&mut self.with_field, field.into());
        self
    }

    pub fn next_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.next_cursor = Some(cursor.into());
        self
    }

    /// Compact JSON of the query, without the cursor.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}
