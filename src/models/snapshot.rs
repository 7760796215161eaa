// Snapshot query parameters and results

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::NormalizedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Orient an ascending comparison result.
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Search, sort and page parameters for one snapshot fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotQuery {
    #[serde(default)]
    pub search: Option<String>,
    pub sort_by: String,
    #[serde(default)]
    pub sort_dir: SortDirection,
    pub limit: usize,
}

impl SnapshotQuery {
    pub fn new(sort_by: impl Into<String>, sort_dir: SortDirection, limit: usize) -> Self {
        Self {
            search: None,
            sort_by: sort_by.into(),
            sort_dir,
            limit,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Lower-cased search term; blank terms mean no filtering.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Records in requested order, capped at the query limit, plus the uncapped match count.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: Vec<NormalizedRecord>,
    pub total: usize,
}
