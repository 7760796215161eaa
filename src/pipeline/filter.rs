// Case-insensitive substring search over class-specific fields

use super::ResourceClass;
use crate::models::NormalizedRecord;

/// `term` must already be lower-cased. No term matches everything.
pub fn matches(class: ResourceClass, record: &NormalizedRecord, term: Option<&str>) -> bool {
    let Some(term) = term else {
        return true;
    };
    class.search_fields().iter().any(|field| {
        record
            .get(*field)
            .is_some_and(|v| v.to_text().to_lowercase().contains(term))
    })
}
