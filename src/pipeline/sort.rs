// Stable ordering of normalized records by one field.
//
// Integers order numerically and text orders lexicographically. Anything that is
// not an integer ranks as magnitude 0 against integers, so mixed-type fields
// (an `os_pid` of `undefined` next to real pids) still sort without failing.

use crate::models::{NormalizedRecord, SortDirection, Value};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    magnitude: i64,
    text: Option<String>,
}

fn sort_key(value: Option<&Value>) -> SortKey {
    match value {
        Some(Value::Int(n)) => SortKey {
            magnitude: *n,
            text: None,
        },
        Some(other) => SortKey {
            magnitude: 0,
            text: Some(other.to_text()),
        },
        None => SortKey {
            magnitude: 0,
            text: None,
        },
    }
}

/// Equal keys keep their input (enumeration) order in both directions.
pub fn sort_records(
    records: Vec<NormalizedRecord>,
    field: &str,
    direction: SortDirection,
) -> Vec<NormalizedRecord> {
    let mut keyed: Vec<(SortKey, NormalizedRecord)> = records
        .into_iter()
        .map(|r| (sort_key(r.get(field)), r))
        .collect();
    keyed.sort_by(|a, b| direction.apply(a.0.cmp(&b.0)));
    keyed.into_iter().map(|(_, r)| r).collect()
}
