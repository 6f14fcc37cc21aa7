use std::collections::BTreeSet;

use crate::field::Filterable;
use crate::spec::FilterSpec;

/// Returns the records satisfying every active predicate in `spec`, in input
/// order.
///
/// When `spec` is entirely at its defaults the input is returned unchanged.
#[must_use]
pub fn apply<T: Filterable + Clone>(records: &[T], spec: &FilterSpec) -> Vec<T> {
    if spec.is_default() {
        return records.to_vec();
    }

    let keyword = spec
        .keyword
        .as_deref()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty());
    let active: Vec<_> = spec.active().collect();

    let kept: Vec<T> = records
        .iter()
        .filter(|record| {
            active
                .iter()
                .all(|(field, predicate)| predicate.matches(record.field(field).as_ref()))
        })
        .filter(|record| keyword.as_deref().map_or(true, |k| matches_keyword(*record, k)))
        .cloned()
        .collect();

    tracing::debug!(
        input = records.len(),
        output = kept.len(),
        predicates = active.len(),
        "applied filter spec"
    );
    kept
}

fn matches_keyword<T: Filterable>(record: &T, keyword: &str) -> bool {
    record.keyword_fields().iter().any(|name| {
        record.field(name).is_some_and(|value| {
            value
                .display_values()
                .iter()
                .any(|v| v.to_lowercase().contains(keyword))
        })
    })
}

/// Sorted distinct non-empty values of `field` across `records`. List fields
/// are flattened.
#[must_use]
pub fn unique_values<T: Filterable>(records: &[T], field: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.field(field))
        .flat_map(|value| value.display_values())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
