//! Pattern matcher: item + patterns → candidate triples.

use std::collections::HashSet;

use trellis_core::{Item, Triple};

use crate::pattern::Pattern;

/// Evaluate every pattern against `item`.
///
/// Output order is deterministic: patterns in the order given, then subject
/// fan-out, then object fan-out. Repeated triples keep their first position.
/// A pattern that cannot resolve a subject and an object contributes nothing.
pub fn match_item(item: &Item, patterns: &[Pattern]) -> Vec<Triple> {
    let mut seen = HashSet::new();
    let mut triples = Vec::new();

    for pattern in patterns {
        if pattern.predicate.trim().is_empty() || !pattern.when.holds(item) {
            continue;
        }

        let subjects = pattern.subject.resolve(item);
        let objects = pattern.object.resolve(item);
        if subjects.is_empty() || objects.is_empty() {
            tracing::trace!(item_id = %item.id, pattern = %pattern.name, "Pattern did not resolve");
            continue;
        }

        for subject in &subjects {
            for object in &objects {
                let triple = Triple::new(subject, &pattern.predicate, object);
                if seen.insert(triple.clone()) {
                    triples.push(triple);
                }
            }
        }
    }

    tracing::debug!(item_id = %item.id, triples = triples.len(), "Item matched");
    triples
}
