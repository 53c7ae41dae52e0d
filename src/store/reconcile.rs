//! Full-batch reconciliation: existing records vs a freshly normalized batch.
//!
//! Pure set difference by external id. Records in both sets only land in the
//! update list when their content differs, which is what makes re-applying
//! an identical batch a no-op (inserted=0, updated=0, removed=0).

use std::collections::{HashMap, HashSet};

use crate::model::ExternalId;
use crate::store::WritePlan;

/// Diff a normalized batch against the records currently stored.
///
/// - only in the batch: insert
/// - in both, content differs: update (in place, preserving surrogate keys)
/// - in both, content equal: untouched
/// - only in storage: remove (hard delete)
pub fn reconcile<T>(existing: &[T], incoming: Vec<T>) -> WritePlan<T>
where
    T: ExternalId + PartialEq + Clone,
{
    let current: HashMap<String, &T> = existing
        .iter()
        .map(|record| (record.external_id(), record))
        .collect();

    let mut plan = WritePlan {
        insert: Vec::new(),
        update: Vec::new(),
        remove: Vec::new(),
    };

    let mut seen: HashSet<String> = HashSet::with_capacity(incoming.len());

    for record in incoming {
        let id = record.external_id();
        seen.insert(id.clone());

        match current.get(&id) {
            None => plan.insert.push(record),
            Some(stored) if **stored != record => plan.update.push(record),
            Some(_) => {}
        }
    }

    plan.remove = existing
        .iter()
        .map(ExternalId::external_id)
        .filter(|id| !seen.contains(id))
        .collect();
    plan.remove.sort();

    plan
}
