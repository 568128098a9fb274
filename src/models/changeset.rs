//! Record-level change sets between two snapshots
//!
//! Records are matched by identity key within each collection. A change set
//! produced by [`ChangeSet::between`] and replayed with [`ChangeSet::apply_to`]
//! on the same baseline yields the same records as the newer snapshot.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::snapshot::{CollectionKind, RecordCollection, Snapshot};
use crate::error::{PastificioError, PastificioResult};

/// What happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// One changed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordChange {
    pub collection: CollectionKind,
    pub record_id: String,
    pub kind: ChangeKind,
    /// New record value; absent for removals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Value>,
}

/// Differences of one snapshot against a baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub changes: Vec<RecordChange>,
    /// Filename of the full archive this change set is relative to
    #[serde(default)]
    pub base_version: Option<String>,
    /// Collection layout of the newer snapshot
    #[serde(default)]
    pub collections: Vec<CollectionKind>,
    /// Record ids of each collection of the newer snapshot, in its order
    #[serde(default)]
    pub record_order: Vec<(CollectionKind, Vec<String>)>,
    /// When the newer snapshot was captured
    pub captured_at: DateTime<Utc>,
    pub produced_at: DateTime<Utc>,
}

type KeyedCollection = Vec<(String, Value)>;

fn lookup<'a>(
    set: &'a [(CollectionKind, KeyedCollection)],
    kind: CollectionKind,
) -> BTreeMap<&'a str, &'a Value> {
    set.iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, records)| records.iter().map(|(id, v)| (id.as_str(), v)).collect())
        .unwrap_or_default()
}

fn keyed_collections(
    snapshot: &Snapshot,
) -> PastificioResult<Vec<(CollectionKind, KeyedCollection)>> {
    snapshot
        .collections()
        .iter()
        .map(|c| Ok((c.kind(), c.keyed_records()?)))
        .collect()
}

impl ChangeSet {
    /// Compute the record changes that turn `baseline` into `current`
    ///
    /// Changes are grouped per collection (baseline collections first, then
    /// collections new in `current`) and ordered by record id within a group.
    pub fn between(
        baseline: &Snapshot,
        current: &Snapshot,
        base_version: Option<String>,
    ) -> PastificioResult<Self> {
        let old = keyed_collections(baseline)?;
        let new = keyed_collections(current)?;

        let mut kinds: Vec<CollectionKind> = old.iter().map(|(k, _)| *k).collect();
        for (kind, _) in &new {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }

        let mut changes = Vec::new();
        for kind in kinds {
            let before = lookup(&old, kind);
            let after = lookup(&new, kind);

            let mut ids: Vec<&str> = before.keys().chain(after.keys()).copied().collect();
            ids.sort_unstable();
            ids.dedup();

            for id in ids {
                let change = match (before.get(id), after.get(id)) {
                    (None, Some(value)) => Some((ChangeKind::Added, Some((*value).clone()))),
                    (Some(_), None) => Some((ChangeKind::Removed, None)),
                    (Some(old_value), Some(new_value)) if old_value != new_value => {
                        Some((ChangeKind::Modified, Some((*new_value).clone())))
                    }
                    _ => None,
                };

                if let Some((change_kind, record)) = change {
                    changes.push(RecordChange {
                        collection: kind,
                        record_id: id.to_string(),
                        kind: change_kind,
                        record,
                    });
                }
            }
        }

        let record_order = new
            .iter()
            .map(|(kind, records)| (*kind, records.iter().map(|(id, _)| id.clone()).collect()))
            .collect();

        Ok(Self {
            changes,
            base_version,
            collections: current.collections().iter().map(RecordCollection::kind).collect(),
            record_order,
            captured_at: current.captured_at(),
            produced_at: Utc::now(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Count of (added, removed, modified) records
    pub fn summary(&self) -> (usize, usize, usize) {
        self.changes
            .iter()
            .fold((0, 0, 0), |(a, r, m), change| match change.kind {
                ChangeKind::Added => (a + 1, r, m),
                ChangeKind::Removed => (a, r + 1, m),
                ChangeKind::Modified => (a, r, m + 1),
            })
    }

    /// Replay the changes on top of `baseline`
    ///
    /// Records come out in the order of the newer snapshot. A change set
    /// without a recorded order keeps surviving records at their baseline
    /// position and appends added ones.
    pub fn apply_to(&self, baseline: &Snapshot) -> PastificioResult<Snapshot> {
        let mut by_collection: HashMap<CollectionKind, Vec<&RecordChange>> = HashMap::new();
        for change in &self.changes {
            by_collection.entry(change.collection).or_default().push(change);
        }

        let mut layout = self.collections.clone();
        if layout.is_empty() {
            // Change sets without a recorded layout keep the baseline's
            layout = baseline.collections().iter().map(RecordCollection::kind).collect();
            for change in &self.changes {
                if !layout.contains(&change.collection) {
                    layout.push(change.collection);
                }
            }
        }

        let mut collections = Vec::with_capacity(layout.len());
        for kind in layout {
            let mut records: KeyedCollection = match baseline.collection(kind) {
                Some(collection) => collection.keyed_records()?,
                None => Vec::new(),
            };

            for change in by_collection.remove(&kind).unwrap_or_default() {
                let position = records.iter().position(|(id, _)| *id == change.record_id);
                match (change.kind, position, &change.record) {
                    (ChangeKind::Removed, Some(index), _) => {
                        records.remove(index);
                    }
                    (ChangeKind::Modified, Some(index), Some(value))
                    | (ChangeKind::Added, Some(index), Some(value)) => {
                        records[index].1 = value.clone();
                    }
                    (ChangeKind::Modified, None, Some(value))
                    | (ChangeKind::Added, None, Some(value)) => {
                        records.push((change.record_id.clone(), value.clone()));
                    }
                    _ => {}
                }
            }

            let order = self.record_order.iter().find(|(k, _)| *k == kind);
            let values = match order {
                Some((_, order)) => arrange(kind, records, order)?,
                None => records.into_iter().map(|(_, value)| value).collect(),
            };
            collections.push(RecordCollection::from_values(kind, values)?);
        }

        Ok(Snapshot::new(self.captured_at, collections))
    }
}

/// Put replayed records in `order`, which must name each of them once
fn arrange(
    kind: CollectionKind,
    records: KeyedCollection,
    order: &[String],
) -> PastificioResult<Vec<Value>> {
    let mismatch = || {
        PastificioError::Validation(format!(
            "Replayed {} do not match the recorded order",
            kind.as_str()
        ))
    };

    if records.len() != order.len() {
        return Err(mismatch());
    }
    let mut by_id: HashMap<String, Value> = records.into_iter().collect();
    order
        .iter()
        .map(|id| by_id.remove(id).ok_or_else(mismatch))
        .collect()
}
