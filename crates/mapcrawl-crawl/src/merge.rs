//! Case-insensitive deduplicating merge and the owned record collection.

use std::collections::HashSet;

use mapcrawl_core::Record;
use mapcrawl_store::JsonSlot;

/// Append the `incoming` records whose lower-cased name is not already in
/// `existing`.
///
/// Order is preserved on both sides: `existing` first, then the surviving
/// `incoming` records in their original order. Only names already in
/// `existing` are filtered; repeats inside one `incoming` batch are kept.
#[must_use]
pub fn merge(mut existing: Vec<Record>, incoming: Vec<Record>) -> Vec<Record> {
    let known: HashSet<String> = existing.iter().map(Record::dedup_key).collect();
    existing.extend(
        incoming
            .into_iter()
            .filter(|r| !known.contains(&r.dedup_key())),
    );
    existing
}

/// The accumulated collection, the only place records are added or cleared.
///
/// Every change is mirrored to the backup slot when one is attached. Backup
/// failures are logged and otherwise ignored.
#[derive(Debug, Default)]
pub struct Accumulator {
    records: Vec<Record>,
    backup: Option<JsonSlot>,
}

impl Accumulator {
    /// An accumulator with no backup slot.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Start from whatever the slot holds and mirror future changes to it.
    #[must_use]
    pub fn restore(slot: JsonSlot) -> Self {
        let records = slot.load();
        Self {
            records,
            backup: Some(slot),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Merge `incoming` into the collection and return how many were added.
    ///
    /// Repeats inside `incoming` collapse to their first occurrence, so no
    /// two stored records ever share a case-insensitive name.
    pub fn absorb(&mut self, incoming: Vec<Record>) -> usize {
        let mut batch_keys = HashSet::new();
        let incoming: Vec<Record> = incoming
            .into_iter()
            .filter(|r| batch_keys.insert(r.dedup_key()))
            .collect();

        let before = self.records.len();
        self.records = merge(std::mem::take(&mut self.records), incoming);
        let added = self.records.len() - before;
        if added > 0 {
            self.persist();
        }
        added
    }

    /// Drop every record, in memory and in the backup slot.
    pub fn clear(&mut self) {
        self.records.clear();
        if let Some(slot) = &self.backup {
            if let Err(e) = slot.clear() {
                tracing::warn!(error = %e, "failed to clear backup slot");
            }
        }
    }

    fn persist(&self) {
        if let Some(slot) = &self.backup {
            if let Err(e) = slot.save(&self.records) {
                tracing::warn!(error = %e, count = self.records.len(), "failed to write backup slot");
            }
        }
    }
}
