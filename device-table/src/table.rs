//! Revisioned table storage
//!
//! - `RevisionedTable<Id, V>`: the shared table and its only two writers,
//!   `apply_update*` (delta) and `apply_snapshot*` (full replace)
//! - `Snapshot<Id, V>`: a point-in-time read of every entry
//! - `ApplyReport<Id>`: what an apply did

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, RwLock};

use crate::error::TableError;
use crate::event::{ChangeEvent, Revision, Sequence};
use crate::iter::ChangeIterator;

// ============================================================================
// Slot - one entry plus its bookkeeping
// ============================================================================

struct Slot<V> {
    value: Arc<V>,
    /// Revision of the apply that wrote this slot
    revision: Revision,
    /// Sequence of the request whose response wrote this slot
    sequence: Sequence,
}

impl<V> Clone for Slot<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            revision: self.revision,
            sequence: self.sequence,
        }
    }
}

struct Inner<Id, V> {
    slots: HashMap<Id, Slot<V>>,
    revision: Revision,
}

// ============================================================================
// ApplyReport
// ============================================================================

/// Outcome of a single apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport<Id> {
    /// Revision assigned to this apply
    pub revision: Revision,
    /// Sequence the apply ran under
    pub sequence: Sequence,
    /// Entries replaced with a fresh value
    pub applied: Vec<Id>,
    /// Entries skipped because a newer response already landed
    pub stale: Vec<Id>,
    /// Entries dropped by a full replace
    pub removed: Vec<Id>,
}

impl<Id> ApplyReport<Id> {
    fn new(revision: Revision, sequence: Sequence) -> Self {
        Self {
            revision,
            sequence,
            applied: Vec::new(),
            stale: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// True when nothing in the apply was discarded as stale
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Point-in-time copy of the table
///
/// Holds the same `Arc`s the table holds, so identity comparisons against
/// later reads are meaningful.
#[derive(Debug)]
pub struct Snapshot<Id, V> {
    pub revision: Revision,
    entries: HashMap<Id, Arc<V>>,
}

impl<Id, V> Clone for Snapshot<Id, V>
where
    Id: Clone,
{
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            entries: self.entries.clone(),
        }
    }
}

impl<Id, V> Snapshot<Id, V>
where
    Id: Eq + Hash,
{
    pub fn get(&self, id: &Id) -> Option<&Arc<V>> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id, &Arc<V>)> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.entries.keys()
    }

    /// Deep comparison of every value, ignoring identity and revision
    pub fn value_eq(&self, other: &Self) -> bool
    where
        V: PartialEq,
    {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(id, v)| other.entries.get(id).is_some_and(|o| **o == **v))
    }
}

// ============================================================================
// RevisionedTable<Id, V>
// ============================================================================

/// Keyed table of shared values with identity-preserving updates
///
/// Cloning the table yields another handle onto the same entries.
/// The table has exactly two ways in: [`apply_update`] merges a delta and
/// [`apply_snapshot`] replaces everything. Both come in a `_sequenced`
/// form for responses to requests that were issued earlier.
///
/// # Example
///
/// ```rust
/// use device_table::RevisionedTable;
///
/// let table = RevisionedTable::<&'static str, i32>::new();
/// let first = table.issue_sequence();
/// let second = table.issue_sequence();
///
/// // The later request answers first...
/// table.apply_update_sequenced(second, [("ac", 24)]).unwrap();
/// // ...so the earlier response is stale for that entry.
/// let report = table.apply_update_sequenced(first, [("ac", 18)]).unwrap();
///
/// assert_eq!(report.stale, vec!["ac"]);
/// assert_eq!(*table.get(&"ac").unwrap(), 24);
/// ```
///
/// [`apply_update`]: RevisionedTable::apply_update
/// [`apply_snapshot`]: RevisionedTable::apply_snapshot
pub struct RevisionedTable<Id, V>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    inner: Arc<RwLock<Inner<Id, V>>>,

    next_sequence: Arc<AtomicU64>,

    watched: Arc<RwLock<HashSet<Id>>>,
    watch_everything: Arc<AtomicBool>,

    event_tx: mpsc::Sender<ChangeEvent<Id>>,
    event_rx: Arc<Mutex<mpsc::Receiver<ChangeEvent<Id>>>>,
}

impl<Id, V> RevisionedTable<Id, V>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        Self {
            inner: Arc::new(RwLock::new(Inner {
                slots: HashMap::new(),
                revision: Revision::default(),
            })),
            next_sequence: Arc::new(AtomicU64::new(1)),
            watched: Arc::new(RwLock::new(HashSet::new())),
            watch_everything: Arc::new(AtomicBool::new(false)),
            event_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Reserve the next request sequence
    ///
    /// Call this before sending the request whose response will be applied
    /// with one of the `_sequenced` methods.
    pub fn issue_sequence(&self) -> Sequence {
        Sequence(self.next_sequence.fetch_add(1, Ordering::SeqCst))
    }

    /// Merge a delta under a freshly issued sequence
    ///
    /// Never stale: the fresh sequence is newer than anything already applied.
    pub fn apply_update<I>(&self, delta: I) -> Result<ApplyReport<Id>, TableError>
    where
        I: IntoIterator<Item = (Id, V)>,
    {
        let sequence = self.issue_sequence();
        self.apply_update_sequenced(sequence, delta)
    }

    /// Merge a delta produced by the request issued as `sequence`
    ///
    /// Every named entry gets a new `Arc`, even when its value is unchanged.
    /// Entries absent from the delta keep their `Arc`. An entry whose current
    /// value came from a newer request is left alone and reported as stale.
    /// Unknown ids are inserted.
    pub fn apply_update_sequenced<I>(
        &self,
        sequence: Sequence,
        delta: I,
    ) -> Result<ApplyReport<Id>, TableError>
    where
        I: IntoIterator<Item = (Id, V)>,
    {
        let report = {
            let mut inner = self.inner.write().map_err(|_| TableError::LockPoisoned)?;
            let revision = inner.revision.next();
            inner.revision = revision;

            let mut report = ApplyReport::new(revision, sequence);
            for (id, value) in delta {
                if let Some(existing) = inner.slots.get(&id) {
                    if existing.sequence > sequence {
                        report.stale.push(id);
                        continue;
                    }
                }
                inner.slots.insert(
                    id.clone(),
                    Slot {
                        value: Arc::new(value),
                        revision,
                        sequence,
                    },
                );
                report.applied.push(id);
            }
            report
        };

        self.emit_changes(&report.applied, report.revision);
        Ok(report)
    }

    /// Replace the whole table under a freshly issued sequence
    pub fn apply_snapshot<I>(&self, entries: I) -> Result<ApplyReport<Id>, TableError>
    where
        I: IntoIterator<Item = (Id, V)>,
    {
        let sequence = self.issue_sequence();
        self.apply_snapshot_sequenced(sequence, entries)
    }

    /// Replace the whole table with the response to the request issued as `sequence`
    ///
    /// Entries written by a newer request survive the replace (reported as
    /// stale); everything else either takes the snapshot's value or, when the
    /// snapshot does not name it, is removed.
    pub fn apply_snapshot_sequenced<I>(
        &self,
        sequence: Sequence,
        entries: I,
    ) -> Result<ApplyReport<Id>, TableError>
    where
        I: IntoIterator<Item = (Id, V)>,
    {
        let report = {
            let mut inner = self.inner.write().map_err(|_| TableError::LockPoisoned)?;
            let revision = inner.revision.next();
            inner.revision = revision;

            let mut report = ApplyReport::new(revision, sequence);
            let previous = std::mem::take(&mut inner.slots);
            let mut next: HashMap<Id, Slot<V>> = HashMap::with_capacity(previous.len());

            for (id, value) in entries {
                match previous.get(&id) {
                    Some(existing) if existing.sequence > sequence => {
                        next.insert(id.clone(), existing.clone());
                        report.stale.push(id);
                    }
                    _ => {
                        next.insert(
                            id.clone(),
                            Slot {
                                value: Arc::new(value),
                                revision,
                                sequence,
                            },
                        );
                        report.applied.push(id);
                    }
                }
            }

            for (id, slot) in previous {
                if next.contains_key(&id) {
                    continue;
                }
                if slot.sequence > sequence {
                    report.stale.push(id.clone());
                    next.insert(id, slot);
                } else {
                    report.removed.push(id);
                }
            }

            inner.slots = next;
            report
        };

        self.emit_changes(&report.applied, report.revision);
        self.emit_changes(&report.removed, report.revision);
        Ok(report)
    }

    pub fn get(&self, id: &Id) -> Option<Arc<V>> {
        let inner = self.inner.read().ok()?;
        inner.slots.get(id).map(|slot| Arc::clone(&slot.value))
    }

    /// Revision at which the entry was last replaced
    pub fn revision_of(&self, id: &Id) -> Option<Revision> {
        let inner = self.inner.read().ok()?;
        inner.slots.get(id).map(|slot| slot.revision)
    }

    /// Sequence of the request that produced the entry's current value
    pub fn sequence_of(&self, id: &Id) -> Option<Sequence> {
        let inner = self.inner.read().ok()?;
        inner.slots.get(id).map(|slot| slot.sequence)
    }

    /// Current table-wide revision
    pub fn revision(&self) -> Revision {
        self.inner
            .read()
            .map(|inner| inner.revision)
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Result<Snapshot<Id, V>, TableError> {
        let inner = self.inner.read().map_err(|_| TableError::LockPoisoned)?;
        Ok(Snapshot {
            revision: inner.revision,
            entries: inner
                .slots
                .iter()
                .map(|(id, slot)| (id.clone(), Arc::clone(&slot.value)))
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<Id> {
        self.inner
            .read()
            .map(|inner| inner.slots.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Emit change events for this entry from now on
    pub fn watch(&self, id: Id) {
        if let Ok(mut watched) = self.watched.write() {
            watched.insert(id);
        }
    }

    pub fn unwatch(&self, id: &Id) {
        if let Ok(mut watched) = self.watched.write() {
            watched.remove(id);
        }
    }

    /// Emit change events for every entry
    pub fn watch_all(&self) {
        self.watch_everything.store(true, Ordering::SeqCst);
    }

    pub fn is_watched(&self, id: &Id) -> bool {
        self.watch_everything.load(Ordering::SeqCst)
            || self
                .watched
                .read()
                .map(|w| w.contains(id))
                .unwrap_or(false)
    }

    /// Receiver for change events on watched entries
    pub fn iter(&self) -> ChangeIterator<Id> {
        ChangeIterator::new(Arc::clone(&self.event_rx))
    }

    fn emit_changes(&self, ids: &[Id], revision: Revision) {
        for id in ids {
            if self.is_watched(id) {
                let _ = self.event_tx.send(ChangeEvent::new(id.clone(), revision));
            }
        }
    }
}

impl<Id, V> Default for RevisionedTable<Id, V>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Id, V> Clone for RevisionedTable<Id, V>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            next_sequence: Arc::clone(&self.next_sequence),
            watched: Arc::clone(&self.watched),
            watch_everything: Arc::clone(&self.watch_everything),
            event_tx: self.event_tx.clone(),
            event_rx: Arc::clone(&self.event_rx),
        }
    }
}

impl<Id, V> std::fmt::Debug for RevisionedTable<Id, V>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionedTable")
            .field("len", &self.len())
            .field("revision", &self.revision())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn seeded() -> RevisionedTable<String, i32> {
        let table = RevisionedTable::new();
        table
            .apply_snapshot([("a".to_string(), 1), ("b".to_string(), 2)])
            .unwrap();
        table
    }

    #[test]
    fn test_update_keeps_untouched_identity() {
        let table = seeded();
        let b_before = table.get(&"b".to_string()).unwrap();

        table.apply_update([("a".to_string(), 10)]).unwrap();

        let b_after = table.get(&"b".to_string()).unwrap();
        assert!(Arc::ptr_eq(&b_before, &b_after));
    }

    #[test]
    fn test_update_replaces_identity_even_when_equal() {
        let table = seeded();
        let a_before = table.get(&"a".to_string()).unwrap();

        table.apply_update([("a".to_string(), 1)]).unwrap();

        let a_after = table.get(&"a".to_string()).unwrap();
        assert_eq!(*a_before, *a_after);
        assert!(!Arc::ptr_eq(&a_before, &a_after));
    }

    #[test]
    fn test_unknown_id_is_added() {
        let table = seeded();
        let report = table.apply_update([("c".to_string(), 3)]).unwrap();

        assert_eq!(report.applied, vec!["c".to_string()]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_every_apply_bumps_revision() {
        let table = RevisionedTable::<String, i32>::new();
        assert_eq!(table.revision(), Revision(0));

        table.apply_snapshot([("a".to_string(), 1)]).unwrap();
        assert_eq!(table.revision(), Revision(1));

        table.apply_update(Vec::<(String, i32)>::new()).unwrap();
        assert_eq!(table.revision(), Revision(2));
    }

    #[test]
    fn test_revision_of_tracks_last_replacement() {
        let table = seeded();
        table.apply_update([("a".to_string(), 5)]).unwrap();

        assert_eq!(table.revision_of(&"a".to_string()), Some(Revision(2)));
        assert_eq!(table.revision_of(&"b".to_string()), Some(Revision(1)));
        assert_eq!(table.revision_of(&"zzz".to_string()), None);
    }

    #[test]
    fn test_stale_update_is_skipped() {
        let table = seeded();
        let older = table.issue_sequence();
        let newer = table.issue_sequence();

        table
            .apply_update_sequenced(newer, [("a".to_string(), 20)])
            .unwrap();
        let report = table
            .apply_update_sequenced(older, [("a".to_string(), 10), ("b".to_string(), 30)])
            .unwrap();

        assert_eq!(report.stale, vec!["a".to_string()]);
        assert_eq!(report.applied, vec!["b".to_string()]);
        assert_eq!(*table.get(&"a".to_string()).unwrap(), 20);
        assert_eq!(*table.get(&"b".to_string()).unwrap(), 30);
    }

    #[test]
    fn test_snapshot_removes_missing_entries() {
        let table = seeded();
        let report = table.apply_snapshot([("a".to_string(), 1)]).unwrap();

        assert_eq!(report.removed, vec!["b".to_string()]);
        assert!(table.get(&"b".to_string()).is_none());
    }

    #[test]
    fn test_snapshot_keeps_newer_entries() {
        let table = seeded();
        let snapshot_seq = table.issue_sequence();
        table.apply_update([("a".to_string(), 99)]).unwrap();

        let report = table
            .apply_snapshot_sequenced(snapshot_seq, [("a".to_string(), 1), ("b".to_string(), 2)])
            .unwrap();

        assert_eq!(report.stale, vec!["a".to_string()]);
        assert_eq!(*table.get(&"a".to_string()).unwrap(), 99);
    }

    #[test]
    fn test_unwatched_entries_emit_nothing() {
        let table = seeded();
        table.apply_update([("a".to_string(), 7)]).unwrap();
        assert!(table.iter().recv_timeout(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn test_watch_all_emits_for_every_entry() {
        let table = seeded();
        table.watch_all();

        table
            .apply_update([("a".to_string(), 7), ("b".to_string(), 8)])
            .unwrap();

        let events = table.iter().drain();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_snapshot_value_eq() {
        let table = seeded();
        let first = table.snapshot().unwrap();
        table
            .apply_snapshot([("a".to_string(), 1), ("b".to_string(), 2)])
            .unwrap();
        let second = table.snapshot().unwrap();

        assert!(first.value_eq(&second));
        assert_ne!(first.revision, second.revision);
    }
}
