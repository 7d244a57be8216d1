//! Device table synchronisation
//!
//! [`DeviceSyncEngine`] is the only writer of the client's device table.
//! Every backend reply that carries device state (a manual update, a chat
//! response, a scene or a mood) funnels through one of its two entry points:
//!
//! - [`apply_update`](DeviceSyncEngine::apply_update) merges a delta. Devices
//!   named in the delta get a fresh `Arc` even when nothing changed; devices
//!   not named keep theirs.
//! - [`apply_scene`](DeviceSyncEngine::apply_scene) replaces the whole table
//!   with a full snapshot.
//!
//! Both validate the entire input first. One bad device rejects the whole
//! input and the table is left untouched.

use std::sync::Arc;

use device_table::{ApplyReport, ChangeIterator, Revision, RevisionedTable, Sequence, Snapshot};
use genie_api::{Device, DeviceId, DeviceKind, DeviceMap, Validate};

use crate::error::{Result, StateError};

/// Outcome of one apply, listing devices by id
pub type SyncReport = ApplyReport<DeviceId>;

/// Reconciles backend device state into the client table
///
/// Cloning yields another handle onto the same table.
#[derive(Debug, Clone, Default)]
pub struct DeviceSyncEngine {
    table: RevisionedTable<DeviceId, Device>,
}

impl DeviceSyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every device in `devices` against the device limits
    pub fn validate_delta(devices: &DeviceMap) -> Result<()> {
        for (device_id, device) in devices {
            device
                .validate()
                .map_err(|source| StateError::Validation {
                    device_id: device_id.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Reserve a sequence for a request about to be sent
    pub fn issue_sequence(&self) -> Sequence {
        self.table.issue_sequence()
    }

    /// Merge a delta that is known to be the newest state
    pub fn apply_update(&self, delta: DeviceMap) -> Result<SyncReport> {
        let sequence = self.issue_sequence();
        self.apply_update_sequenced(sequence, delta)
    }

    /// Merge the delta answering the request issued as `sequence`
    ///
    /// Devices already written by a newer request are skipped and listed in
    /// the report's `stale` field.
    pub fn apply_update_sequenced(&self, sequence: Sequence, delta: DeviceMap) -> Result<SyncReport> {
        Self::validate_delta(&delta)?;
        let report = self.table.apply_update_sequenced(sequence, delta)?;
        self.log_report("update", &report);
        Ok(report)
    }

    /// Replace the table with a full snapshot known to be the newest state
    pub fn apply_scene(&self, scene: DeviceMap) -> Result<SyncReport> {
        let sequence = self.issue_sequence();
        self.apply_scene_sequenced(sequence, scene)
    }

    /// Replace the table with the snapshot answering the request issued as `sequence`
    pub fn apply_scene_sequenced(&self, sequence: Sequence, scene: DeviceMap) -> Result<SyncReport> {
        Self::validate_delta(&scene)?;
        let report = self.table.apply_snapshot_sequenced(sequence, scene)?;
        self.log_report("scene", &report);
        Ok(report)
    }

    pub fn get(&self, device_id: &DeviceId) -> Option<Arc<Device>> {
        self.table.get(device_id)
    }

    /// Like [`get`](Self::get), but an absent device is an error
    pub fn require(&self, device_id: &DeviceId) -> Result<Arc<Device>> {
        self.get(device_id)
            .ok_or_else(|| StateError::UnknownDevice(device_id.clone()))
    }

    pub fn contains(&self, device_id: &DeviceId) -> bool {
        self.table.revision_of(device_id).is_some()
    }

    /// Table-wide revision, bumped by every apply
    pub fn revision(&self) -> Revision {
        self.table.revision()
    }

    /// Revision at which `device_id` was last replaced
    ///
    /// `(device_id, revision)` changes exactly when the device's `Arc` does,
    /// which makes it a stable refresh key for consumers.
    pub fn revision_of(&self, device_id: &DeviceId) -> Option<Revision> {
        self.table.revision_of(device_id)
    }

    pub fn snapshot(&self) -> Result<TableSnapshot> {
        Ok(TableSnapshot(self.table.snapshot()?))
    }

    pub fn ids_of_kind(&self, kind: DeviceKind) -> Vec<DeviceId> {
        self.snapshot()
            .map(|snapshot| snapshot.ids_of_kind(kind))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Emit change events for `device_id` from now on
    pub fn watch(&self, device_id: DeviceId) {
        self.table.watch(device_id);
    }

    pub fn unwatch(&self, device_id: &DeviceId) {
        self.table.unwatch(device_id);
    }

    pub fn watch_all(&self) {
        self.table.watch_all();
    }

    /// Blocking iterator over change events for watched devices
    pub fn changes(&self) -> ChangeIterator<DeviceId> {
        self.table.iter()
    }

    fn log_report(&self, kind: &str, report: &SyncReport) {
        tracing::debug!(
            "Applied {} at {} ({}): {} replaced, {} removed",
            kind,
            report.revision,
            report.sequence,
            report.applied.len(),
            report.removed.len()
        );
        if !report.is_clean() {
            tracing::warn!(
                "Dropped stale {} response {} for {:?}",
                kind,
                report.sequence,
                report.stale
            );
        }
    }
}

/// Point-in-time view of the device table
#[derive(Debug, Clone)]
pub struct TableSnapshot(Snapshot<DeviceId, Device>);

impl TableSnapshot {
    pub fn revision(&self) -> Revision {
        self.0.revision
    }

    pub fn get(&self, device_id: &DeviceId) -> Option<&Arc<Device>> {
        self.0.get(device_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &Arc<Device>)> {
        self.0.iter()
    }

    /// Ids of every device of `kind`, sorted
    pub fn ids_of_kind(&self, kind: DeviceKind) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self
            .0
            .iter()
            .filter(|(_, device)| device.kind() == kind)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Deep equality, ignoring identity and revision
    pub fn value_eq(&self, other: &TableSnapshot) -> bool {
        self.0.value_eq(&other.0)
    }

    /// Owned copy of every device
    pub fn to_map(&self) -> DeviceMap {
        self.0
            .iter()
            .map(|(id, device)| (id.clone(), Device::clone(device)))
            .collect()
    }
}
