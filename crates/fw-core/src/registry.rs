//! Interaction registry: which nodes exist, what they are, and which one is
//! hovered or activated.
//!
//! The registry holds two keyed stores (metadata and records) and two
//! singleton slots (hovered, activated). Every operation is total: writing
//! or clearing an unknown id is a no-op, reads of unknown ids return `None`.
//!
//! Metadata and record are written independently, so a reader may see one
//! half of a pair without the other. The registry keeps whatever halves it
//! has; [`RegistrySnapshot::ready`] is how consumers skip incomplete nodes.
//!
//! Subscribers are notified after each *effective* mutation. Writing the
//! hover slot with the id it already holds emits nothing.

use crate::id::NodeId;
use crate::model::{InjectedMetadata, NodeRecord};
use std::collections::HashMap;

/// Something that happened to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    MetadataChanged(NodeId),
    MetadataCleared(NodeId),
    RecordChanged(NodeId),
    RecordCleared(NodeId),
    HoverChanged(Option<NodeId>),
    ActivationChanged(Option<NodeId>),
    /// The whole registry was torn down.
    Reset,
}

/// Handle returned by [`Registry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// For owners that hand out their own subscriptions.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

type Listener = Box<dyn FnMut(&RegistryEvent)>;

/// Keyed stores plus hover/activation slots for one editor session.
#[derive(Default)]
pub struct Registry {
    metadata: HashMap<NodeId, InjectedMetadata>,
    records: HashMap<NodeId, NodeRecord>,
    /// First-seen sequence per id, for stable list order.
    order: HashMap<NodeId, u64>,
    next_seq: u64,
    hovered: Option<NodeId>,
    activated: Option<NodeId>,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Keyed stores ────────────────────────────────────────────────────

    /// Upsert metadata for `id`. Always overwrites.
    pub fn set_node_metadata(&mut self, id: NodeId, metadata: InjectedMetadata) {
        self.touch_order(id);
        self.metadata.insert(id, metadata);
        self.emit(RegistryEvent::MetadataChanged(id));
    }

    /// Remove metadata for `id`. Idempotent.
    pub fn clear_node_metadata(&mut self, id: NodeId) {
        if self.metadata.remove(&id).is_some() {
            self.forget_order_if_gone(id);
            self.emit(RegistryEvent::MetadataCleared(id));
        }
    }

    /// Upsert the record keyed by `record.id`. An existing record is updated
    /// in place.
    pub fn set_node_record(&mut self, record: NodeRecord) {
        let id = record.id;
        self.touch_order(id);
        match self.records.get_mut(&id) {
            Some(existing) if *existing == record => return,
            Some(existing) => {
                existing.handle = record.handle;
                existing.allows_child_sort = record.allows_child_sort;
            }
            None => {
                self.records.insert(id, record);
            }
        }
        self.emit(RegistryEvent::RecordChanged(id));
    }

    /// Remove the record for `id`. Idempotent.
    pub fn clear_node_record(&mut self, id: NodeId) {
        if self.records.remove(&id).is_some() {
            self.forget_order_if_gone(id);
            self.emit(RegistryEvent::RecordCleared(id));
        }
    }

    /// Remove everything tied to an unmounted node: both halves of its pair,
    /// and the hover/activation slots if they point at it.
    pub fn purge(&mut self, id: NodeId) {
        self.clear_node_record(id);
        self.clear_node_metadata(id);
        if self.hovered == Some(id) {
            self.set_hovered(None);
        }
        if self.activated == Some(id) {
            self.set_activated(None);
        }
    }

    pub fn metadata(&self, id: NodeId) -> Option<&InjectedMetadata> {
        self.metadata.get(&id)
    }

    pub fn record(&self, id: NodeId) -> Option<&NodeRecord> {
        self.records.get(&id)
    }

    /// Whether both halves of the pair for `id` are present.
    pub fn is_ready(&self, id: NodeId) -> bool {
        self.metadata.contains_key(&id) && self.records.contains_key(&id)
    }

    /// All records, in mount order.
    pub fn all_records(&self) -> Vec<&NodeRecord> {
        let mut out: Vec<&NodeRecord> = self.records.values().collect();
        out.sort_by_key(|r| self.seq(r.id));
        out
    }

    /// All metadata, in mount order.
    pub fn all_metadata(&self) -> Vec<(NodeId, &InjectedMetadata)> {
        let mut out: Vec<(NodeId, &InjectedMetadata)> =
            self.metadata.iter().map(|(id, m)| (*id, m)).collect();
        out.sort_by_key(|(id, _)| self.seq(*id));
        out
    }

    /// Number of ids with at least one half registered.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consistent point-in-time copy of the whole registry.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut ids: Vec<NodeId> = self.order.keys().copied().collect();
        ids.sort_by_key(|id| self.seq(*id));
        let entries = ids
            .into_iter()
            .map(|id| SnapshotEntry {
                id,
                record: self.records.get(&id).cloned(),
                metadata: self.metadata.get(&id).cloned(),
            })
            .collect();
        RegistrySnapshot {
            entries,
            hovered: self.hovered,
            activated: self.activated,
            revision: self.revision,
        }
    }

    // ─── Singletons ──────────────────────────────────────────────────────

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn activated(&self) -> Option<NodeId> {
        self.activated
    }

    pub fn set_hovered(&mut self, id: Option<NodeId>) {
        if self.hovered != id {
            log::trace!("hover {:?} -> {:?}", self.hovered, id);
            self.hovered = id;
            self.emit(RegistryEvent::HoverChanged(id));
        }
    }

    pub fn set_activated(&mut self, id: Option<NodeId>) {
        if self.activated != id {
            log::trace!("activate {:?} -> {:?}", self.activated, id);
            self.activated = id;
            self.emit(RegistryEvent::ActivationChanged(id));
        }
    }

    // ─── Observation ─────────────────────────────────────────────────────

    /// Bumped on every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&RegistryEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Drop every node and clear both slots. Subscribers stay attached.
    pub fn reset(&mut self) {
        log::debug!("registry reset ({} nodes)", self.order.len());
        self.metadata.clear();
        self.records.clear();
        self.order.clear();
        self.hovered = None;
        self.activated = None;
        self.emit(RegistryEvent::Reset);
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn emit(&mut self, event: RegistryEvent) {
        self.revision += 1;
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn touch_order(&mut self, id: NodeId) {
        if !self.order.contains_key(&id) {
            self.order.insert(id, self.next_seq);
            self.next_seq += 1;
        }
    }

    fn forget_order_if_gone(&mut self, id: NodeId) {
        if !self.metadata.contains_key(&id) && !self.records.contains_key(&id) {
            self.order.remove(&id);
        }
    }

    fn seq(&self, id: NodeId) -> u64 {
        self.order.get(&id).copied().unwrap_or(u64::MAX)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("metadata", &self.metadata.len())
            .field("records", &self.records.len())
            .field("hovered", &self.hovered)
            .field("activated", &self.activated)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ─── Snapshots ───────────────────────────────────────────────────────────

/// One id and whichever halves of its pair existed at snapshot time.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub id: NodeId,
    pub record: Option<NodeRecord>,
    pub metadata: Option<InjectedMetadata>,
}

impl SnapshotEntry {
    pub fn is_ready(&self) -> bool {
        self.record.is_some() && self.metadata.is_some()
    }
}

/// Point-in-time view of a [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    /// Every known id in mount order, complete or not.
    pub entries: Vec<SnapshotEntry>,
    pub hovered: Option<NodeId>,
    pub activated: Option<NodeId>,
    pub revision: u64,
}

impl RegistrySnapshot {
    /// Complete pairs only, as `(record, metadata)`.
    pub fn ready(&self) -> impl Iterator<Item = (&NodeRecord, &InjectedMetadata)> {
        self.entries
            .iter()
            .filter_map(|e| Some((e.record.as_ref()?, e.metadata.as_ref()?)))
    }

    pub fn get(&self, id: NodeId) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn is_ready(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(SnapshotEntry::is_ready)
    }

    /// The hovered id, if it still refers to a complete node.
    pub fn live_hovered(&self) -> Option<NodeId> {
        self.hovered.filter(|id| self.is_ready(*id))
    }

    /// The activated id, if it still refers to a complete node.
    pub fn live_activated(&self) -> Option<NodeId> {
        self.activated.filter(|id| self.is_ready(*id))
    }
}
