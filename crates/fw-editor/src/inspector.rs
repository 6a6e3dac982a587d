//! Side-panel tree view over the registry.
//!
//! The inspector lists every detected node that is fully registered, labels
//! it, and marks which row is hovered or activated. Rows for nodes with only
//! one half of their pair registered are skipped: that node is either still
//! mounting or already on its way out.
//!
//! The panel writes back through [`InspectorAction`]s, which land in the
//! same hover/activation slots the rendered tree uses, so highlighting a row
//! highlights the node on screen and vice versa.

use crate::session::EditorSession;
use fw_core::{MetaDataType, NodeId, NodeMetadata, Operation, RegistrySnapshot};
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

/// Supplies the per-type data a node's display-name resolver reads.
pub trait NodeDataSource {
    fn data(&self, id: NodeId, metadata: &NodeMetadata) -> Option<Value>;
}

/// No per-type data; every row gets its type's default label.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoData;

impl NodeDataSource for NoData {
    fn data(&self, _id: NodeId, _metadata: &NodeMetadata) -> Option<Value> {
        None
    }
}

impl<F> NodeDataSource for F
where
    F: Fn(NodeId, &NodeMetadata) -> Option<Value>,
{
    fn data(&self, id: NodeId, metadata: &NodeMetadata) -> Option<Value> {
        self(id, metadata)
    }
}

/// One line of the tree view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorRow {
    pub id: NodeId,
    /// Position within a composite node's metadata list; `None` for a plain node.
    pub part: Option<usize>,
    #[serde(rename = "type")]
    pub kind: MetaDataType,
    pub index: Option<usize>,
    pub label: String,
    pub operations: SmallVec<[Operation; 2]>,
    pub hovered: bool,
    pub activated: bool,
    /// The node's children may be reordered.
    pub sortable: bool,
}

/// Build rows for every ready node, in mount order.
pub fn build_rows(snapshot: &RegistrySnapshot, data: &impl NodeDataSource) -> Vec<InspectorRow> {
    let mut rows = Vec::new();
    for (record, injected) in snapshot.ready() {
        let id = record.id;
        let hovered = snapshot.hovered == Some(id);
        let activated = snapshot.activated == Some(id);
        let composite = injected.is_composite();
        for (n, meta) in injected.entries().iter().enumerate() {
            let label = meta.display_name(data.data(id, meta).as_ref());
            rows.push(InspectorRow {
                id,
                part: composite.then_some(n),
                kind: meta.kind.clone(),
                index: meta.index,
                label,
                operations: meta.operations.clone(),
                hovered,
                activated,
                sortable: record.allows_child_sort,
            });
        }
    }
    rows
}

/// Ids of ready nodes whose children the sort engine may reorder.
pub fn sortable_containers(snapshot: &RegistrySnapshot) -> Vec<NodeId> {
    snapshot
        .ready()
        .filter(|(record, _)| record.allows_child_sort)
        .map(|(record, _)| record.id)
        .collect()
}

/// A write from the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorAction {
    Hover(NodeId),
    Leave,
    Activate(NodeId),
    Deselect,
}

/// Apply `action` to the session. Rows that are no longer ready are ignored.
pub fn apply(session: &EditorSession, action: InspectorAction) {
    let is_ready = |id| session.registry().is_ready(id);
    match action {
        InspectorAction::Hover(id) if is_ready(id) => session.hover(id),
        InspectorAction::Activate(id) if is_ready(id) => session.activate(id),
        InspectorAction::Hover(id) | InspectorAction::Activate(id) => {
            log::warn!("inspector targeted {id}, which is not registered");
        }
        InspectorAction::Leave => session.clear_hover(),
        InspectorAction::Deselect => session.clear_activation(),
    }
}
