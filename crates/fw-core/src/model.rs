//! Node metadata and registry records.
//!
//! Metadata is what the author of a wrapped component says the node *is*: a
//! type tag, an optional position, and the operations the side panel may
//! offer on it. It is independent of the node's identity, which belongs to the
//! mounted wrapper instance.
//!
//! Two metadata values are "the same" when their [`MetadataProjection`]s are
//! equal. The projection keeps the type, the index, and the operation keys and
//! leaves out the display-name resolver, which is a function and changes
//! identity on every render of most call sites.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

// ─── Type tag ────────────────────────────────────────────────────────────

/// What a detected node represents in the screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaDataType {
    StatusBar,
    NavigationBar,
    ConversationList,
    ConversationItem,
    ConversationInput,
    ConversationFooter,
    ChatList,
    ChatItem,
    ContactList,
    BottomNavbar,
    Profile,
    Moments,
    MomentsItem,
    /// Escape hatch for host-defined node kinds.
    Custom(String),
}

impl MetaDataType {
    /// Default label shown in the inspector when no resolver is set.
    pub fn label(&self) -> &str {
        match self {
            Self::StatusBar => "Status bar",
            Self::NavigationBar => "Navigation bar",
            Self::ConversationList => "Conversation",
            Self::ConversationItem => "Message",
            Self::ConversationInput => "Message input",
            Self::ConversationFooter => "Conversation footer",
            Self::ChatList => "Chat list",
            Self::ChatItem => "Chat",
            Self::ContactList => "Contacts",
            Self::BottomNavbar => "Bottom navigation",
            Self::Profile => "Profile",
            Self::Moments => "Moments",
            Self::MomentsItem => "Moment",
            Self::Custom(name) => name.as_str(),
        }
    }
}

// ─── Operations ──────────────────────────────────────────────────────────

/// A named operation the side panel can offer on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub key: Option<String>,
    pub label: String,
}

impl Operation {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            label: label.into(),
        }
    }

    /// Key used for structural comparison; unkeyed operations compare as `""`.
    pub fn structural_key(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}

// ─── Display names ───────────────────────────────────────────────────────

/// Maps the opaque per-type data of a node to a tree label.
#[derive(Clone)]
pub struct DisplayNameResolver(Arc<dyn Fn(&Value) -> String + Send + Sync>);

impl DisplayNameResolver {
    pub fn new(f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn resolve(&self, data: &Value) -> String {
        (self.0)(data)
    }
}

impl fmt::Debug for DisplayNameResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DisplayNameResolver(..)")
    }
}

// ─── Metadata ────────────────────────────────────────────────────────────

/// Author-supplied description of a node.
///
/// Does not implement `PartialEq`: compare through [`NodeMetadata::projection`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(rename = "type")]
    pub kind: MetaDataType,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub operations: SmallVec<[Operation; 2]>,
    #[serde(skip)]
    pub display_name: Option<DisplayNameResolver>,
}

impl NodeMetadata {
    pub fn new(kind: MetaDataType) -> Self {
        Self {
            kind,
            index: None,
            operations: SmallVec::new(),
            display_name: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn with_display_name(
        mut self,
        f: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> Self {
        self.display_name = Some(DisplayNameResolver::new(f));
        self
    }

    /// The fixed shape used for equality: type, index, operation keys.
    pub fn projection(&self) -> MetadataProjection {
        MetadataProjection {
            kind: self.kind.clone(),
            index: self.index,
            operation_keys: self
                .operations
                .iter()
                .map(|op| op.structural_key().to_string())
                .collect(),
        }
    }

    /// Tree label: resolver output when data is available, else the type label.
    pub fn display_name(&self, data: Option<&Value>) -> String {
        match (&self.display_name, data) {
            (Some(resolver), Some(data)) => resolver.resolve(data),
            _ => match self.index {
                Some(index) => format!("{} #{index}", self.kind.label()),
                None => self.kind.label().to_string(),
            },
        }
    }
}

/// Metadata attached at a use site: one value, or an ordered list for a
/// composite node standing for several logical sub-items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InjectedMetadata {
    Many(Vec<NodeMetadata>),
    Single(NodeMetadata),
}

impl InjectedMetadata {
    pub fn entries(&self) -> &[NodeMetadata] {
        match self {
            Self::Single(meta) => std::slice::from_ref(meta),
            Self::Many(list) => list,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    pub fn projection(&self) -> ProjectedMetadata {
        match self {
            Self::Single(meta) => ProjectedMetadata::Single(meta.projection()),
            Self::Many(list) => {
                ProjectedMetadata::Many(list.iter().map(NodeMetadata::projection).collect())
            }
        }
    }

    /// Parse from host JSON (`{...}` or `[{...}, ...]`).
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid metadata: {e}"))
    }
}

impl From<NodeMetadata> for InjectedMetadata {
    fn from(meta: NodeMetadata) -> Self {
        Self::Single(meta)
    }
}

impl From<Vec<NodeMetadata>> for InjectedMetadata {
    fn from(list: Vec<NodeMetadata>) -> Self {
        Self::Many(list)
    }
}

/// Comparable shape of one [`NodeMetadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataProjection {
    #[serde(rename = "type")]
    pub kind: MetaDataType,
    pub index: Option<usize>,
    pub operation_keys: Vec<String>,
}

/// Comparable shape of an [`InjectedMetadata`]. A single value never equals
/// a one-element list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProjectedMetadata {
    Single(MetadataProjection),
    Many(Vec<MetadataProjection>),
}

// ─── Records ─────────────────────────────────────────────────────────────

/// Opaque handle to the mounted element, issued by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Live render target of a mounted node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub handle: ElementHandle,
    pub allows_child_sort: bool,
}
