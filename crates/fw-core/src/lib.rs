pub mod conversation;
pub mod id;
pub mod model;
pub mod registry;

pub use conversation::{
    ConversationItem, ConversationKind, ConversationRole, ConversationType, RedPacketStatus,
    TransferStatus,
};
pub use id::NodeId;
pub use model::*;
pub use registry::{Registry, RegistryEvent, RegistrySnapshot, SnapshotEntry, SubscriptionId};
