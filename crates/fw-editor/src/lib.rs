pub mod config;
pub mod detect;
pub mod drag;
pub mod elements;
pub mod input;
pub mod inspector;
pub mod mode;
pub mod scheduler;
pub mod session;

pub use config::SessionConfig;
pub use detect::{
    Component, DetectProps, Detectable, HostProps, Memo, NodeInstance, Rendered, detectable,
    detectable_with,
};
pub use drag::{DragCoordinator, DragFlag};
pub use elements::{Element, ElementProps, Tag, div, section, span};
pub use input::{Handlers, PointerEvent, PointerKind};
pub use inspector::{InspectorAction, InspectorRow, NodeDataSource, NoData};
pub use mode::{EditorMode, ModeGate, ModeSwitch};
pub use session::EditorSession;

// Re-export core types so hosts only need one dependency
pub use fw_core::{ElementHandle, InjectedMetadata, MetaDataType, NodeId, NodeMetadata, Operation};
