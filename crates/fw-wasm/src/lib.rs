//! WASM bridge for Fake World: exposes an editor session to JavaScript.
//!
//! The JS host owns the DOM. It mounts one bridge node per detectable
//! element, attaches the element handle after committing, and calls
//! [`FwSession::flush`] once per render pass. Pointer events are forwarded
//! by id; the side panel reads [`FwSession::tree_json`].
//!
//! Compiled via `wasm-pack build --target web`.

use fw_core::{ElementHandle, InjectedMetadata, NodeId, RegistryEvent, SubscriptionId};
use fw_editor::inspector::{self, InspectorAction, NoData};
use fw_editor::{
    Component, DetectProps, Detectable, DragFlag, EditorMode, EditorSession, HostProps, Memo,
    ModeSwitch, NodeInstance, PointerEvent, SessionConfig, detectable_with,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// The component behind every bridge node: the DOM element itself, rendered
/// by the host from the [`HostProps`] it is handed.
struct HostNode;

impl Component for HostNode {
    type Props = ();
    type Output = HostProps;

    fn name(&self) -> &str {
        "HostNode"
    }

    fn render(&self, _props: &(), host: HostProps) -> HostProps {
        host
    }
}

struct MountedNode {
    instance: NodeInstance<HostNode>,
    metadata: Option<InjectedMetadata>,
    allow_child_sort: bool,
    /// Output of the latest render; handlers are `None` in preview mode.
    host: HostProps,
}

impl MountedNode {
    fn render(&mut self) {
        let input = DetectProps {
            metadata: self.metadata.clone(),
            allow_child_sort: self.allow_child_sort,
            props: (),
        };
        // The host node never memoizes, so every render is fresh.
        if let Some(host) = self.instance.render(input).fresh() {
            self.host = host;
        }
    }

    fn to_json(&self) -> Value {
        let (attribute, value) = self.host.data_attribute();
        json!({
            "ok": true,
            "id": value,
            "dataAttribute": attribute,
            "interactive": self.host.is_interactive(),
        })
    }
}

/// One editor session, driven from JavaScript.
#[wasm_bindgen]
pub struct FwSession {
    session: EditorSession,
    mode: Rc<ModeSwitch>,
    drag: Rc<DragFlag>,
    node: Detectable<HostNode>,
    nodes: HashMap<NodeId, MountedNode>,
}

#[wasm_bindgen]
impl FwSession {
    /// Start a session in edit mode with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_config(SessionConfig::default())
    }

    /// Start a session from a JSON [`SessionConfig`].
    pub fn with_config(config_json: &str) -> Result<FwSession, JsValue> {
        let config = SessionConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?;
        Ok(Self::from_config(config))
    }

    // ─── Collaborators ───────────────────────────────────────────────────

    /// Switch between edit and preview mode. Every node re-renders so its
    /// handlers appear or disappear.
    pub fn set_preview(&mut self, preview: bool) {
        let mode = if preview {
            EditorMode::Preview
        } else {
            EditorMode::Edit
        };
        if self.mode.get() == mode {
            return;
        }
        self.mode.set(mode);
        for node in self.nodes.values_mut() {
            node.render();
        }
        log::debug!("editor mode set to {mode:?}");
    }

    pub fn is_preview(&self) -> bool {
        self.session.is_preview()
    }

    /// Report whether a drag gesture is in progress.
    pub fn set_dragging(&self, dragging: bool) {
        self.drag.set(dragging);
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Mount a node. Returns JSON `{"ok":true,"id":...,"dataAttribute":...,
    /// "interactive":...}` or `{"ok":false,"error":"..."}`.
    pub fn mount_node(&mut self, metadata_json: Option<String>, allow_child_sort: bool) -> String {
        let metadata = match parse_metadata(metadata_json.as_deref()) {
            Ok(metadata) => metadata,
            Err(e) => return error_json(&e),
        };
        let mut instance = self.node.mount(&self.session);
        let input = DetectProps {
            metadata: metadata.clone(),
            allow_child_sort,
            props: (),
        };
        let Some(host) = instance.render(input).fresh() else {
            return error_json("host node did not render");
        };
        let node = MountedNode {
            instance,
            metadata,
            allow_child_sort,
            host,
        };
        let out = node.to_json().to_string();
        self.nodes.insert(node.instance.id(), node);
        out
    }

    /// Publish the committed DOM element of node `id`. Returns `false` for
    /// an unknown id.
    pub fn attach(&self, id: &str, handle: u32) -> bool {
        match self.find(id) {
            Some(node) => {
                node.instance.attach(ElementHandle(u64::from(handle)));
                true
            }
            None => false,
        }
    }

    /// Re-render node `id` with new metadata and child-sort flag.
    /// Returns the same JSON as [`FwSession::mount_node`].
    pub fn update_node(
        &mut self,
        id: &str,
        metadata_json: Option<String>,
        allow_child_sort: bool,
    ) -> String {
        let metadata = match parse_metadata(metadata_json.as_deref()) {
            Ok(metadata) => metadata,
            Err(e) => return error_json(&e),
        };
        let Some(node) = lookup(id).and_then(|id| self.nodes.get_mut(&id)) else {
            log::warn!("update_node: unknown node {id}");
            return error_json(&format!("unknown node: {id}"));
        };
        node.metadata = metadata;
        node.allow_child_sort = allow_child_sort;
        node.render();
        node.to_json().to_string()
    }

    /// Unmount node `id`. Its entries are purged on the next flush.
    pub fn unmount_node(&mut self, id: &str) -> bool {
        match lookup(id).and_then(|id| self.nodes.remove(&id)) {
            Some(node) => {
                node.instance.unmount();
                true
            }
            None => {
                log::warn!("unmount_node: unknown node {id}");
                false
            }
        }
    }

    /// Run deferred registrations and purges. Returns how many ran.
    pub fn flush(&self) -> u32 {
        u32::try_from(self.session.flush()).unwrap_or(u32::MAX)
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Forward a pointer-enter on node `id`. Returns `true` if the node
    /// claimed the event; the host should then stop bubbling it.
    pub fn pointer_enter(&self, id: &str) -> bool {
        self.pointer(id, PointerEvent::enter())
    }

    pub fn pointer_leave(&self, id: &str) -> bool {
        self.pointer(id, PointerEvent::leave())
    }

    pub fn pointer_click(&self, id: &str) -> bool {
        self.pointer(id, PointerEvent::click())
    }

    // ─── Side panel ──────────────────────────────────────────────────────

    /// Activate node `id` from the side panel. Returns `false` if the node
    /// is not registered.
    pub fn activate(&self, id: &str) -> bool {
        match lookup(id).filter(|id| self.session.registry().is_ready(*id)) {
            Some(id) => {
                inspector::apply(&self.session, InspectorAction::Activate(id));
                true
            }
            None => {
                log::warn!("activate: unknown node {id}");
                false
            }
        }
    }

    pub fn clear_activation(&self) {
        inspector::apply(&self.session, InspectorAction::Deselect);
    }

    pub fn hovered_id(&self) -> Option<String> {
        self.session.hovered().map(|id| id.to_string())
    }

    pub fn activated_id(&self) -> Option<String> {
        self.session.activated().map(|id| id.to_string())
    }

    /// Inspector rows as JSON `{"ok":true,"revision":...,"rows":[...],
    /// "sortable":[...]}` or `{"ok":false,"error":"..."}`.
    pub fn tree_json(&self) -> String {
        let snapshot = self.session.snapshot();
        let rows = inspector::build_rows(&snapshot, &NoData);
        let sortable = inspector::sortable_containers(&snapshot);
        match serde_json::to_value(&rows) {
            Ok(rows) => json!({
                "ok": true,
                "revision": snapshot.revision,
                "rows": rows,
                "sortable": sortable,
            })
            .to_string(),
            Err(e) => error_json(&format!("Serialization error: {e}")),
        }
    }

    /// Call `callback` with a JSON event string after every registry change.
    /// Returns a handle for [`FwSession::unsubscribe`], or an error once the
    /// handle space is exhausted.
    pub fn subscribe(&self, callback: js_sys::Function) -> Result<u32, JsValue> {
        let sub = self.session.subscribe(move |ev| {
            let payload = JsValue::from_str(&event_json(ev).to_string());
            if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
                log::warn!("registry listener threw: {e:?}");
            }
        });
        subscription_handle(sub).map_err(|e| {
            self.session.unsubscribe(sub);
            JsValue::from_str(&e)
        })
    }

    pub fn unsubscribe(&self, handle: u32) -> bool {
        self.session
            .unsubscribe(SubscriptionId::from_raw(u64::from(handle)))
    }

    /// End the session. Nodes still mounted are dropped without a flush.
    pub fn teardown(&mut self) {
        self.nodes.clear();
        self.session.teardown();
    }
}

impl Default for FwSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FwSession {
    fn from_config(config: SessionConfig) -> Self {
        console_error_panic_hook_setup();
        let mode = Rc::new(ModeSwitch::new(config.mode));
        let drag = Rc::new(DragFlag::new());
        let session = EditorSession::new(config, mode.clone(), drag.clone());
        Self {
            session,
            mode,
            drag,
            node: detectable_with(HostNode, Memo::Never),
            nodes: HashMap::new(),
        }
    }

    fn find(&self, id: &str) -> Option<&MountedNode> {
        let node = lookup(id).and_then(|id| self.nodes.get(&id));
        if node.is_none() {
            log::warn!("unknown node {id}");
        }
        node
    }

    fn pointer(&self, id: &str, mut event: PointerEvent) -> bool {
        let Some(node) = self.find(id) else {
            return false;
        };
        match &node.host.handlers {
            Some(handlers) => {
                handlers.handle(&mut event);
                event.is_propagation_stopped()
            }
            None => false,
        }
    }
}

/// Resolve an id string without interning unknown ones.
fn lookup(id: &str) -> Option<NodeId> {
    NodeId::lookup(id)
}

fn parse_metadata(json: Option<&str>) -> Result<Option<InjectedMetadata>, String> {
    json.map(InjectedMetadata::from_json).transpose()
}

/// JS-facing handle of a subscription. Fails rather than hand out a handle
/// that [`FwSession::unsubscribe`] could never match.
fn subscription_handle(sub: SubscriptionId) -> Result<u32, String> {
    u32::try_from(sub.raw()).map_err(|_| "subscription handles exhausted".to_string())
}

fn error_json(error: &str) -> String {
    json!({ "ok": false, "error": error }).to_string()
}

fn event_json(event: &RegistryEvent) -> Value {
    let slot = |id: &Option<NodeId>| id.map(|id| id.to_string());
    match event {
        RegistryEvent::MetadataChanged(id) => json!({"event": "metadataChanged", "id": id}),
        RegistryEvent::MetadataCleared(id) => json!({"event": "metadataCleared", "id": id}),
        RegistryEvent::RecordChanged(id) => json!({"event": "recordChanged", "id": id}),
        RegistryEvent::RecordCleared(id) => json!({"event": "recordCleared", "id": id}),
        RegistryEvent::HoverChanged(id) => json!({"event": "hoverChanged", "id": slot(id)}),
        RegistryEvent::ActivationChanged(id) => {
            json!({"event": "activationChanged", "id": slot(id)})
        }
        RegistryEvent::Reset => json!({"event": "reset"}),
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("FW WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no session needed) ───────────────────────────

/// Validate node metadata JSON. Returns `{"ok":true,"metadata":...}` with the
/// structural projection, or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_metadata(json: &str) -> String {
    match InjectedMetadata::from_json(json) {
        Ok(metadata) => json!({ "ok": true, "metadata": metadata.projection() }).to_string(),
        Err(e) => error_json(&e),
    }
}
