//! Integration tests: detectable nodes against a live editor session
//! (fw-editor ↔ fw-core).
//!
//! Covers the full node lifecycle (mount, update, unmount) together with the
//! hover/activation slots, the mode gate and the drag coordinator.

use fw_core::{ElementHandle, MetaDataType, NodeMetadata, Operation, RegistryEvent};
use fw_editor::inspector::{self, InspectorAction, NoData};
use fw_editor::{
    DetectProps, DragFlag, EditorMode, EditorSession, Element, ElementProps, ModeSwitch,
    PointerEvent, SessionConfig, div, section,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

struct Editor {
    session: EditorSession,
    mode: Rc<ModeSwitch>,
    drag: Rc<DragFlag>,
}

fn editor() -> Editor {
    let _ = env_logger::builder().is_test(true).try_init();
    let mode = Rc::new(ModeSwitch::default());
    let drag = Rc::new(DragFlag::new());
    let session = EditorSession::new(SessionConfig::default(), mode.clone(), drag.clone());
    Editor {
        session,
        mode,
        drag,
    }
}

fn text_item(index: usize) -> NodeMetadata {
    NodeMetadata::new(MetaDataType::Custom("text".into()))
        .with_index(index)
        .with_operation(Operation::new("edit", "Edit"))
}

fn text(s: &str) -> DetectProps<ElementProps> {
    DetectProps::new(ElementProps::default().with_text(s))
}

// ─── Scenario ───────────────────────────────────────────────────────────

#[test]
fn single_node_round_trip() {
    let ed = editor();
    let mut x = div().mount(&ed.session);
    let el = x.render(text("X").metadata(text_item(0))).fresh().unwrap();
    x.attach(ElementHandle(10));
    ed.session.flush();

    let snapshot = ed.session.snapshot();
    assert_eq!(snapshot.ready().count(), 1);
    assert_eq!(ed.session.registry().len(), 1);

    let id = x.id();
    el.dispatch(id.as_str(), &mut PointerEvent::enter());
    assert_eq!(ed.session.hovered(), Some(id));
    el.dispatch(id.as_str(), &mut PointerEvent::click());
    assert_eq!(ed.session.activated(), Some(id));

    x.unmount();
    ed.session.flush();
    let reg = ed.session.registry();
    assert!(reg.is_empty());
    // Purging the hovered/activated node empties those slots.
    assert_eq!(reg.hovered(), None);
    assert_eq!(reg.activated(), None);
}

// ─── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn updates_then_unmount_leave_no_entries() {
    let ed = editor();
    let mut node = div().mount(&ed.session);
    node.attach(ElementHandle(1));
    let id = node.id();
    for i in 0..5 {
        node.render(text("t").metadata(text_item(i)));
        if i % 2 == 0 {
            ed.session.flush();
        }
    }
    node.render(text("t"));
    node.render(text("t").metadata(text_item(9)).allow_child_sort(true));
    drop(node);
    ed.session.flush();

    let reg = ed.session.registry();
    assert!(reg.record(id).is_none());
    assert!(reg.metadata(id).is_none());
}

#[test]
fn sibling_instances_never_share_state() {
    let ed = editor();
    let item = div();
    let mut a = item.mount(&ed.session);
    let mut b = item.mount(&ed.session);
    assert_ne!(a.id(), b.id());

    a.attach(ElementHandle(1));
    b.attach(ElementHandle(2));
    a.render(text("a").metadata(text_item(0)));
    b.render(text("b").metadata(text_item(1)));
    ed.session.flush();

    a.render(text("a").metadata(text_item(7)));
    ed.session.flush();
    let b_index = ed.session.registry().metadata(b.id()).unwrap().entries()[0].index;
    assert_eq!(b_index, Some(1));

    let b_id = b.id();
    a.unmount();
    ed.session.flush();
    let reg = ed.session.registry();
    assert!(reg.is_ready(b_id));
    assert_eq!(reg.record(b_id).unwrap().handle, ElementHandle(2));
}

#[test]
fn remount_gets_a_fresh_identity() {
    let ed = editor();
    let item = div();
    let mut first = item.mount(&ed.session);
    first.attach(ElementHandle(1));
    first.render(text("x").metadata(text_item(0)));
    let old = first.id();
    first.unmount();

    let mut second = item.mount(&ed.session);
    second.attach(ElementHandle(1));
    second.render(text("x").metadata(text_item(0)));
    ed.session.flush();

    let reg = ed.session.registry();
    assert_ne!(old, second.id());
    assert!(reg.record(old).is_none());
    assert!(reg.is_ready(second.id()));
}

// ─── Slots ──────────────────────────────────────────────────────────────

#[test]
fn hover_moves_and_activation_overwrites() {
    let ed = editor();
    let mut a = div().mount(&ed.session);
    let mut b = div().mount(&ed.session);
    let el_a = a.render(text("a")).fresh().unwrap();
    let el_b = b.render(text("b")).fresh().unwrap();
    let mut root = section().mount(&ed.session);
    let tree: Element = root
        .render(DetectProps::new(ElementProps::default().with_child(el_a).with_child(el_b)))
        .fresh()
        .unwrap();

    tree.dispatch(a.id().as_str(), &mut PointerEvent::enter());
    tree.dispatch(b.id().as_str(), &mut PointerEvent::enter());
    assert_eq!(ed.session.hovered(), Some(b.id()));

    tree.dispatch(a.id().as_str(), &mut PointerEvent::click());
    tree.dispatch(b.id().as_str(), &mut PointerEvent::click());
    assert_eq!(ed.session.activated(), Some(b.id()));
    tree.dispatch(a.id().as_str(), &mut PointerEvent::click());
    assert_eq!(ed.session.activated(), Some(a.id()));
    tree.dispatch(a.id().as_str(), &mut PointerEvent::click());
    assert_eq!(ed.session.activated(), Some(a.id()), "clicking again does not toggle");
}

#[test]
fn drag_freezes_hover() {
    let ed = editor();
    let mut a = div().mount(&ed.session);
    let mut b = div().mount(&ed.session);
    let el_a = a.render(text("a")).fresh().unwrap();
    let el_b = b.render(text("b")).fresh().unwrap();
    el_a.dispatch(a.id().as_str(), &mut PointerEvent::enter());

    ed.drag.start();
    el_a.dispatch(a.id().as_str(), &mut PointerEvent::leave());
    el_b.dispatch(b.id().as_str(), &mut PointerEvent::enter());
    assert_eq!(ed.session.hovered(), Some(a.id()));
    ed.drag.end();

    el_a.dispatch(a.id().as_str(), &mut PointerEvent::leave());
    assert_eq!(ed.session.hovered(), None);
}

#[test]
fn preview_mode_is_inert() {
    let ed = editor();
    ed.mode.set(EditorMode::Preview);
    let mut node = div().mount(&ed.session);
    node.attach(ElementHandle(3));
    let el = node.render(text("x").metadata(text_item(0))).fresh().unwrap();
    assert!(el.handlers.is_none());
    ed.session.flush();
    let revision = ed.session.registry().revision();

    let id = node.id();
    assert_eq!(el.dispatch(id.as_str(), &mut PointerEvent::enter()), 0);
    assert_eq!(el.dispatch(id.as_str(), &mut PointerEvent::click()), 0);
    assert_eq!(ed.session.registry().revision(), revision);
    assert_eq!(ed.session.hovered(), None);
    assert_eq!(ed.session.activated(), None);
}

// ─── Metadata comparison ────────────────────────────────────────────────

#[test]
fn only_structural_changes_reach_the_registry() {
    let ed = editor();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    ed.session.subscribe(move |ev| sink.borrow_mut().push(*ev));

    let mut node = div().mount(&ed.session);
    node.attach(ElementHandle(1));
    node.render(text("x").metadata(text_item(0)));
    ed.session.flush();
    let id = node.id();
    assert_eq!(
        *events.borrow(),
        vec![RegistryEvent::MetadataChanged(id), RegistryEvent::RecordChanged(id)]
    );
    events.borrow_mut().clear();

    node.render(text("x").metadata(text_item(0).with_display_name(|_| "renamed".into())));
    ed.session.flush();
    assert!(events.borrow().is_empty());

    node.render(text("x").metadata(text_item(0).with_operation(Operation::new("delete", "Delete"))));
    ed.session.flush();
    assert_eq!(*events.borrow(), vec![RegistryEvent::MetadataChanged(id)]);
}

// ─── Inspector ──────────────────────────────────────────────────────────

#[test]
fn inspector_follows_the_rendered_tree() {
    let ed = editor();
    let mut list = section().mount(&ed.session);
    let mut item = div().mount(&ed.session);
    list.attach(ElementHandle(1));
    item.attach(ElementHandle(2));
    list.render(
        DetectProps::new(ElementProps::default())
            .metadata(NodeMetadata::new(MetaDataType::ConversationList))
            .allow_child_sort(true),
    );
    item.render(text("hello").metadata(NodeMetadata::new(MetaDataType::ConversationItem).with_index(0)));
    ed.session.flush();

    let labels: Vec<_> = inspector::build_rows(&ed.session.snapshot(), &NoData)
        .into_iter()
        .map(|row| row.label)
        .collect();
    assert_eq!(labels, vec!["Conversation".to_string(), "Message #0".to_string()]);
    assert_eq!(inspector::sortable_containers(&ed.session.snapshot()), vec![list.id()]);

    inspector::apply(&ed.session, InspectorAction::Activate(item.id()));
    assert_eq!(ed.session.activated(), Some(item.id()));
    inspector::apply(&ed.session, InspectorAction::Hover(list.id()));
    assert_eq!(ed.session.hovered(), Some(list.id()));

    let gone = item.id();
    item.unmount();
    ed.session.flush();
    inspector::apply(&ed.session, InspectorAction::Activate(gone));
    assert_eq!(ed.session.activated(), None);
    inspector::apply(&ed.session, InspectorAction::Leave);
    assert_eq!(ed.session.hovered(), None);
}
