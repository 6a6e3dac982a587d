//! Node detection: decorate any component so the editor can find it.
//!
//! [`detectable`] turns a [`Component`] into a [`Detectable`] one. Mounting a
//! detectable component gives a [`NodeInstance`] that owns a fresh [`NodeId`]
//! for as long as it lives:
//!
//! - The first render schedules registration of the node's record (its
//!   element handle and child-sort flag) and metadata. Registration is
//!   deferred to the next [`EditorSession::flush`], after the host has
//!   attached the element with [`NodeInstance::attach`].
//! - Later renders re-register metadata only when its projection (type,
//!   index, operation keys) changed. Identity and record stay put.
//! - Dropping the instance (or [`NodeInstance::unmount`]) schedules a purge of
//!   everything tied to its id.
//!
//! In edit mode the wrapped component also receives [`Handlers`] that write
//! the session's hover and activation slots. In preview mode it receives only
//! its identity, so exported screenshots carry no editor interactivity.
//!
//! Control props ([`DetectProps::metadata`], [`DetectProps::allow_child_sort`])
//! never reach the wrapped component: it sees its own `Props` and a
//! [`HostProps`] bundle, nothing else.

use crate::input::{Handlers, PointerEvent};
use crate::session::EditorSession;
use fw_core::{ElementHandle, InjectedMetadata, NodeId, NodeRecord, ProjectedMetadata, Registry};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A presentational component the editor can decorate.
pub trait Component {
    /// The component's own input.
    type Props;
    /// Whatever the host renders to (an element description, a DOM patch...).
    type Output;

    fn name(&self) -> &str;

    fn render(&self, props: &Self::Props, host: HostProps) -> Self::Output;
}

/// What the wrapper adds to the wrapped component's input.
#[derive(Debug, Clone, PartialEq)]
pub struct HostProps {
    pub id: NodeId,
    /// Name of the attribute that should carry `id` on the rendered element.
    pub data_attribute: String,
    /// `None` in preview mode.
    pub handlers: Option<Handlers>,
}

impl HostProps {
    /// `(name, value)` of the identity data attribute.
    pub fn data_attribute(&self) -> (&str, &str) {
        (&self.data_attribute, self.id.as_str())
    }

    pub fn is_interactive(&self) -> bool {
        self.handlers.is_some()
    }
}

/// Input of a detectable component: control props plus the forwarded ones.
#[derive(Debug, Clone)]
pub struct DetectProps<P> {
    pub metadata: Option<InjectedMetadata>,
    /// Whether the node's children may be reordered by the sort engine.
    pub allow_child_sort: bool,
    pub props: P,
}

impl<P> DetectProps<P> {
    pub fn new(props: P) -> Self {
        Self {
            metadata: None,
            allow_child_sort: false,
            props,
        }
    }

    pub fn metadata(mut self, metadata: impl Into<InjectedMetadata>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn allow_child_sort(mut self, allow: bool) -> Self {
        self.allow_child_sort = allow;
        self
    }
}

/// When a detectable component skips re-rendering its wrapped component.
pub enum Memo<P> {
    /// Skip when the predicate says previous and next props are equal.
    With(fn(&P, &P) -> bool),
    /// Always re-render.
    Never,
}

impl<P> Clone for Memo<P> {
    fn clone(&self) -> Self {
        match self {
            Self::With(eq) => Self::With(*eq),
            Self::Never => Self::Never,
        }
    }
}

impl<P> fmt::Debug for Memo<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::With(_) => f.write_str("Memo::With(..)"),
            Self::Never => f.write_str("Memo::Never"),
        }
    }
}

/// Result of rendering a [`NodeInstance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<T> {
    Fresh(T),
    /// Forwarded props unchanged; keep the previous output.
    Memoized,
}

impl<T> Rendered<T> {
    pub fn fresh(self) -> Option<T> {
        match self {
            Self::Fresh(output) => Some(output),
            Self::Memoized => None,
        }
    }

    pub fn is_memoized(&self) -> bool {
        matches!(self, Self::Memoized)
    }
}

/// Decorate `component`, memoizing on `PartialEq` of its props.
pub fn detectable<C>(component: C) -> Detectable<C>
where
    C: Component,
    C::Props: PartialEq,
{
    detectable_with(component, Memo::With(<C::Props as PartialEq>::eq))
}

/// Decorate `component` with an explicit memoization policy.
pub fn detectable_with<C: Component>(component: C, memo: Memo<C::Props>) -> Detectable<C> {
    Detectable {
        component: Rc::new(component),
        memo,
    }
}

/// A decorated component. Mount it once per place it appears in the tree.
pub struct Detectable<C: Component> {
    component: Rc<C>,
    memo: Memo<C::Props>,
}

impl<C: Component> Clone for Detectable<C> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            memo: self.memo.clone(),
        }
    }
}

impl<C: Component> fmt::Debug for Detectable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detectable")
            .field("name", &self.display_name())
            .field("memo", &self.memo)
            .finish()
    }
}

impl<C: Component> Detectable<C> {
    pub fn display_name(&self) -> String {
        format!("NodeDetected({})", self.component.name())
    }

    /// Start a new mount. Nothing is registered until the first render and
    /// the following flush.
    pub fn mount(&self, session: &EditorSession) -> NodeInstance<C> {
        let id = NodeId::generate();
        let generation = session.generation();
        log::debug!("mount {} as {id}", self.display_name());
        NodeInstance {
            id,
            generation,
            handlers: edit_handlers(session, id, generation),
            session: session.clone(),
            component: self.component.clone(),
            memo: self.memo.clone(),
            handle: Rc::new(Cell::new(None)),
            record_published: Rc::new(Cell::new(false)),
            mount_skipped: Rc::new(Cell::new(false)),
            registered: None,
            metadata: None,
            allow_child_sort: false,
            last_props: None,
            last_preview: None,
        }
    }
}

/// Handlers for edit mode, built once per mount so their identity is stable.
/// Handlers outliving a teardown do nothing.
fn edit_handlers(session: &EditorSession, id: NodeId, generation: u64) -> Handlers {
    let (enter, leave, click) = (session.clone(), session.clone(), session.clone());
    Handlers::new(
        move |ev: &mut PointerEvent| {
            if enter.generation() != generation || enter.is_dragging() {
                return;
            }
            ev.stop_propagation();
            enter.hover(id);
        },
        move |ev: &mut PointerEvent| {
            if leave.generation() != generation || leave.is_dragging() {
                return;
            }
            ev.stop_propagation();
            leave.clear_hover();
        },
        move |ev: &mut PointerEvent| {
            if click.generation() != generation {
                return;
            }
            ev.stop_propagation();
            click.activate(id);
        },
    )
}

/// One mounted detectable component.
pub struct NodeInstance<C: Component> {
    id: NodeId,
    /// Session generation at mount time.
    generation: u64,
    session: EditorSession,
    component: Rc<C>,
    memo: Memo<C::Props>,
    handlers: Handlers,
    /// Element handle, written by the host after commit.
    handle: Rc<Cell<Option<ElementHandle>>>,
    /// Set by the mount task once the record is in the registry.
    record_published: Rc<Cell<bool>>,
    /// Set by the mount task when it ran before any element was attached.
    mount_skipped: Rc<Cell<bool>>,
    /// Projection last scheduled for registration. `None` before the first
    /// render; `Some(None)` when the node was rendered without metadata.
    registered: Option<Option<ProjectedMetadata>>,
    /// Metadata of the latest render.
    metadata: Option<InjectedMetadata>,
    allow_child_sort: bool,
    last_props: Option<C::Props>,
    last_preview: Option<bool>,
}

impl<C: Component> NodeInstance<C> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Publish the mounted element. Hosts call this after committing the
    /// first render (and again if the element is ever re-created).
    pub fn attach(&self, handle: ElementHandle) {
        let previous = self.handle.replace(Some(handle));
        if self.mount_skipped.replace(false) {
            self.schedule_mount();
        } else if self.record_published.get() && previous != Some(handle) {
            self.schedule_record();
        }
    }

    pub fn handle(&self) -> Option<ElementHandle> {
        self.handle.get()
    }

    /// Render with new input.
    pub fn render(&mut self, input: DetectProps<C::Props>) -> Rendered<C::Output> {
        let DetectProps {
            metadata,
            allow_child_sort,
            props,
        } = input;

        self.sync_registration(metadata, allow_child_sort);

        let preview = self.session.is_preview();
        let unchanged = match (&self.memo, &self.last_props) {
            (Memo::With(eq), Some(prev)) => eq(prev, &props) && self.last_preview == Some(preview),
            _ => false,
        };
        if unchanged {
            return Rendered::Memoized;
        }

        let host = HostProps {
            id: self.id,
            data_attribute: self.session.config().data_attribute.clone(),
            handlers: (!preview).then(|| self.handlers.clone()),
        };
        let output = self.component.render(&props, host);
        self.last_props = Some(props);
        self.last_preview = Some(preview);
        Rendered::Fresh(output)
    }

    /// End this mount. Equivalent to dropping the instance.
    pub fn unmount(self) {}

    fn sync_registration(&mut self, metadata: Option<InjectedMetadata>, allow_child_sort: bool) {
        let projection = metadata.as_ref().map(InjectedMetadata::projection);
        let first = self.registered.is_none();
        let changed = self.registered.as_ref() != Some(&projection);
        self.metadata = metadata;
        if first {
            self.allow_child_sort = allow_child_sort;
            self.registered = Some(projection);
            self.schedule_mount();
            return;
        }
        if changed {
            self.registered = Some(projection);
            self.schedule_metadata();
        }
        if self.allow_child_sort != allow_child_sort {
            self.allow_child_sort = allow_child_sort;
            self.schedule_record();
        }
    }

    /// Register both halves with the latest metadata and child-sort flag.
    fn schedule_mount(&self) {
        let id = self.id;
        let handle = self.handle.clone();
        let published = self.record_published.clone();
        let skipped = self.mount_skipped.clone();
        let metadata = self.metadata.clone();
        let allows_child_sort = self.allow_child_sort;
        self.schedule(move |reg| {
            let Some(handle) = handle.get() else {
                log::warn!("{id} has no attached element yet, registering on attach");
                skipped.set(true);
                return;
            };
            if let Some(metadata) = metadata {
                reg.set_node_metadata(id, metadata);
            }
            reg.set_node_record(NodeRecord {
                id,
                handle,
                allows_child_sort,
            });
            published.set(true);
            log::debug!("registered {id}");
        });
    }

    fn schedule_metadata(&self) {
        let id = self.id;
        let published = self.record_published.clone();
        let metadata = self.metadata.clone();
        self.schedule(move |reg| {
            // Until the record is in, the mount task carries the metadata.
            if !published.get() {
                return;
            }
            match metadata {
                Some(metadata) => reg.set_node_metadata(id, metadata),
                None => reg.clear_node_metadata(id),
            }
        });
    }

    fn schedule_record(&self) {
        let id = self.id;
        let handle = self.handle.clone();
        let allows_child_sort = self.allow_child_sort;
        self.schedule(move |reg| {
            // No record yet (mount pending) or already purged.
            if reg.record(id).is_none() {
                return;
            }
            if let Some(handle) = handle.get() {
                reg.set_node_record(NodeRecord {
                    id,
                    handle,
                    allows_child_sort,
                });
            }
        });
    }

    fn schedule(&self, task: impl FnOnce(&mut Registry) + 'static) {
        if self.session.generation() != self.generation {
            log::debug!("{} outlived its session, dropping deferred work", self.id);
            return;
        }
        self.session.schedule(task);
    }
}

impl<C: Component> Drop for NodeInstance<C> {
    fn drop(&mut self) {
        let id = self.id;
        log::debug!("unmount {id}");
        self.schedule(move |reg| reg.purge(id));
    }
}

impl<C: Component> fmt::Debug for NodeInstance<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeInstance")
            .field("id", &self.id)
            .field("component", &self.component.name())
            .field("handle", &self.handle.get())
            .field("registered", &self.registered)
            .finish()
    }
}
