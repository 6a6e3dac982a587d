//! Editor session: the owner of all interaction state.
//!
//! A session is created when the editor opens a document and torn down when
//! it closes. It owns the [`Registry`], the deferred [`TaskQueue`], and the
//! read handles of the two external collaborators (mode gate, drag
//! coordinator). Nothing outside a session can reach the registry.
//!
//! Session subscribers are notified after the registry borrow is released,
//! so a listener may freely read the session (take a snapshot, query the
//! hovered node) while handling an event.

use crate::config::SessionConfig;
use crate::drag::DragCoordinator;
use crate::mode::ModeGate;
use crate::scheduler::TaskQueue;
use fw_core::{NodeId, Registry, RegistryEvent, RegistrySnapshot, SubscriptionId};
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

type Listener = Box<dyn FnMut(&RegistryEvent)>;

struct SessionInner {
    config: SessionConfig,
    registry: RefCell<Registry>,
    tasks: TaskQueue,
    mode: Rc<dyn ModeGate>,
    drag: Rc<dyn DragCoordinator>,
    /// Registry events not yet delivered to session listeners.
    pending: Rc<RefCell<Vec<RegistryEvent>>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
    /// Set while listeners run; nested writes leave delivery to the outer loop.
    notifying: Cell<bool>,
    /// Bumped by teardown. Instances mounted in an earlier generation are dead.
    generation: Cell<u64>,
}

/// Shared handle to one editor session. Cloning is cheap.
#[derive(Clone)]
pub struct EditorSession {
    inner: Rc<SessionInner>,
}

impl EditorSession {
    pub fn new(
        config: SessionConfig,
        mode: Rc<dyn ModeGate>,
        drag: Rc<dyn DragCoordinator>,
    ) -> Self {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let mut registry = Registry::new();
        let sink = pending.clone();
        registry.subscribe(move |ev| sink.borrow_mut().push(*ev));

        log::debug!("editor session started (mode: {:?})", config.mode);
        Self {
            inner: Rc::new(SessionInner {
                config,
                registry: RefCell::new(registry),
                tasks: TaskQueue::new(),
                mode,
                drag,
                pending,
                listeners: RefCell::new(Vec::new()),
                next_subscription: Cell::new(0),
                notifying: Cell::new(false),
                generation: Cell::new(0),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn is_preview(&self) -> bool {
        self.inner.mode.is_preview()
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.drag.is_dragging()
    }

    /// Read access to the registry. Do not hold across session writes.
    pub fn registry(&self) -> Ref<'_, Registry> {
        self.inner.registry.borrow()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry().snapshot()
    }

    /// Incremented on every [`EditorSession::teardown`].
    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }

    // ─── Deferred work ───────────────────────────────────────────────────

    pub(crate) fn schedule(&self, task: impl FnOnce(&mut Registry) + 'static) {
        self.inner.tasks.schedule(task);
    }

    /// Number of tasks waiting for [`EditorSession::flush`].
    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.len()
    }

    /// Run deferred registrations and purges. Hosts call this once a render
    /// pass is committed and element handles are attached.
    pub fn flush(&self) -> usize {
        let ran = {
            let mut registry = self.inner.registry.borrow_mut();
            self.inner.tasks.flush(&mut registry)
        };
        if ran > 0 {
            log::trace!("flushed {ran} deferred tasks");
        }
        self.notify();
        ran
    }

    // ─── Interaction slots ───────────────────────────────────────────────

    pub fn hovered(&self) -> Option<NodeId> {
        self.registry().hovered()
    }

    pub fn activated(&self) -> Option<NodeId> {
        self.registry().activated()
    }

    pub fn hover(&self, id: NodeId) {
        self.write(|reg| reg.set_hovered(Some(id)));
    }

    pub fn clear_hover(&self) {
        self.write(|reg| reg.set_hovered(None));
    }

    /// Make `id` the node being edited. Overwrites any previous activation.
    pub fn activate(&self, id: NodeId) {
        self.write(|reg| reg.set_activated(Some(id)));
    }

    pub fn clear_activation(&self) {
        self.write(|reg| reg.set_activated(None));
    }

    // ─── Observation ─────────────────────────────────────────────────────

    pub fn subscribe(&self, listener: impl FnMut(&RegistryEvent) + 'static) -> SubscriptionId {
        let next = self.inner.next_subscription.get();
        self.inner.next_subscription.set(next + 1);
        let id = SubscriptionId::from_raw(next);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// End the session: drop pending tasks and empty the registry.
    /// Instances mounted before the teardown schedule nothing afterwards.
    pub fn teardown(&self) {
        self.inner.generation.set(self.inner.generation.get() + 1);
        let dropped = self.inner.tasks.clear();
        log::debug!("editor session torn down ({dropped} pending tasks dropped)");
        self.write(Registry::reset);
    }

    fn write(&self, f: impl FnOnce(&mut Registry)) {
        {
            let mut registry = self.inner.registry.borrow_mut();
            f(&mut *registry);
        }
        self.notify();
    }

    fn notify(&self) {
        if self.inner.notifying.replace(true) {
            return;
        }
        loop {
            let events = std::mem::take(&mut *self.inner.pending.borrow_mut());
            if events.is_empty() {
                break;
            }
            // Listeners may subscribe while running; merge those back after.
            let mut listeners = std::mem::take(&mut *self.inner.listeners.borrow_mut());
            for event in &events {
                for (_, listener) in &mut listeners {
                    listener(event);
                }
            }
            let mut slot = self.inner.listeners.borrow_mut();
            listeners.append(&mut *slot);
            *slot = listeners;
        }
        self.inner.notifying.set(false);
    }
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("config", &self.inner.config)
            .field("registry", &*self.inner.registry.borrow())
            .field("tasks", &self.inner.tasks)
            .finish()
    }
}
