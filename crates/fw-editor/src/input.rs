//! Pointer events and bubbling dispatch.
//!
//! Hosts translate their native events (DOM `mouseover`/`mouseleave`/`click`,
//! a terminal hit-test, a test harness) into [`PointerEvent`]s and bubble them
//! from the innermost detected node outwards with [`dispatch`].

use std::fmt;
use std::rc::Rc;

/// Kind of pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Pointer moved over the node (or one of its descendants).
    Enter,
    /// Pointer left the node.
    Leave,
    Click,
}

/// A pointer event travelling through nested nodes.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    pub kind: PointerKind,
    propagation_stopped: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerKind) -> Self {
        Self {
            kind,
            propagation_stopped: false,
        }
    }

    pub fn enter() -> Self {
        Self::new(PointerKind::Enter)
    }

    pub fn leave() -> Self {
        Self::new(PointerKind::Leave)
    }

    pub fn click() -> Self {
        Self::new(PointerKind::Click)
    }

    /// Keep enclosing nodes from seeing this event.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

type Handler = Rc<dyn Fn(&mut PointerEvent)>;

/// Interaction handlers attached to a rendered node in edit mode.
///
/// Cloning shares the same closures, so two clones compare equal.
#[derive(Clone)]
pub struct Handlers {
    on_pointer_enter: Handler,
    on_pointer_leave: Handler,
    on_click: Handler,
}

impl Handlers {
    pub fn new(
        on_pointer_enter: impl Fn(&mut PointerEvent) + 'static,
        on_pointer_leave: impl Fn(&mut PointerEvent) + 'static,
        on_click: impl Fn(&mut PointerEvent) + 'static,
    ) -> Self {
        Self {
            on_pointer_enter: Rc::new(on_pointer_enter),
            on_pointer_leave: Rc::new(on_pointer_leave),
            on_click: Rc::new(on_click),
        }
    }

    /// Run the handler matching `event.kind`.
    pub fn handle(&self, event: &mut PointerEvent) {
        match event.kind {
            PointerKind::Enter => (self.on_pointer_enter)(event),
            PointerKind::Leave => (self.on_pointer_leave)(event),
            PointerKind::Click => (self.on_click)(event),
        }
    }
}

impl PartialEq for Handlers {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.on_pointer_enter, &other.on_pointer_enter)
            && Rc::ptr_eq(&self.on_pointer_leave, &other.on_pointer_leave)
            && Rc::ptr_eq(&self.on_click, &other.on_click)
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handlers(enter, leave, click)")
    }
}

/// Bubble `event` through `path`, innermost first. Nodes without handlers
/// (preview mode, plain elements) are skipped. Returns how many handlers ran.
pub fn dispatch(event: &mut PointerEvent, path: &[Option<&Handlers>]) -> usize {
    let mut ran = 0;
    for handlers in path.iter().flatten() {
        handlers.handle(event);
        ran += 1;
        if event.is_propagation_stopped() {
            break;
        }
    }
    ran
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recording(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str, stop: bool) -> Handlers {
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        Handlers::new(
            move |ev| {
                a.borrow_mut().push(name);
                if stop {
                    ev.stop_propagation();
                }
            },
            move |_| b.borrow_mut().push(name),
            move |_| c.borrow_mut().push(name),
        )
    }

    #[test]
    fn stop_propagation_ends_bubbling() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner = recording(&log, "inner", true);
        let outer = recording(&log, "outer", true);
        let mut ev = PointerEvent::enter();
        let ran = dispatch(&mut ev, &[Some(&inner), Some(&outer)]);
        assert_eq!(ran, 1);
        assert_eq!(*log.borrow(), vec!["inner"]);
    }

    #[test]
    fn events_bubble_until_stopped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner = recording(&log, "inner", false);
        let outer = recording(&log, "outer", true);
        let mut ev = PointerEvent::enter();
        dispatch(&mut ev, &[Some(&inner), None, Some(&outer)]);
        assert_eq!(*log.borrow(), vec!["inner", "outer"]);
    }

    #[test]
    fn clones_compare_equal() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recording(&log, "a", false);
        let b = recording(&log, "a", false);
        assert_eq!(a.clone(), a);
        assert_ne!(a, b);
    }
}
