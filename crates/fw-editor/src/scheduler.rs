//! Deferred registry work.
//!
//! Node registration and teardown never happen inside a render pass. The
//! wrapper schedules them here and the host flushes the queue once the pass is
//! committed and element handles are attached. Tasks run in FIFO order, so a
//! node's registration always precedes its metadata updates and its purge.

use fw_core::Registry;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Task = Box<dyn FnOnce(&mut Registry)>;

/// Shared FIFO of tasks waiting for the next flush.
#[derive(Clone, Default)]
pub struct TaskQueue {
    pending: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, task: impl FnOnce(&mut Registry) + 'static) {
        self.pending.borrow_mut().push_back(Box::new(task));
    }

    /// Run every pending task, including ones scheduled while flushing.
    /// Returns the number of tasks run.
    pub fn flush(&self, registry: &mut Registry) -> usize {
        let mut ran = 0;
        loop {
            // Release the queue before running, tasks may schedule more.
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    task(registry);
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }

    /// Drop pending tasks without running them.
    pub fn clear(&self) -> usize {
        let mut pending = self.pending.borrow_mut();
        let dropped = pending.len();
        pending.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_core::{ElementHandle, NodeId, NodeRecord};

    #[test]
    fn nothing_runs_before_flush() {
        let queue = TaskQueue::new();
        let mut reg = Registry::new();
        let id = NodeId::generate();
        queue.schedule(move |reg| {
            reg.set_node_record(NodeRecord {
                id,
                handle: ElementHandle(7),
                allows_child_sort: false,
            });
        });
        assert!(reg.record(id).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.flush(&mut reg), 1);
        assert!(reg.record(id).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn tasks_run_in_order_including_nested() {
        let queue = TaskQueue::new();
        let mut reg = Registry::new();
        let a = NodeId::generate();
        let b = NodeId::generate();
        let nested = queue.clone();
        queue.schedule(move |reg| {
            reg.set_hovered(Some(a));
            nested.schedule(move |reg| reg.set_hovered(Some(b)));
        });
        queue.schedule(move |reg| reg.set_activated(reg.hovered()));
        assert_eq!(queue.flush(&mut reg), 3);
        assert_eq!(reg.activated(), Some(a));
        assert_eq!(reg.hovered(), Some(b));
    }

    #[test]
    fn clear_drops_pending() {
        let queue = TaskQueue::new();
        let mut reg = Registry::new();
        queue.schedule(|reg| reg.set_hovered(Some(NodeId::generate())));
        assert_eq!(queue.clear(), 1);
        assert_eq!(queue.flush(&mut reg), 0);
        assert_eq!(reg.hovered(), None);
    }
}
