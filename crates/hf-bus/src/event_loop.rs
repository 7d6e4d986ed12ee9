//! Event Loop
//!
//! Cooperative single-threaded scheduler: a FIFO of deferred tasks plus
//! timers on a virtual clock. Nothing runs until the host drives the loop
//! with `run_until_idle` or `advance`, which keeps delivery order
//! deterministic.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

/// Timer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Timer {
    due_ms: u64,
    task: Task,
}

#[derive(Default)]
struct LoopState {
    now_ms: u64,
    next_timer: u64,
    tasks: VecDeque<Task>,
    timers: HashMap<TimerId, Timer>,
}

impl LoopState {
    /// Earliest timer due at or before `deadline`, ties broken by creation
    fn next_due(&self, deadline: u64) -> Option<TimerId> {
        self.timers
            .iter()
            .filter(|(_, t)| t.due_ms <= deadline)
            .min_by_key(|(id, t)| (t.due_ms, **id))
            .map(|(id, _)| *id)
    }
}

/// Shared handle to the loop; clones drive the same queue
#[derive(Clone, Default)]
pub struct EventLoop {
    state: Rc<RefCell<LoopState>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.state.borrow().now_ms
    }

    /// Run `task` on a later tick
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.state.borrow_mut().tasks.push_back(Box::new(task));
    }

    /// Run `task` once `delay_ms` of virtual time has elapsed
    pub fn set_timeout(&self, delay_ms: u64, task: impl FnOnce() + 'static) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_timer += 1;
        let id = TimerId(state.next_timer);
        let due_ms = state.now_ms.saturating_add(delay_ms);
        state.timers.insert(
            id,
            Timer {
                due_ms,
                task: Box::new(task),
            },
        );
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cleared.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        // Dropped outside the borrow: the task may own the last handle
        // to something that schedules on drop.
        let timer = self.state.borrow_mut().timers.remove(&id);
        timer.is_some()
    }

    /// Number of deferred tasks waiting to run
    pub fn pending_tasks(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Number of armed timers
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn has_pending(&self) -> bool {
        let state = self.state.borrow();
        !state.tasks.is_empty() || !state.timers.is_empty()
    }

    /// Run deferred tasks, including ones they schedule, until the queue
    /// is empty. Timers do not fire. Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // The borrow must end before the task runs: tasks reschedule.
            let task = self.state.borrow_mut().tasks.pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Advance the clock by `ms`, firing due timers in order and draining
    /// deferred work after each one. Returns the number of timers fired.
    pub fn advance(&self, ms: u64) -> usize {
        self.run_until_idle();
        let deadline = self.now().saturating_add(ms);
        let mut fired = 0;
        loop {
            let timer = {
                let mut state = self.state.borrow_mut();
                let Some(id) = state.next_due(deadline) else {
                    break;
                };
                let timer = state.timers.remove(&id);
                if let Some(t) = &timer {
                    state.now_ms = state.now_ms.max(t.due_ms);
                }
                timer
            };
            if let Some(timer) = timer {
                (timer.task)();
                fired += 1;
                self.run_until_idle();
            }
        }
        self.state.borrow_mut().now_ms = deadline;
        fired
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventLoop")
            .field("now_ms", &state.now_ms)
            .field("tasks", &state.tasks.len())
            .field("timers", &state.timers.len())
            .finish()
    }
}
