//! # Scheduler
//!
//! Deterministic replacement for the timer-driven convergence of a live
//! editing surface: selection settling after a mutation, debounced
//! persistence, observation resume on the next tick, throttled tool
//! refresh. Tasks are keyed by kind; scheduling a kind that is already
//! pending replaces it (debounce coalescing). Time only moves when the
//! driver advances it, so ordering is testable.

/// The task kinds the editor schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Re-derive the selection descriptor from the host selection.
    UpdateSelection,
    /// Write the current selection offsets into the active history entry.
    PersistSelection,
    /// Reconnect the mutation log after a programmatic rewrite.
    ResumeObservation,
    /// Push fresh state to registered plugins.
    RefreshTools,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    sequence: u64,
    pending: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    deadline: u64,
    sequence: u64,
    task: Task,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `task` to fire after `delay_ms`. A pending task of the same
    /// kind is replaced, resetting its deadline.
    pub fn debounce(&mut self, task: Task, delay_ms: u64) {
        self.pending.retain(|entry| entry.task != task);
        self.sequence += 1;
        self.pending.push(Entry {
            deadline: self.now + delay_ms,
            sequence: self.sequence,
            task,
        });
    }

    pub fn cancel(&mut self, task: Task) {
        self.pending.retain(|entry| entry.task != task);
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.pending.iter().any(|entry| entry.task == task)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest pending deadline, in absolute scheduler time.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|entry| entry.deadline).min()
    }

    /// Move the clock forward by `delta_ms` and return the tasks that came
    /// due, ordered by deadline then scheduling order.
    pub fn advance(&mut self, delta_ms: u64) -> Vec<Task> {
        self.advance_to(self.now + delta_ms)
    }

    /// Move the clock to absolute time `deadline` (never backwards) and
    /// return the due tasks.
    pub fn advance_to(&mut self, deadline: u64) -> Vec<Task> {
        self.now = self.now.max(deadline);
        let mut due: Vec<Entry> = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].deadline <= self.now {
                due.push(self.pending.remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|entry| (entry.deadline, entry.sequence));
        due.into_iter().map(|entry| entry.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_replaces_pending_task() {
        let mut scheduler = Scheduler::new();
        scheduler.debounce(Task::PersistSelection, 50);
        scheduler.advance(30);
        scheduler.debounce(Task::PersistSelection, 50);
        assert!(scheduler.advance(30).is_empty());
        assert_eq!(scheduler.advance(20), vec![Task::PersistSelection]);
    }

    #[test]
    fn test_due_order_by_deadline_then_insertion() {
        let mut scheduler = Scheduler::new();
        scheduler.debounce(Task::RefreshTools, 250);
        scheduler.debounce(Task::UpdateSelection, 10);
        scheduler.debounce(Task::PersistSelection, 10);
        assert_eq!(
            scheduler.advance(300),
            vec![Task::UpdateSelection, Task::PersistSelection, Task::RefreshTools]
        );
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        scheduler.debounce(Task::ResumeObservation, 10);
        scheduler.cancel(Task::ResumeObservation);
        assert!(scheduler.is_idle());
        assert!(scheduler.advance(100).is_empty());
    }
}
