//! Optimistic local view of a task list.
//!
//! A mutation is applied speculatively before the server round trip.
//! Each speculative change is keyed by a mutation id and captures a
//! snapshot of the task it touched; on failure the snapshot is
//! restored, on success the server's row replaces the speculative one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::client::TaskDto;

/// Handle for one in-flight speculative mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationId(u64);

/// Shared, optimistically updated task list.
///
/// Cheap to clone; all clones observe the same list.
#[derive(Clone, Default)]
pub struct OptimisticTaskList {
    inner: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    tasks: Vec<TaskDto>,
    /// Snapshots of tasks with a speculative change in flight
    pending: HashMap<MutationId, TaskDto>,
    next_mutation: u64,
}

impl OptimisticTaskList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list, e.g. after a fresh fetch
    pub fn replace(&self, tasks: Vec<TaskDto>) {
        let mut state = self.inner.lock().expect("task list lock poisoned");
        state.tasks = tasks;
        state.pending.clear();
    }

    /// Current view of the list, speculative changes included
    pub fn tasks(&self) -> Vec<TaskDto> {
        self.inner.lock().expect("task list lock poisoned").tasks.clone()
    }

    /// Look up one task by id
    pub fn get(&self, task_id: &str) -> Option<TaskDto> {
        self.inner
            .lock()
            .expect("task list lock poisoned")
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }

    /// Apply a speculative change to one task, capturing its snapshot.
    ///
    /// Returns None when the task is not in the list; the caller then
    /// proceeds without optimistic state.
    pub fn apply(
        &self,
        task_id: &str,
        mutate: impl FnOnce(&mut TaskDto),
    ) -> Option<MutationId> {
        let mut state = self.inner.lock().expect("task list lock poisoned");

        let index = state.tasks.iter().position(|t| t.id == task_id)?;
        let snapshot = state.tasks[index].clone();

        let id = MutationId(state.next_mutation);
        state.next_mutation += 1;

        mutate(&mut state.tasks[index]);
        state.pending.insert(id, snapshot);

        Some(id)
    }

    /// Settle a mutation with the server's row, dropping the snapshot
    pub fn commit(&self, mutation: MutationId, server_task: TaskDto) {
        let mut state = self.inner.lock().expect("task list lock poisoned");

        state.pending.remove(&mutation);
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == server_task.id) {
            *task = server_task;
        }
    }

    /// Revert a failed mutation to its captured snapshot
    pub fn roll_back(&self, mutation: MutationId) {
        let mut state = self.inner.lock().expect("task list lock poisoned");

        if let Some(snapshot) = state.pending.remove(&mutation) {
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == snapshot.id) {
                *task = snapshot;
            }
        }
    }
}

impl std::fmt::Debug for OptimisticTaskList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock().expect("task list lock poisoned");
        f.debug_struct("OptimisticTaskList")
            .field("tasks", &state.tasks.len())
            .field("pending", &state.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskvault_types::{TaskPriority, TaskStatus};

    fn task(id: &str, status: TaskStatus) -> TaskDto {
        TaskDto {
            id: id.to_string(),
            title: "Water the plants".to_string(),
            description: None,
            status,
            priority: TaskPriority::Medium,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_speculative_change_is_visible_immediately() {
        let list = OptimisticTaskList::new();
        list.replace(vec![task("t1", TaskStatus::Pending)]);

        let mutation = list
            .apply("t1", |t| t.status = t.status.toggled())
            .unwrap();

        assert_eq!(list.get("t1").unwrap().status, TaskStatus::Completed);
        list.commit(mutation, task("t1", TaskStatus::Completed));
        assert_eq!(list.get("t1").unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let list = OptimisticTaskList::new();
        list.replace(vec![task("t1", TaskStatus::Pending)]);

        let mutation = list
            .apply("t1", |t| t.status = t.status.toggled())
            .unwrap();
        assert_eq!(list.get("t1").unwrap().status, TaskStatus::Completed);

        list.roll_back(mutation);
        assert_eq!(list.get("t1").unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn test_mutations_are_independent() {
        let list = OptimisticTaskList::new();
        list.replace(vec![
            task("t1", TaskStatus::Pending),
            task("t2", TaskStatus::Pending),
        ]);

        let m1 = list.apply("t1", |t| t.status = t.status.toggled()).unwrap();
        let m2 = list.apply("t2", |t| t.status = t.status.toggled()).unwrap();
        assert_ne!(m1, m2);

        // Rolling back one leaves the other's speculative state alone
        list.roll_back(m1);
        assert_eq!(list.get("t1").unwrap().status, TaskStatus::Pending);
        assert_eq!(list.get("t2").unwrap().status, TaskStatus::Completed);

        list.commit(m2, task("t2", TaskStatus::Completed));
        assert_eq!(list.get("t2").unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn test_unknown_task_yields_no_mutation() {
        let list = OptimisticTaskList::new();
        assert!(list.apply("missing", |_| {}).is_none());
    }
}
