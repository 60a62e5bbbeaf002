//! Flat, id-indexed storage for a plan's task tree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Task, TaskId};

/// Owns every task of a plan in a flat map, with the tree expressed as
/// parent/child id lists on the tasks themselves.
///
/// Storing tasks flat keeps `depends_on` lookups O(1) even when the
/// referenced task lives in a different branch of the tree, and avoids
/// shared mutable references across subtrees. Root order and per-task
/// subtask order are declaration order, which makes every traversal
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskArena {
    tasks: HashMap<TaskId, Task>,
    roots: Vec<TaskId>,
}

impl TaskArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task, linking it under its parent (or as a root when it
    /// has none). The parent, if any, must already be present.
    pub fn insert(&mut self, task: Task) {
        let id = task.id;
        match task.parent {
            Some(parent_id) => {
                if let Some(parent) = self.tasks.get_mut(&parent_id) {
                    parent.subtasks.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.tasks.insert(id, task);
    }

    /// Looks up a task by id.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Looks up a task by id, mutably.
    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    /// Whether the arena holds a task with the given id.
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Root task ids in declaration order.
    pub fn roots(&self) -> &[TaskId] {
        &self.roots
    }

    /// Total number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the arena holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Flattens the tree into pre-order: parent before children, siblings
    /// and roots in declaration order.
    ///
    /// This ordering is the canonical "all tasks" view used by the
    /// dependency analyzer, the execution queue, the progress estimator
    /// and the visualizer.
    pub fn flatten(&self) -> Vec<TaskId> {
        let mut order = Vec::with_capacity(self.tasks.len());
        let mut stack: Vec<TaskId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(task) = self.tasks.get(&id) {
                order.push(id);
                stack.extend(task.subtasks.iter().rev().copied());
            }
        }
        order
    }

    /// Iterates tasks in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> + '_ {
        self.flatten()
            .into_iter()
            .filter_map(move |id| self.tasks.get(&id))
    }
}
