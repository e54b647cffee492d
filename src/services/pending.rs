use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{UpdateAssignmentInput, UpdateCourseInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Course,
    Assignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangePayload {
    Course(UpdateCourseInput),
    Assignment(UpdateAssignmentInput),
    Delete { id: String },
}

/// A locally applied edit waiting for the remote service to confirm it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    pub kind: EntityKind,
    pub action: ChangeAction,
    pub payload: ChangePayload,
}

impl PendingChange {
    pub fn update_course(input: UpdateCourseInput) -> Self {
        Self {
            kind: EntityKind::Course,
            action: ChangeAction::Update,
            payload: ChangePayload::Course(input),
        }
    }

    pub fn delete_course(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Course,
            action: ChangeAction::Delete,
            payload: ChangePayload::Delete { id: id.into() },
        }
    }

    pub fn update_assignment(input: UpdateAssignmentInput) -> Self {
        Self {
            kind: EntityKind::Assignment,
            action: ChangeAction::Update,
            payload: ChangePayload::Assignment(input),
        }
    }

    pub fn delete_assignment(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Assignment,
            action: ChangeAction::Delete,
            payload: ChangePayload::Delete { id: id.into() },
        }
    }
}

/// Latest pending change per entity id, ordered by most recent write.
#[derive(Debug, Default)]
pub struct PendingChanges {
    entries: IndexMap<String, PendingChange>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the change for `id`. A replaced entry moves to the
    /// back of the queue.
    pub fn set(&mut self, id: impl Into<String>, change: PendingChange) {
        let id = id.into();
        self.entries.shift_remove(&id);
        self.entries.insert(id, change);
    }

    /// Empties the store and returns its entries in queue order.
    pub fn take_all(&mut self) -> Vec<(String, PendingChange)> {
        std::mem::take(&mut self.entries).into_iter().collect()
    }

    /// Puts back a change whose flush failed. A change queued for the same id
    /// while the flush was running is newer and wins.
    ///
    /// Returns whether the failed change was restored.
    pub fn reinsert(&mut self, id: impl Into<String>, change: PendingChange) -> bool {
        let id = id.into();
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, change);
        true
    }

    pub fn get(&self, id: &str) -> Option<&PendingChange> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PendingChange)> {
        self.entries.iter()
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &PendingChange) -> bool,
    {
        self.entries.retain(|id, change| keep(id, change));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
