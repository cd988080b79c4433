//! In-memory task list with tentative (pending) entries.

use std::collections::{HashMap, HashSet};

use crate::task::{sort_by_priority, Task};

/// Remote operation an entry is waiting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingOp {
    Create,
    Toggle,
}

/// A task plus the marker of any unconfirmed change applied to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub task: Task,
    pub pending: Option<PendingOp>,
}

impl Entry {
    fn settled(task: Task) -> Self {
        Self { task, pending: None }
    }
}

/// Ordered task list owned by the sync controller.
///
/// Entries are kept sorted by priority (highest first, stable). Only
/// membership and priority changes re-sort; flipping `done` never moves an
/// entry. Ids removed by a delete that is still in flight are tombstoned so a
/// reload cannot bring them back before the delete settles.
#[derive(Debug, Default)]
pub(crate) struct TaskState {
    entries: Vec<Entry>,
    tombstones: HashSet<String>,
}

impl TaskState {
    pub fn tasks(&self) -> Vec<Task> {
        self.entries.iter().map(|e| e.task.clone()).collect()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.task.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.task.id == id)
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.task.priority.cmp(&a.task.priority));
    }

    /// Insert a not-yet-confirmed task at the head of the list.
    pub fn insert_tentative(&mut self, task: Task) {
        self.entries.insert(
            0,
            Entry {
                task,
                pending: Some(PendingOp::Create),
            },
        );
        self.sort();
    }

    /// Swap the tentative entry `temp_id` for the authoritative record.
    ///
    /// Any other entry already carrying the real id (a reload that raced the
    /// create response) is dropped, so exactly one entry remains.
    pub fn promote(&mut self, temp_id: &str, task: Task) {
        let real_id = task.id.clone();
        self.entries.retain(|e| e.task.id != real_id);

        match self.position(temp_id) {
            Some(index) => self.entries[index] = Entry::settled(task),
            None => self.entries.insert(0, Entry::settled(task)),
        }
        self.sort();
    }

    /// Remove an entry, returning it with the index it occupied.
    fn remove(&mut self, id: &str) -> Option<(usize, Entry)> {
        let index = self.position(id)?;
        Some((index, self.entries.remove(index)))
    }

    /// Remove an entry for a pending delete and tombstone its id until
    /// [`TaskState::finish_delete`] or [`TaskState::restore`].
    pub fn begin_delete(&mut self, id: &str) -> Option<(usize, Entry)> {
        let removed = self.remove(id)?;
        self.tombstones.insert(id.to_string());
        Some(removed)
    }

    pub fn finish_delete(&mut self, id: &str) {
        self.tombstones.remove(id);
    }

    /// Put a removed entry back where it was, replacing any copy of the same
    /// id that arrived in the meantime.
    pub fn restore(&mut self, index: usize, entry: Entry) {
        self.tombstones.remove(&entry.task.id);
        self.entries.retain(|e| e.task.id != entry.task.id);
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        self.sort();
    }

    /// Flip `done` on `id`, returning the new value.
    pub fn flip_done(&mut self, id: &str) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.task.id == id)?;
        entry.task.done = !entry.task.done;
        Some(entry.task.done)
    }

    /// Record the server's `done` value for a confirmed toggle and clear the marker.
    pub fn settle_toggle(&mut self, record: &Task) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.task.id == record.id) {
            entry.task.done = record.done;
            entry.pending = None;
        }
    }

    pub fn set_pending(&mut self, id: &str, pending: Option<PendingOp>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.task.id == id) {
            entry.pending = pending;
        }
    }

    /// Replace the list with `tasks`.
    ///
    /// Pending changes survive the swap:
    /// - creates still in flight are kept; their own completion reconciles them
    /// - an incoming record with a toggle in flight keeps the local `done`
    /// - tombstoned ids are left out
    ///
    /// Duplicate ids in `tasks` keep their first occurrence.
    pub fn replace_all(&mut self, mut tasks: Vec<Task>) {
        let mut seen = HashSet::new();
        tasks.retain(|t| !self.tombstones.contains(&t.id) && seen.insert(t.id.clone()));
        sort_by_priority(&mut tasks);

        let mut creating = Vec::new();
        let mut toggling = HashMap::new();
        for entry in self.entries.drain(..) {
            match entry.pending {
                Some(PendingOp::Create) => creating.push(entry),
                Some(PendingOp::Toggle) => {
                    toggling.insert(entry.task.id.clone(), entry.task.done);
                }
                None => {}
            }
        }

        self.entries = creating;
        self.entries.extend(tasks.into_iter().map(|mut task| match toggling.get(&task.id) {
            Some(&done) => {
                task.done = done;
                Entry {
                    task,
                    pending: Some(PendingOp::Toggle),
                }
            }
            None => Entry::settled(task),
        }));
        self.sort();
    }
}
