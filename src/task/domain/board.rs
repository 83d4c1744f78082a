//! Kanban board projection of visible tasks.

use super::{OwnedTask, TaskStatus};
use serde::Serialize;

/// Visible tasks grouped into one column per status.
///
/// Each column keeps the order of the input listing, so a newest-first
/// listing yields newest-first columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskBoard {
    /// Tasks not yet started.
    pub incomplete: Vec<OwnedTask>,
    /// Tasks being worked on.
    pub inprogress: Vec<OwnedTask>,
    /// Finished tasks.
    pub complete: Vec<OwnedTask>,
}

impl TaskBoard {
    /// Groups tasks by status.
    #[must_use]
    pub fn from_tasks(tasks: impl IntoIterator<Item = OwnedTask>) -> Self {
        let mut board = Self::default();
        for owned in tasks {
            board.column_mut(owned.task().status()).push(owned);
        }
        board
    }

    /// Returns the column for `status`.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[OwnedTask] {
        match status {
            TaskStatus::Incomplete => &self.incomplete,
            TaskStatus::InProgress => &self.inprogress,
            TaskStatus::Complete => &self.complete,
        }
    }

    /// Returns the total number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        TaskStatus::ALL
            .iter()
            .map(|status| self.column(*status).len())
            .sum()
    }

    /// Returns `true` when every column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn column_mut(&mut self, status: TaskStatus) -> &mut Vec<OwnedTask> {
        match status {
            TaskStatus::Incomplete => &mut self.incomplete,
            TaskStatus::InProgress => &mut self.inprogress,
            TaskStatus::Complete => &mut self.complete,
        }
    }
}
