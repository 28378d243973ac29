use crate::model::{DueNote, Filter, Priority, Status, Task, TaskId};
use crate::store::Store;
use crate::validation::{parse_description, InputError};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid task number {0}")]
    InvalidSelection(usize),

    #[error(transparent)]
    Input(#[from] InputError),

    /// The store could not be written. Not recoverable.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// The in-memory task collection, in insertion order, written back to its
/// store after every change.
pub struct TaskList<S: Store> {
    entries: Vec<(TaskId, Task)>,
    next_id: u64,
    store: S,
}

/// A filtered snapshot of the collection, as shown to the user. Selection
/// numbers typed afterwards refer to its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub filter: Filter,
    pub entries: Vec<ViewEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry {
    pub id: TaskId,
    pub task: Task,
    pub note: Option<DueNote>,
}

/// Replacement values for an edit. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Task),
    Cancelled,
}

impl<S: Store> TaskList<S> {
    /// Build the collection from whatever the store holds.
    pub fn load(store: S) -> Self {
        let mut list = TaskList {
            entries: Vec::new(),
            next_id: 1,
            store,
        };
        for task in list.store.load() {
            let id = list.allocate_id();
            list.entries.push((id, task));
        }
        list
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.entries.iter().map(|(_, task)| task)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a new pending task and save.
    pub fn add(
        &mut self,
        description: &str,
        due_date: Option<NaiveDate>,
        priority: Priority,
    ) -> Result<TaskId, TaskError> {
        let description = parse_description(description)?;
        let id = self.allocate_id();
        self.entries.push((id, Task::new(description, due_date, priority)));
        self.persist()?;
        Ok(id)
    }

    /// Return the tasks kept by `filter`, each with its due note for `today`.
    pub fn view(&self, filter: Filter, today: NaiveDate) -> View {
        let entries = self
            .entries
            .iter()
            .filter(|(_, task)| task.matches(filter, today))
            .map(|(id, task)| ViewEntry {
                id: *id,
                task: task.clone(),
                note: task.due_note(today),
            })
            .collect();
        View { filter, entries }
    }

    /// Complete the task at 1-based `selection` of `view`.
    pub fn mark_completed(&mut self, view: &View, selection: usize) -> Result<&Task, TaskError> {
        let index = self.resolve(view, selection)?;
        self.entries[index].1.status = Status::Completed;
        self.persist()?;
        Ok(&self.entries[index].1)
    }

    /// Apply `edit` to the task at 1-based `selection` of `view`. The store
    /// is written even when nothing changed.
    pub fn edit(
        &mut self,
        view: &View,
        selection: usize,
        edit: TaskEdit,
    ) -> Result<&Task, TaskError> {
        let index = self.resolve(view, selection)?;
        let task = &mut self.entries[index].1;
        if let Some(description) = edit.description {
            if !description.trim().is_empty() {
                task.description = description.trim().to_string();
            }
        }
        if let Some(due_date) = edit.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(priority) = edit.priority {
            task.priority = priority;
        }
        self.persist()?;
        Ok(&self.entries[index].1)
    }

    /// Remove the task at 1-based `selection` of `view` if `confirmed`.
    pub fn delete(
        &mut self,
        view: &View,
        selection: usize,
        confirmed: bool,
    ) -> Result<DeleteOutcome, TaskError> {
        let index = self.resolve(view, selection)?;
        if !confirmed {
            return Ok(DeleteOutcome::Cancelled);
        }
        let (_, removed) = self.entries.remove(index);
        self.persist()?;
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// Map a view row back to its position in the collection.
    fn resolve(&self, view: &View, selection: usize) -> Result<usize, TaskError> {
        let id = view
            .get(selection)
            .map(|entry| entry.id)
            .ok_or(TaskError::InvalidSelection(selection))?;
        self.entries
            .iter()
            .position(|(entry_id, _)| *entry_id == id)
            .ok_or(TaskError::InvalidSelection(selection))
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    fn persist(&mut self) -> Result<(), TaskError> {
        let tasks: Vec<Task> = self.tasks().cloned().collect();
        self.store.save(&tasks)?;
        Ok(())
    }
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Row at 1-based `selection`, if any.
    pub fn get(&self, selection: usize) -> Option<&ViewEntry> {
        selection
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
    }
}

impl ViewEntry {
    /// The display cells of the row: description, due date, status, priority.
    pub fn cells(&self) -> [String; 4] {
        let due = self
            .task
            .due_date
            .map_or_else(|| "N/A".to_string(), |date| date.to_string());
        let status = match self.note {
            Some(note) => format!("Status: {} ({})", self.task.status, note),
            None => format!("Status: {}", self.task.status),
        };
        [
            self.task.description.clone(),
            format!("Due: {}", due),
            status,
            format!("Priority: {}", self.task.priority),
        ]
    }
}

impl fmt::Display for ViewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cells().join(" | "))
    }
}
