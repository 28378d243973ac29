use crate::model::Filter;
use crate::store::Store;
use crate::tasks::{DeleteOutcome, TaskEdit, TaskError, TaskList, View};
use crate::validation::{
    parse_description, parse_due_date, parse_priority, parse_selection, DateInput,
};
use anyhow::Result;
use chrono::NaiveDate;
use prettytable::format::FormatBuilder;
use prettytable::Table;
use std::io::{BufRead, Write};
use tracing::{debug, info};

const MENU: &str = "
====== To-Do List Manager ======
1. Add Task
2. View All Tasks
3. View Completed Tasks
4. View Pending Tasks
5. View Tasks Due Soon
6. Mark Task as Completed
7. Edit Task
8. Delete Task
9. Exit";

/// One interactive session: reads answers from `input`, writes the menu,
/// views and messages to `output`.
pub struct Session<S: Store, R: BufRead, W: Write> {
    tasks: TaskList<S>,
    input: R,
    output: W,
    today: fn() -> NaiveDate,
    wrap_width: usize,
}

/// Answer to a task number prompt.
enum Selection {
    Chosen(usize),
    Rejected,
    EndOfInput,
}

impl<S: Store, R: BufRead, W: Write> Session<S, R, W> {
    pub fn new(
        tasks: TaskList<S>,
        input: R,
        output: W,
        today: fn() -> NaiveDate,
        wrap_width: usize,
    ) -> Self {
        Session {
            tasks,
            input,
            output,
            today,
            wrap_width,
        }
    }

    /// Run the menu until the user exits or input ends. Only a failure to
    /// save the tasks (or to write to the terminal) ends it with an error.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            let choice = match self.prompt("Choose an option: ")? {
                Some(choice) => choice,
                None => break,
            };

            match choice.trim() {
                "1" => self.add_task()?,
                "2" => self.view(Filter::All)?,
                "3" => self.view(Filter::Completed)?,
                "4" => self.view(Filter::Pending)?,
                "5" => self.view(Filter::DueSoon)?,
                "6" => self.mark_completed()?,
                "7" => self.edit_task()?,
                "8" => self.delete_task()?,
                "9" => break,
                _ => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
        }
        writeln!(self.output, "Goodbye!")?;
        info!(tasks = self.tasks.len(), "session ended");
        Ok(())
    }

    fn view(&mut self, filter: Filter) -> Result<()> {
        self.show(filter)?;
        Ok(())
    }

    fn add_task(&mut self) -> Result<()> {
        let description = loop {
            let raw = match self.prompt("Enter task description: ")? {
                Some(raw) => raw,
                None => return Ok(()),
            };
            match parse_description(&raw) {
                Ok(description) => break description,
                Err(err) => writeln!(self.output, "Invalid input: {}.", err)?,
            }
        };
        let due_date =
            match self.ask_due_date("Enter due date (YYYY-MM-DD) or press Enter to skip: ")? {
                Some(due_date) => due_date,
                None => return Ok(()),
            };
        let priority = loop {
            let raw = match self.prompt("Enter priority (low/medium/high) [default=medium]: ")? {
                Some(raw) => raw,
                None => return Ok(()),
            };
            match parse_priority(&raw) {
                Ok(priority) => break priority,
                Err(_) => self.invalid_priority()?,
            }
        };

        let due_date = match due_date {
            DateInput::Date(date) => Some(date),
            DateInput::Skip => None,
        };
        if self.apply(|tasks| tasks.add(&description, due_date, priority))? {
            writeln!(self.output, "Task added successfully!")?;
        }
        Ok(())
    }

    /// Print the view for `filter` and return it, or `None` when there is
    /// nothing to show.
    fn show(&mut self, filter: Filter) -> Result<Option<View>> {
        if self.tasks.is_empty() {
            writeln!(self.output, "No tasks found.")?;
            return Ok(None);
        }

        let view = self.tasks.view(filter, (self.today)());
        if view.is_empty() {
            writeln!(self.output, "No tasks match this filter.")?;
            return Ok(None);
        }

        debug!(filter = ?view.filter, rows = view.len(), "showing tasks");
        writeln!(self.output, "\n--- TASK LIST ---")?;
        write!(self.output, "{}", render(&view, self.wrap_width))?;
        writeln!(self.output, "-----------------")?;
        Ok(Some(view))
    }

    fn mark_completed(&mut self) -> Result<()> {
        let view = match self.show(Filter::Pending)? {
            Some(view) => view,
            None => return Ok(()),
        };
        let selection = match self.ask_selection("Enter task number to mark as completed: ")? {
            Selection::Chosen(selection) => selection,
            _ => return Ok(()),
        };
        if self.apply(|tasks| tasks.mark_completed(&view, selection).map(|_| ()))? {
            writeln!(self.output, "Task marked as completed.")?;
        }
        Ok(())
    }

    fn edit_task(&mut self) -> Result<()> {
        let view = match self.show(Filter::All)? {
            Some(view) => view,
            None => return Ok(()),
        };
        let selection = match self.ask_selection("Enter task number to edit: ")? {
            Selection::Chosen(selection) => selection,
            _ => return Ok(()),
        };
        if view.get(selection).is_none() {
            writeln!(self.output, "Invalid task number.")?;
            return Ok(());
        }

        let description =
            match self.prompt("Enter new description (leave blank to keep current): ")? {
                Some(raw) => parse_description(&raw).ok(),
                None => return Ok(()),
            };
        let due_date = match self.ask_due_date(
            "Enter new due date (YYYY-MM-DD) or press Enter to keep current: ",
        )? {
            Some(DateInput::Date(date)) => Some(date),
            Some(DateInput::Skip) => None,
            None => return Ok(()),
        };
        let priority = loop {
            let raw = match self.prompt(
                "Enter new priority (low/medium/high) or press Enter to keep current: ",
            )? {
                Some(raw) => raw,
                None => return Ok(()),
            };
            if raw.trim().is_empty() {
                break None;
            }
            match parse_priority(&raw) {
                Ok(priority) => break Some(priority),
                Err(_) => self.invalid_priority()?,
            }
        };

        let edit = TaskEdit {
            description,
            due_date,
            priority,
        };
        if self.apply(|tasks| tasks.edit(&view, selection, edit).map(|_| ()))? {
            writeln!(self.output, "Task updated.")?;
        }
        Ok(())
    }

    fn delete_task(&mut self) -> Result<()> {
        let view = match self.show(Filter::All)? {
            Some(view) => view,
            None => return Ok(()),
        };
        let selection = match self.ask_selection("Enter task number to delete: ")? {
            Selection::Chosen(selection) => selection,
            _ => return Ok(()),
        };
        let description = match view.get(selection) {
            Some(entry) => entry.task.description.clone(),
            None => {
                writeln!(self.output, "Invalid task number.")?;
                return Ok(());
            }
        };

        let question = format!(
            "Are you sure you want to delete '{}'? (y/n): ",
            description
        );
        let confirmed = match self.prompt(&question)? {
            Some(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            None => false,
        };

        let mut outcome = DeleteOutcome::Cancelled;
        let applied = self.apply(|tasks| {
            outcome = tasks.delete(&view, selection, confirmed)?;
            Ok(())
        })?;
        if !applied {
            return Ok(());
        }
        match outcome {
            DeleteOutcome::Deleted(task) => {
                writeln!(self.output, "Task '{}' deleted.", task.description)?
            }
            DeleteOutcome::Cancelled => writeln!(self.output, "Deletion cancelled.")?,
        }
        Ok(())
    }

    /// Run a repository operation. Selection and input errors are reported
    /// and yield `false`; store failures are returned.
    fn apply<T, F>(&mut self, operation: F) -> Result<bool>
    where
        F: FnOnce(&mut TaskList<S>) -> Result<T, TaskError>,
    {
        match operation(&mut self.tasks) {
            Ok(_) => Ok(true),
            Err(TaskError::InvalidSelection(_)) => {
                writeln!(self.output, "Invalid task number.")?;
                Ok(false)
            }
            Err(TaskError::Input(err)) => {
                writeln!(self.output, "Invalid input: {}.", err)?;
                Ok(false)
            }
            Err(TaskError::Store(err)) => Err(err),
        }
    }

    /// Ask for a due date until the answer is valid or blank. `None` means
    /// input ended.
    fn ask_due_date(&mut self, message: &str) -> Result<Option<DateInput>> {
        loop {
            let raw = match self.prompt(message)? {
                Some(raw) => raw,
                None => return Ok(None),
            };
            match parse_due_date(&raw) {
                Ok(date) => return Ok(Some(date)),
                Err(_) => writeln!(self.output, "Invalid date format. Use YYYY-MM-DD.")?,
            }
        }
    }

    fn ask_selection(&mut self, message: &str) -> Result<Selection> {
        let raw = match self.prompt(message)? {
            Some(raw) => raw,
            None => return Ok(Selection::EndOfInput),
        };
        match parse_selection(&raw) {
            Ok(selection) => Ok(Selection::Chosen(selection)),
            Err(_) => {
                writeln!(self.output, "Please enter a valid number.")?;
                Ok(Selection::Rejected)
            }
        }
    }

    fn invalid_priority(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Invalid priority. Choose from low, medium, or high."
        )?;
        Ok(())
    }

    /// Print `message` and read one line. `None` at end of input. Bytes
    /// that are not UTF-8 are replaced, so the answer fails validation
    /// instead of ending the session.
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&line);
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}

/// Draw a view as a numbered table, wrapping long descriptions.
pub fn render(view: &View, wrap_width: usize) -> Table {
    let mut table = Table::new();
    table.set_format(
        FormatBuilder::new()
            .column_separator('|')
            .padding(1, 1)
            .build(),
    );
    for (i, entry) in view.entries.iter().enumerate() {
        let [description, due, status, priority] = entry.cells();
        table.add_row(row![
            format!("{}.", i + 1),
            textwrap::fill(&description, wrap_width),
            due,
            status,
            priority
        ]);
    }
    table
}
