use crate::model::Task;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable copy of the task collection.
pub trait Store {
    /// Read every saved task. A missing or unreadable store yields an
    /// empty collection instead of an error.
    fn load(&self) -> Vec<Task>;

    /// Overwrite the store with the full collection.
    fn save(&mut self, tasks: &[Task]) -> Result<()>;
}

/// Tasks saved as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: PathBuf) -> Self {
        JsonStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonStore {
    fn load(&self) -> Vec<Task> {
        if !self.path.exists() {
            return Vec::new();
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "could not read tasks file, starting empty"
                );
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "tasks file is corrupt, starting empty"
                );
                Vec::new()
            }
        }
    }

    fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let json = to_pretty_json(tasks).context("Failed to serialize tasks.")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write tasks to {}.", self.path.display()))?;
        debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}

/// JSON with four space indentation, the layout existing task files use.
fn to_pretty_json(tasks: &[Task]) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    tasks.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Store kept in memory, counting how many times it was written.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub tasks: Vec<Task>,
    pub saves: usize,
}

#[cfg(test)]
impl Store for MemoryStore {
    fn load(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    fn save(&mut self, tasks: &[Task]) -> Result<()> {
        self.tasks = tasks.to_vec();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn sample() -> Vec<Task> {
        let mut done = Task::new(
            "Pay rent".to_string(),
            NaiveDate::from_ymd_opt(2024, 6, 1),
            Priority::High,
        );
        done.status = Status::Completed;
        vec![
            Task::new("Buy milk".to_string(), None, Priority::Medium),
            done,
        ]
    }

    #[rstest]
    fn missing_file_loads_empty(dir: TempDir) {
        let store = JsonStore::new(dir.path().join("tasks.json"));
        assert!(store.load().is_empty());
    }

    #[rstest]
    #[case("this is not json")]
    #[case("")]
    #[case("{\"description\": \"not an array\"}")]
    #[case("[{\"status\": \"pending\"}]")]
    fn corrupt_file_loads_empty(dir: TempDir, #[case] contents: &str) {
        let path = dir.path().join("tasks.json");
        fs::write(&path, contents).unwrap();
        assert!(JsonStore::new(path).load().is_empty());
    }

    #[rstest]
    fn save_then_load_is_stable(dir: TempDir) {
        let path = dir.path().join("tasks.json");
        let mut store = JsonStore::new(path.clone());
        store.save(&sample()).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, sample());

        store.save(&loaded).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
    }

    #[rstest]
    fn saved_file_is_pretty_json(dir: TempDir) {
        let path = dir.path().join("tasks.json");
        let mut store = JsonStore::new(path.clone());
        store
            .save(&[Task::new("Buy milk".to_string(), None, Priority::Medium)])
            .unwrap();
        let expected = "[\n    {\n        \"description\": \"Buy milk\",\n        \"due_date\": null,\n        \"status\": \"pending\",\n        \"priority\": \"medium\"\n    }\n]";
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    }

    #[rstest]
    fn legacy_records_get_defaults(dir: TempDir) {
        let path = dir.path().join("tasks.json");
        fs::write(
            &path,
            r#"[{"description": "Old task", "due_date": "2024-06-08", "status": "completed"}]"#,
        )
        .unwrap();
        let tasks = JsonStore::new(path).load();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert_eq!(tasks[0].status, Status::Completed);
        assert_eq!(tasks[0].due_date, NaiveDate::from_ymd_opt(2024, 6, 8));
    }

    #[rstest]
    fn write_failure_is_reported(dir: TempDir) {
        let mut store = JsonStore::new(dir.path().join("missing").join("tasks.json"));
        assert!(store.save(&sample()).is_err());
    }
}
