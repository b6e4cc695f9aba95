//! Task registration.
//!
//! Turns the raw configuration tree into an ordered, named task list.
//! Records are resolved through the option cascade, then deserialized
//! into typed specs. Names are positional: the first `[[sass]]` record
//! becomes `sass-1`, the second `sass-2`, and so on; categories register
//! in a fixed order (sass, js, image, view, copy), so the task list is
//! deterministic for a given configuration.

use crate::config::{resolve_record, Category, RawConfig, TaskSpec};
use toml::value::Table;

/// Error while registering tasks from the configuration.
#[derive(Debug)]
pub enum RegistryError {
    /// The requested environment has no override table
    UnknownEnv {
        /// Requested name
        name: String,
        /// Names that are defined
        available: Vec<String>,
    },
    /// A record is missing a required field after resolution
    MissingField {
        /// Task name
        task: String,
        /// Field name (`src` or `dest`)
        field: &'static str,
    },
    /// A resolved record failed to deserialize into its typed spec
    InvalidRecord {
        /// Task name
        task: String,
        /// Deserializer message
        message: String,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::UnknownEnv { name, available } => {
                if available.is_empty() {
                    write!(f, "Unknown environment '{}': no environments are defined", name)
                } else {
                    write!(
                        f,
                        "Unknown environment '{}': defined environments are {}",
                        name,
                        available.join(", ")
                    )
                }
            }
            RegistryError::MissingField { task, field } => {
                write!(f, "Task {} has no '{}' after resolution", task, field)
            }
            RegistryError::InvalidRecord { task, message } => {
                write!(f, "Task {} is invalid: {}", task, message)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// One registered task: a name, its category position, and the resolved
/// configuration both typed and raw.
#[derive(Debug, Clone)]
pub struct Task {
    /// Positional name, e.g. `sass-1`
    pub name: String,
    /// Pipeline category
    pub category: Category,
    /// Zero-based position within the category
    pub index: usize,
    /// Typed, resolved configuration
    pub spec: TaskSpec,
    /// Resolved record table (kept for diagnostics)
    pub table: Table,
}

/// The ordered set of registered tasks.
#[derive(Debug, Default)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    /// Register every record in the configuration, resolving each through
    /// the cascade for the given environment.
    pub fn register(raw: &RawConfig, env: Option<&str>) -> Result<TaskSet, RegistryError> {
        let env_override = match env {
            Some(name) => Some(raw.env.get(name).ok_or_else(|| RegistryError::UnknownEnv {
                name: name.to_string(),
                available: raw.env.keys().cloned().collect(),
            })?),
            None => None,
        };

        let mut tasks = Vec::with_capacity(raw.record_count());
        for category in Category::ALL {
            for (index, record) in raw.records(category).iter().enumerate() {
                let name = format!("{}-{}", category.key(), index + 1);
                let resolved = resolve_record(record, category, &raw.global, env_override);

                let spec = TaskSpec::from_table(category, resolved.clone()).map_err(|e| {
                    RegistryError::InvalidRecord { task: name.clone(), message: e.to_string() }
                })?;

                if spec.common().src.is_empty() {
                    return Err(RegistryError::MissingField { task: name, field: "src" });
                }
                if spec.common().dest.is_none() {
                    return Err(RegistryError::MissingField { task: name, field: "dest" });
                }

                tasks.push(Task { name, category, index, spec, table: resolved });
            }
        }
        Ok(TaskSet { tasks })
    }

    /// All tasks in registration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// All task names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
