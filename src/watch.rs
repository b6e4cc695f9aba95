//! Watch mode: automatic rebuilds on file changes.
//!
//! Each task with a truthy `watch` option is bound to its watch patterns
//! (explicit patterns, or the task's own source patterns). Changes are
//! debounced, matched against the bindings, and only the affected tasks
//! rerun. Rebuilds are serialized: events arriving during a rebuild are
//! coalesced by the debouncer and handled on the next loop iteration.

use crate::outputs::OutputRegistry;
use crate::registry::TaskSet;
use crate::reload::{ReloadEvent, ReloadHub};
use crate::runner::{RunOptions, Runner, Selection};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

const DEBOUNCE_MS: u64 = 200;

/// Error during watch mode.
#[derive(Debug)]
pub enum WatchError {
    /// Failed to initialize the file watcher
    WatcherInit(notify::Error),
    /// Failed to add a watch path
    WatchPath(notify::Error),
    /// Event channel closed
    Channel(String),
    /// A watch pattern is not a valid glob
    Pattern(String, glob::PatternError),
    /// No task has watching enabled
    NothingToWatch,
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchError::WatcherInit(e) => write!(f, "Failed to initialize file watcher: {}", e),
            WatchError::WatchPath(e) => write!(f, "Failed to watch path: {}", e),
            WatchError::Channel(msg) => write!(f, "Watch channel error: {}", msg),
            WatchError::Pattern(pattern, e) => {
                write!(f, "Invalid watch pattern '{}': {}", pattern, e)
            }
            WatchError::NothingToWatch => {
                write!(f, "No task has watching enabled; set 'watch' on a task or in [global]")
            }
        }
    }
}

impl std::error::Error for WatchError {}

/// One task's watch binding: the compiled patterns that should trigger it.
#[derive(Debug)]
pub struct WatchBinding {
    /// Task name
    pub task: String,
    /// Root-relative pattern sources
    pub pattern_sources: Vec<String>,
    /// Compiled patterns
    pub patterns: Vec<glob::Pattern>,
}

/// Compute the watch bindings for every watch-enabled task.
pub fn compute_bindings(tasks: &TaskSet) -> Result<Vec<WatchBinding>, WatchError> {
    let mut bindings = Vec::new();
    for task in tasks.tasks() {
        let common = task.spec.common();
        if !common.watch_enabled() {
            continue;
        }
        let sources = common.watch_patterns();
        let mut patterns = Vec::with_capacity(sources.len());
        for source in &sources {
            patterns.push(
                glob::Pattern::new(source)
                    .map_err(|e| WatchError::Pattern(source.clone(), e))?,
            );
        }
        bindings.push(WatchBinding { task: task.name.clone(), pattern_sources: sources, patterns });
    }
    Ok(bindings)
}

/// The directories a set of bindings needs watched, deduplicated.
fn watch_roots(root: &Path, bindings: &[WatchBinding]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for binding in bindings {
        for source in &binding.pattern_sources {
            let dir = root.join(crate::fsio::non_glob_prefix(source));
            if !roots.contains(&dir) {
                roots.push(dir);
            }
        }
    }
    roots
}

/// The tasks affected by a set of changed paths, in binding order.
pub fn affected_tasks(bindings: &[WatchBinding], root: &Path, changed: &[PathBuf]) -> Vec<String> {
    let mut tasks = Vec::new();
    for binding in bindings {
        let hit = changed.iter().any(|path| {
            let rel = path.strip_prefix(root).unwrap_or(path);
            binding.patterns.iter().any(|p| p.matches_path(rel))
        });
        if hit && !tasks.contains(&binding.task) {
            tasks.push(binding.task.clone());
        }
    }
    tasks
}

/// Get current timestamp for logging.
fn timestamp() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() % 86400;
    format!("{:02}:{:02}:{:02}", (secs / 3600) % 24, (secs / 60) % 60, secs % 60)
}

/// Run an initial build, then watch and rebuild until interrupted.
///
/// Blocks forever under normal operation. When a reload hub is given,
/// every successful rebuild publishes one event per rerun task.
pub fn run_watch(
    tasks: &TaskSet,
    options: RunOptions,
    selection: &Selection,
    hub: Option<&ReloadHub>,
) -> Result<(), WatchError> {
    let names = tasks.names();
    let eligible = selection.eligible(&names);
    let bindings: Vec<WatchBinding> = compute_bindings(tasks)?
        .into_iter()
        .filter(|b| eligible.contains(&b.task.as_str()))
        .collect();
    if bindings.is_empty() {
        return Err(WatchError::NothingToWatch);
    }

    let root = options.root.clone();
    let runner = Runner::new(tasks, options);
    let mut outputs = OutputRegistry::new();

    println!("[{}] Building...", timestamp());
    let result = runner.run_build(selection, &mut outputs);
    println!("[{}] Build complete: {}", timestamp(), result.summary());

    let (tx, rx) = channel();
    let mut debouncer =
        new_debouncer(Duration::from_millis(DEBOUNCE_MS), tx).map_err(WatchError::WatcherInit)?;

    for dir in watch_roots(&root, &bindings) {
        if !dir.exists() {
            eprintln!("[{}] Warning: watch path missing: {}", timestamp(), dir.display());
            continue;
        }
        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::Recursive)
            .map_err(WatchError::WatchPath)?;
    }

    let watched: Vec<String> = bindings.iter().map(|b| b.task.clone()).collect();
    println!("[{}] Watching for changes ({})...", timestamp(), watched.join(", "));

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<PathBuf> = events
                    .iter()
                    .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                    .map(|e| e.path.clone())
                    .collect();
                if changed.is_empty() {
                    continue;
                }

                let affected = affected_tasks(&bindings, &root, &changed);
                if affected.is_empty() {
                    continue;
                }

                for path in &changed {
                    if let Some(name) = path.file_name() {
                        println!("[{}] Changed: {}", timestamp(), name.to_string_lossy());
                    }
                }

                println!("[{}] Rebuilding: {}", timestamp(), affected.join(", "));
                let result = runner.run_named(&affected, &mut outputs);
                println!("[{}] Rebuild complete: {}", timestamp(), result.summary());

                if let Some(hub) = hub {
                    for task_result in &result.tasks {
                        if task_result.is_success() && !task_result.outputs.is_empty() {
                            hub.notify(&ReloadEvent {
                                task: task_result.task.clone(),
                                paths: task_result.outputs.clone(),
                            });
                        }
                    }
                }
            }
            Ok(Err(error)) => {
                eprintln!("[{}] Watch error: {:?}", timestamp(), error);
                eprintln!("[{}] Continuing to watch...", timestamp());
            }
            Err(e) => return Err(WatchError::Channel(e.to_string())),
        }
    }
}
