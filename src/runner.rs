//! Task selection and parallel execution.
//!
//! A build run selects tasks by category prefix, executes the selected
//! tasks concurrently on a scoped worker pool, and collects per-task
//! results in registration order. Tasks are independent: one task's
//! failure never stops the others.

use crate::config::{resolve_path, Category};
use crate::fsio;
use crate::outputs::{OutputRegistry, TaskOutput};
use crate::pipeline::{build_pipeline, StageContext};
use crate::registry::{Task, TaskSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default number of parallel jobs (uses available parallelism).
fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Which tasks a run should cover, as category prefixes.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    prefixes: Vec<Category>,
}

impl Selection {
    /// Select everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Select by category prefixes.
    pub fn categories(prefixes: Vec<Category>) -> Self {
        Self { prefixes }
    }

    /// Whether no prefixes were given.
    pub fn is_all(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// The task names this selection covers.
    ///
    /// No prefixes means every task. Prefixes that match nothing also
    /// fall back to every task: a run request is never quietly turned
    /// into a no-op by a stale filter.
    pub fn eligible<'a>(&self, names: &[&'a str]) -> Vec<&'a str> {
        if self.prefixes.is_empty() {
            return names.to_vec();
        }
        let matched: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| {
                self.prefixes.iter().any(|c| name.starts_with(&format!("{}-", c.key())))
            })
            .collect();
        if matched.is_empty() {
            names.to_vec()
        } else {
            matched
        }
    }
}

/// Options for a build run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Project root directory
    pub root: PathBuf,
    /// Suppress all deletion preambles
    pub no_delete: bool,
    /// Orchestrator-level progress logging
    pub verbose: bool,
    /// Number of parallel workers
    pub jobs: usize,
}

impl RunOptions {
    /// Create options rooted at a project directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), no_delete: false, verbose: false, jobs: default_jobs() }
    }
}

/// Outcome of one task run.
#[derive(Debug, Clone)]
pub enum TaskStatus {
    /// The pipeline ran to completion
    Success,
    /// The source patterns matched nothing
    Skipped,
    /// The pipeline or its preamble failed
    Failed(String),
}

impl TaskStatus {
    /// Whether this outcome is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskStatus::Failed(_))
    }
}

/// Result of running one task.
#[derive(Debug, Clone)]
pub struct TaskRunResult {
    /// Task name
    pub task: String,
    /// Outcome
    pub status: TaskStatus,
    /// Destination paths written
    pub outputs: Vec<PathBuf>,
    /// Wall time for this task
    pub duration: Duration,
}

impl TaskRunResult {
    /// Whether the task succeeded (skipped counts as success).
    pub fn is_success(&self) -> bool {
        !self.status.is_failure()
    }
}

/// Aggregate result of a build run, in registration order.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Per-task results
    pub tasks: Vec<TaskRunResult>,
    /// Wall time for the whole run
    pub total_duration: Duration,
}

impl RunResult {
    /// Number of tasks that completed.
    pub fn success_count(&self) -> usize {
        self.tasks.iter().filter(|t| matches!(t.status, TaskStatus::Success)).count()
    }

    /// Number of tasks that failed.
    pub fn failed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.status.is_failure()).count()
    }

    /// Whether every task succeeded.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// One-line summary for the console.
    pub fn summary(&self) -> String {
        let skipped =
            self.tasks.iter().filter(|t| matches!(t.status, TaskStatus::Skipped)).count();
        let mut parts = vec![format!("{} succeeded", self.success_count())];
        if skipped > 0 {
            parts.push(format!("{} skipped", skipped));
        }
        if self.failed_count() > 0 {
            parts.push(format!("{} failed", self.failed_count()));
        }
        format!("{} ({:.2}s)", parts.join(", "), self.total_duration.as_secs_f64())
    }
}

/// Executes registered tasks.
pub struct Runner<'a> {
    tasks: &'a TaskSet,
    options: RunOptions,
}

impl<'a> Runner<'a> {
    /// Create a runner over a task set.
    pub fn new(tasks: &'a TaskSet, options: RunOptions) -> Self {
        Self { tasks, options }
    }

    /// Run the tasks a selection covers and record their outputs.
    pub fn run_build(&self, selection: &Selection, outputs: &mut OutputRegistry) -> RunResult {
        let names = self.tasks.names();
        let eligible = selection.eligible(&names);
        let selected: Vec<&Task> =
            eligible.iter().filter_map(|name| self.tasks.get(name)).collect();
        self.run_tasks(&selected, outputs)
    }

    /// Run an explicit list of task names (watch mode reruns).
    pub fn run_named(&self, names: &[String], outputs: &mut OutputRegistry) -> RunResult {
        let selected: Vec<&Task> =
            names.iter().filter_map(|name| self.tasks.get(name)).collect();
        self.run_tasks(&selected, outputs)
    }

    fn run_tasks(&self, selected: &[&Task], outputs: &mut OutputRegistry) -> RunResult {
        let start = Instant::now();

        if self.options.verbose {
            let names: Vec<&str> = selected.iter().map(|t| t.name.as_str()).collect();
            println!(
                "Running {} task(s) on {} worker(s): {}",
                selected.len(),
                self.options.jobs.min(selected.len().max(1)),
                names.join(", ")
            );
        }

        let results = if self.options.jobs <= 1 || selected.len() <= 1 {
            selected.iter().map(|task| self.execute_task(task)).collect()
        } else {
            self.execute_parallel(selected)
        };

        for (task, result) in selected.iter().zip(&results) {
            outputs.record(TaskOutput {
                task: task.name.clone(),
                category: task.category,
                index: task.index,
                paths: result.outputs.clone(),
            });
        }

        RunResult { tasks: results, total_duration: start.elapsed() }
    }

    /// Execute tasks on a scoped worker pool, collecting results back in
    /// the original order.
    fn execute_parallel(&self, selected: &[&Task]) -> Vec<TaskRunResult> {
        let results: Mutex<Vec<(usize, TaskRunResult)>> = Mutex::new(Vec::new());
        let next_idx = AtomicUsize::new(0);
        let workers = self.options.jobs.min(selected.len());

        std::thread::scope(|s| {
            for _ in 0..workers {
                let results = &results;
                let next_idx = &next_idx;

                s.spawn(move || loop {
                    let idx = next_idx.fetch_add(1, Ordering::SeqCst);
                    if idx >= selected.len() {
                        break;
                    }
                    let result = self.execute_task(selected[idx]);
                    if let Ok(mut guard) = results.lock() {
                        guard.push((idx, result));
                    }
                });
            }
        });

        let mut results = results.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, r)| r).collect()
    }

    /// Run one task: deletion preamble, source read, pipeline.
    pub fn execute_task(&self, task: &Task) -> TaskRunResult {
        let start = Instant::now();
        let common = task.spec.common();
        let root = &self.options.root;

        // dest presence is checked at registration
        let dest = match &common.dest {
            Some(dest) => resolve_path(root, Path::new(dest)),
            None => {
                return TaskRunResult {
                    task: task.name.clone(),
                    status: TaskStatus::Failed("no destination".to_string()),
                    outputs: vec![],
                    duration: start.elapsed(),
                }
            }
        };

        if let Err(e) =
            fsio::apply_delete(root, &dest, common, &task.name, self.options.no_delete)
        {
            return TaskRunResult {
                task: task.name.clone(),
                status: TaskStatus::Failed(e.to_string()),
                outputs: vec![],
                duration: start.elapsed(),
            };
        }

        let assets = match fsio::read_sources(root, common) {
            Ok(assets) => assets,
            Err(e) => {
                return TaskRunResult {
                    task: task.name.clone(),
                    status: TaskStatus::Failed(e.to_string()),
                    outputs: vec![],
                    duration: start.elapsed(),
                }
            }
        };

        if assets.is_empty() {
            if self.options.verbose {
                println!("{}: no sources matched, skipping", task.name);
            }
            return TaskRunResult {
                task: task.name.clone(),
                status: TaskStatus::Skipped,
                outputs: vec![],
                duration: start.elapsed(),
            };
        }

        let pipeline = build_pipeline(&task.spec);
        let cx = StageContext::new(&task.name, root, &dest, common.verbose);

        match pipeline.run(assets, &cx) {
            Ok(final_assets) => {
                let outputs = final_assets.iter().map(|a| dest.join(&a.rel_path)).collect();
                if self.options.verbose {
                    println!("{}: done in {:.2}s", task.name, start.elapsed().as_secs_f64());
                }
                TaskRunResult {
                    task: task.name.clone(),
                    status: TaskStatus::Success,
                    outputs,
                    duration: start.elapsed(),
                }
            }
            Err(e) => TaskRunResult {
                task: task.name.clone(),
                status: TaskStatus::Failed(e.to_string()),
                outputs: vec![],
                duration: start.elapsed(),
            },
        }
    }
}
