//! Pipeline construction and execution.
//!
//! A pipeline is an ordered chain of [`Stage`]s built from a task's
//! resolved configuration. Construction is lazy (each run rebuilds the
//! chain from the typed task options) and dispatch over categories is a
//! closed match: one builder per category, no runtime name lookup.
//!
//! Stage ordering matters: later stages depend on artifacts of earlier
//! ones (renaming after minification must see the minified name,
//! concatenation must precede a suffix rename).

pub mod asset;
pub mod copy;
pub mod image;
pub mod js;
pub mod sass;
pub mod view;

pub use asset::Asset;

use crate::config::TaskSpec;
use std::path::Path;

/// Error raised inside a transform stage.
#[derive(Debug)]
pub enum StageError {
    /// I/O failure while a stage touched the filesystem
    Io(std::io::Error),
    /// CSS parse/print failure
    Css {
        /// File the failure was reported for
        file: String,
        /// Adapter message
        message: String,
    },
    /// Template inclusion failure
    Include {
        /// File containing the include directive
        file: String,
        /// Adapter message
        message: String,
    },
    /// Localization failure (bad dictionary, unreadable locale file)
    Localize(String),
    /// Any other stage failure
    Other(String),
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::Io(e) => write!(f, "IO error: {}", e),
            StageError::Css { file, message } => write!(f, "CSS error in {}: {}", file, message),
            StageError::Include { file, message } => {
                write!(f, "Include error in {}: {}", file, message)
            }
            StageError::Localize(msg) => write!(f, "Localize error: {}", msg),
            StageError::Other(msg) => write!(f, "Stage error: {}", msg),
        }
    }
}

impl std::error::Error for StageError {}

impl From<std::io::Error> for StageError {
    fn from(e: std::io::Error) -> Self {
        StageError::Io(e)
    }
}

/// Execution context shared by all stages of one task run.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Task name (e.g. `sass-1`)
    pub task_name: String,
    /// Project root directory
    pub root: std::path::PathBuf,
    /// Resolved destination directory
    pub dest: std::path::PathBuf,
    /// Per-file logging enabled
    pub verbose: bool,
}

impl StageContext {
    /// Create a context for one task run.
    pub fn new(task_name: &str, root: &Path, dest: &Path, verbose: bool) -> Self {
        Self {
            task_name: task_name.to_string(),
            root: root.to_path_buf(),
            dest: dest.to_path_buf(),
            verbose,
        }
    }
}

/// A composable stream transform. The orchestrator supplies configuration
/// verbatim and never inspects transform internals.
pub trait Stage: Send + Sync {
    /// Stage name for diagnostics.
    fn name(&self) -> &'static str;

    /// Transform the asset set.
    fn apply(&self, assets: Vec<Asset>, cx: &StageContext) -> Result<Vec<Asset>, StageError>;
}

/// An ordered stage chain for one task.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage.
    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Stage names in order, for diagnostics.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run the chain over an asset set.
    pub fn run(&self, mut assets: Vec<Asset>, cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for stage in &self.stages {
            assets = stage.apply(assets, cx)?;
        }
        Ok(assets)
    }
}

/// Build the stage chain for a task from its resolved configuration.
pub fn build_pipeline(spec: &TaskSpec) -> Pipeline {
    match spec {
        TaskSpec::Sass(s) => sass::build(s),
        TaskSpec::Js(s) => js::build(s),
        TaskSpec::Image(s) => image::build(s),
        TaskSpec::View(s) => view::build(s),
        TaskSpec::Copy(s) => copy::build(s),
    }
}
