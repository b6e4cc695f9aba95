//! Per-file processing log stage.

use crate::pipeline::{Asset, Stage, StageContext, StageError};

/// Logs every file flowing through the pipeline. Only added to a chain
/// when the task's `verbose` flag is set.
pub struct DebugLog {
    title: String,
}

impl DebugLog {
    /// Create a log stage with a title, e.g. `"Processing SASS"`.
    pub fn new(title: &str) -> Self {
        Self { title: title.to_string() }
    }
}

impl Stage for DebugLog {
    fn name(&self) -> &'static str {
        "debug-log"
    }

    fn apply(&self, assets: Vec<Asset>, cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &assets {
            println!("{}: {} ({})", self.title, asset.rel_path.display(), cx.task_name);
        }
        Ok(assets)
    }
}
