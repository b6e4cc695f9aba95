//! Copy pipeline assembly: debug-log → write, no transformation stages.

use crate::config::CopySpec;
use crate::pipeline::Pipeline;
use crate::stages::{DebugLog, Write};

/// Build the stage chain for a copy task.
pub fn build(spec: &CopySpec) -> Pipeline {
    let mut pipeline = Pipeline::new();

    if spec.common.verbose {
        pipeline.push(Box::new(DebugLog::new("Processing Copy")));
    }

    pipeline.push(Box::new(Write));
    pipeline
}
