//! Incremental filter stage.
//!
//! Drops assets whose destination copy is already at least as new as the
//! source file. Assets without a recorded source path, or whose
//! destination does not exist yet, always pass through.

use crate::pipeline::{Asset, Stage, StageContext, StageError};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

pub struct Changed;

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl Stage for Changed {
    fn name(&self) -> &'static str {
        "changed"
    }

    fn apply(&self, assets: Vec<Asset>, cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        let kept = assets
            .into_iter()
            .filter(|asset| {
                let Some(source) = &asset.source else { return true };
                let Some(source_time) = mtime(source) else { return true };
                match mtime(&cx.dest.join(&asset.rel_path)) {
                    Some(dest_time) => dest_time < source_time,
                    None => true,
                }
            })
            .collect();
        Ok(kept)
    }
}
