//! Destination write stage.
//!
//! Writes every asset under the context's destination directory, creating
//! parent directories as needed. Assets pass through unchanged so a later
//! stage (view's rename-then-write) can keep working with them.

use crate::pipeline::{Asset, Stage, StageContext, StageError};
use std::fs;

/// Terminal write to the destination directory.
pub struct Write;

impl Stage for Write {
    fn name(&self) -> &'static str {
        "write"
    }

    fn apply(&self, assets: Vec<Asset>, cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &assets {
            let path = cx.dest.join(&asset.rel_path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &asset.contents)?;
        }
        Ok(assets)
    }
}
