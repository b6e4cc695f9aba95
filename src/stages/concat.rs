//! File concatenation stage.

use crate::pipeline::{Asset, Stage, StageContext, StageError};

/// Concatenates all assets into a single named file, in stream order,
/// joined with newlines. Sourcemap source lists are merged.
pub struct Concat {
    file_name: String,
}

impl Concat {
    /// Create a concat stage producing the given file name.
    pub fn new(file_name: &str) -> Self {
        Self { file_name: file_name.to_string() }
    }
}

impl Stage for Concat {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn apply(&self, assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        if assets.is_empty() {
            return Ok(assets);
        }

        let mut contents: Vec<u8> = Vec::new();
        let mut map_sources: Vec<String> = Vec::new();
        let mut any_maps = false;

        for asset in &assets {
            if !contents.is_empty() && !contents.ends_with(b"\n") {
                contents.push(b'\n');
            }
            contents.extend_from_slice(&asset.contents);
            if let Some(sources) = &asset.map_sources {
                any_maps = true;
                map_sources.extend(sources.iter().cloned());
            }
        }

        let mut combined = Asset::new(self.file_name.clone(), contents);
        if any_maps {
            combined.map_sources = Some(map_sources);
        }
        Ok(vec![combined])
    }
}
