//! Banner prepend stage.

use crate::pipeline::{Asset, Stage, StageContext, StageError};

/// Prepends a configured banner string to every asset, verbatim.
pub struct Header {
    banner: String,
}

impl Header {
    /// Create a header stage with the banner text.
    pub fn new(banner: &str) -> Self {
        Self { banner: banner.to_string() }
    }
}

impl Stage for Header {
    fn name(&self) -> &'static str {
        "header"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let mut contents = self.banner.clone().into_bytes();
            contents.extend_from_slice(&asset.contents);
            asset.contents = contents;
        }
        Ok(assets)
    }
}
