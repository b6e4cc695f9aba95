//! Path rewrite stage.
//!
//! Rewrites asset paths field by field: directory, basename, prefix,
//! suffix, and extension can each be replaced independently. The suffix
//! is inserted between the stem and the extension, so `app.js` with
//! suffix `.min` becomes `app.min.js`.

use crate::config::RenameOptions;
use crate::pipeline::{Asset, Stage, StageContext, StageError};
use std::path::PathBuf;

pub struct Rename {
    options: RenameOptions,
}

impl Rename {
    /// Create a rename stage from configured options.
    pub fn new(options: RenameOptions) -> Self {
        Self { options }
    }

    /// Shorthand for a suffix-only rename, used for `.min` marking.
    pub fn suffix(suffix: &str) -> Self {
        Self {
            options: RenameOptions {
                suffix: Some(suffix.to_string()),
                ..RenameOptions::default()
            },
        }
    }

    fn rewrite(&self, asset: &Asset) -> PathBuf {
        let (dir, stem, ext) = asset.path_parts();

        let dir = match &self.options.dirname {
            Some(d) => PathBuf::from(d),
            None => dir,
        };
        let stem = self.options.basename.clone().unwrap_or(stem);
        let prefix = self.options.prefix.as_deref().unwrap_or("");
        let suffix = self.options.suffix.as_deref().unwrap_or("");
        let ext = match &self.options.extname {
            Some(e) => e.clone(),
            None => ext,
        };

        dir.join(format!("{prefix}{stem}{suffix}{ext}"))
    }
}

impl Stage for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            asset.rel_path = self.rewrite(asset);
        }
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn cx() -> StageContext {
        StageContext::new("js-1", Path::new("/p"), Path::new("/p/out"), false)
    }

    fn rel(assets: &[Asset]) -> Vec<String> {
        assets.iter().map(|a| a.rel_path.display().to_string()).collect()
    }

    #[test]
    fn test_suffix_rename_inserts_before_extension() {
        let assets = vec![Asset::new("js/app.js", b"x".to_vec())];
        let out = Rename::suffix(".min").apply(assets, &cx()).unwrap();
        assert_eq!(rel(&out), vec!["js/app.min.js"]);
    }

    #[test]
    fn test_extname_replacement() {
        let options = RenameOptions { extname: Some(".php".to_string()), ..Default::default() };
        let assets = vec![Asset::new("index.html", b"x".to_vec())];
        let out = Rename::new(options).apply(assets, &cx()).unwrap();
        assert_eq!(rel(&out), vec!["index.php"]);
    }

    #[test]
    fn test_all_fields_combined() {
        let options = RenameOptions {
            dirname: Some("vendor".to_string()),
            basename: Some("lib".to_string()),
            prefix: Some("pre-".to_string()),
            suffix: Some("-post".to_string()),
            extname: Some(".mjs".to_string()),
        };
        let assets = vec![Asset::new("src/app.js", b"x".to_vec())];
        let out = Rename::new(options).apply(assets, &cx()).unwrap();
        assert_eq!(rel(&out), vec!["vendor/pre-lib-post.mjs"]);
    }

    #[test]
    fn test_no_extension_file() {
        let assets = vec![Asset::new("LICENSE", b"x".to_vec())];
        let out = Rename::suffix(".bak").apply(assets, &cx()).unwrap();
        assert_eq!(rel(&out), vec!["LICENSE.bak"]);
    }
}
