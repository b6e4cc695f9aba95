//! Template inclusion stage.
//!
//! Expands `@@include('partial.html')` directives (the prefix is
//! configurable) by splicing in the referenced file, resolved against the
//! project root joined with the configured base path. Included files may
//! themselves include; expansion is capped at a fixed depth to stop
//! include cycles.

use crate::config::FileIncludeSpec;
use crate::pipeline::{Asset, Stage, StageContext, StageError};
use regex::Regex;
use std::fs;
use std::path::Path;

const MAX_DEPTH: usize = 10;

pub struct FileInclude {
    spec: FileIncludeSpec,
    directive: Regex,
}

impl FileInclude {
    pub fn new(spec: FileIncludeSpec) -> Self {
        let pattern = format!(
            r#"{}include\(\s*['"]([^'"]+)['"]\s*\)"#,
            regex::escape(&spec.prefix)
        );
        let directive = Regex::new(&pattern).expect("valid regex");
        Self { spec, directive }
    }

    fn expand(&self, text: &str, base: &Path, file: &str, depth: usize) -> Result<String, StageError> {
        if depth >= MAX_DEPTH {
            return Err(StageError::Include {
                file: file.to_string(),
                message: format!("include depth exceeds {MAX_DEPTH}, likely a cycle"),
            });
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for cap in self.directive.captures_iter(text) {
            let whole = cap.get(0).ok_or_else(|| StageError::Include {
                file: file.to_string(),
                message: "malformed include directive".to_string(),
            })?;
            let target = &cap[1];

            out.push_str(&text[last..whole.start()]);
            let path = base.join(target);
            let included = fs::read_to_string(&path).map_err(|e| StageError::Include {
                file: file.to_string(),
                message: format!("cannot read {}: {e}", path.display()),
            })?;
            out.push_str(&self.expand(&included, base, target, depth + 1)?);
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl Stage for FileInclude {
    fn name(&self) -> &'static str {
        "include"
    }

    fn apply(&self, mut assets: Vec<Asset>, cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        let base = cx.root.join(&self.spec.base_path);
        for asset in &mut assets {
            let text = asset.text().into_owned();
            if self.directive.is_match(&text) {
                let file = asset.rel_path.display().to_string();
                asset.set_text(self.expand(&text, &base, &file, 0)?);
            }
        }
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stage(prefix: &str, base: &str) -> FileInclude {
        FileInclude::new(FileIncludeSpec {
            prefix: prefix.to_string(),
            base_path: base.to_string(),
        })
    }

    #[test]
    fn test_include_splices_partial() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("partials")).unwrap();
        fs::write(temp.path().join("partials/head.html"), "<head></head>").unwrap();

        let cx = StageContext::new("view-1", temp.path(), &temp.path().join("out"), false);
        let assets = vec![Asset::new(
            "index.html",
            b"<html>@@include('head.html')<body/></html>".to_vec(),
        )];
        let out = stage("@@", "partials").apply(assets, &cx).unwrap();
        assert_eq!(out[0].text(), "<html><head></head><body/></html>");
    }

    #[test]
    fn test_nested_includes_expand() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("outer.html"), "[@@include('inner.html')]").unwrap();
        fs::write(temp.path().join("inner.html"), "inner").unwrap();

        let cx = StageContext::new("view-1", temp.path(), &temp.path().join("out"), false);
        let assets = vec![Asset::new("page.html", b"@@include('outer.html')".to_vec())];
        let out = stage("@@", ".").apply(assets, &cx).unwrap();
        assert_eq!(out[0].text(), "[inner]");
    }

    #[test]
    fn test_missing_partial_fails_with_file() {
        let temp = TempDir::new().unwrap();
        let cx = StageContext::new("view-1", temp.path(), &temp.path().join("out"), false);
        let assets = vec![Asset::new("page.html", b"@@include('gone.html')".to_vec())];
        let err = stage("@@", ".").apply(assets, &cx).unwrap_err();
        match err {
            StageError::Include { file, .. } => assert_eq!(file, "page.html"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_include_cycle_is_capped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("loop.html"), "@@include('loop.html')").unwrap();

        let cx = StageContext::new("view-1", temp.path(), &temp.path().join("out"), false);
        let assets = vec![Asset::new("page.html", b"@@include('loop.html')".to_vec())];
        let err = stage("@@", ".").apply(assets, &cx).unwrap_err();
        assert!(matches!(err, StageError::Include { .. }));
    }

    #[test]
    fn test_custom_prefix() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("p.html"), "P").unwrap();

        let cx = StageContext::new("view-1", temp.path(), &temp.path().join("out"), false);
        let assets = vec![Asset::new("page.html", b"%%include(\"p.html\")".to_vec())];
        let out = stage("%%", ".").apply(assets, &cx).unwrap();
        assert_eq!(out[0].text(), "P");
    }
}
