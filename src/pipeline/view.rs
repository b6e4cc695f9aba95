//! View pipeline assembly.
//!
//! Order: debug-log → template inclusion → localization expansion → minify
//! → write → (rename → write). When a rename is configured the renamed copy
//! is written in addition to the original; both destination outputs
//! persist.

use crate::config::ViewSpec;
use crate::pipeline::Pipeline;
use crate::stages::{DebugLog, FileInclude, HtmlMin, Localize, Rename, Write};

/// Build the stage chain for a view task.
pub fn build(spec: &ViewSpec) -> Pipeline {
    let mut pipeline = Pipeline::new();

    if spec.common.verbose {
        pipeline.push(Box::new(DebugLog::new("Processing View")));
    }

    if let Some(include) = &spec.file_include {
        pipeline.push(Box::new(FileInclude::new(include.clone())));
    }

    if let Some(localize) = &spec.localize {
        pipeline.push(Box::new(Localize::new(localize.clone())));
    }

    if spec.minify {
        pipeline.push(Box::new(HtmlMin));
    }

    pipeline.push(Box::new(Write));

    if spec.common.rename {
        pipeline.push(Box::new(Rename::new(spec.common.rename_options.clone())));
        pipeline.push(Box::new(Write));
    }

    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Category, TaskSpec};

    fn view_spec(toml: &str) -> ViewSpec {
        let table: toml::value::Table = toml::from_str(toml).unwrap();
        match TaskSpec::from_table(Category::View, table).unwrap() {
            TaskSpec::View(s) => s,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_minimal_view_pipeline() {
        let spec = view_spec("src = \"views/**\"\ndest = \"out\"");
        let pipeline = build(&spec);
        assert_eq!(pipeline.stage_names(), vec!["write"]);
    }

    #[test]
    fn test_full_view_pipeline_order() {
        let spec = view_spec(
            r#"
src = "views/**/*.html"
dest = "out"
minify = true
rename = true
rename_options = { extname = ".php" }

[file_include]
base_path = "partials"

[localize]
locales = ["en", "fr"]
"#,
        );
        let pipeline = build(&spec);
        assert_eq!(
            pipeline.stage_names(),
            vec!["include", "localize", "html-min", "write", "rename", "write"]
        );
    }
}
