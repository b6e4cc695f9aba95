//! Script pipeline assembly.
//!
//! Order: sourcemap-init → debug-log → strip-debug → dep-order + concat →
//! primary minifier (+ `.min`) → secondary minifier (+ `.min`) → custom
//! rename → sourcemap-write → write. The two minifiers are mutually
//! independent; both may apply, each adding its own suffix.

use crate::config::JsSpec;
use crate::pipeline::Pipeline;
use crate::stages::{
    Concat, DebugLog, DepOrder, JsCompress, JsMinify, Rename, SourcemapInit, SourcemapWrite,
    StripDebug, Write,
};

/// Build the stage chain for a script task.
pub fn build(spec: &JsSpec) -> Pipeline {
    let mut pipeline = Pipeline::new();

    if spec.source_maps.enable {
        pipeline.push(Box::new(SourcemapInit));
    }

    if spec.common.verbose {
        pipeline.push(Box::new(DebugLog::new("Processing JS")));
    }

    if spec.strip_debug {
        pipeline.push(Box::new(StripDebug::new()));
    }

    if let Some(concat) = &spec.concat {
        if spec.dep_order {
            pipeline.push(Box::new(DepOrder));
        }
        pipeline.push(Box::new(Concat::new(concat)));
    }

    if spec.minify {
        pipeline.push(Box::new(JsMinify));
        pipeline.push(Box::new(Rename::suffix(".min")));
    }

    if spec.compress {
        pipeline.push(Box::new(JsCompress));
        pipeline.push(Box::new(Rename::suffix(".min")));
    }

    if spec.common.rename {
        pipeline.push(Box::new(Rename::new(spec.common.rename_options.clone())));
    }

    if spec.source_maps.enable {
        pipeline.push(Box::new(SourcemapWrite::new(spec.source_maps.write_path.clone())));
    }

    pipeline.push(Box::new(Write));
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Category, TaskSpec};

    fn js_spec(toml: &str) -> JsSpec {
        let table: toml::value::Table = toml::from_str(toml).unwrap();
        match TaskSpec::from_table(Category::Js, table).unwrap() {
            TaskSpec::Js(s) => s,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_minimal_js_pipeline() {
        let spec = js_spec("src = \"js/**\"\ndest = \"out\"");
        let pipeline = build(&spec);
        assert_eq!(pipeline.stage_names(), vec!["write"]);
    }

    #[test]
    fn test_concat_precedes_minify_rename() {
        let spec = js_spec(
            "src = \"js/**\"\ndest = \"out\"\nconcat = \"all.js\"\nminify = true",
        );
        let pipeline = build(&spec);
        assert_eq!(pipeline.stage_names(), vec!["concat", "js-minify", "rename", "write"]);
    }

    #[test]
    fn test_both_minifiers_apply_independently() {
        let spec = js_spec("src = \"js/**\"\ndest = \"out\"\nminify = true\ncompress = true");
        let pipeline = build(&spec);
        assert_eq!(
            pipeline.stage_names(),
            vec!["js-minify", "rename", "js-compress", "rename", "write"]
        );
    }
}
