//! Image pipeline assembly.
//!
//! Order: changed-filter → debug-log → extension-gated minify → write.
//! The minifier only touches png/jpg/jpeg/gif/svg files (checked
//! case-insensitively); everything else passes through byte-identical.

use crate::config::ImageSpec;
use crate::pipeline::Pipeline;
use crate::stages::{Changed, DebugLog, ImageMin, Write};

/// Build the stage chain for an image task.
pub fn build(spec: &ImageSpec) -> Pipeline {
    let mut pipeline = Pipeline::new();

    if spec.changed {
        pipeline.push(Box::new(Changed));
    }

    if spec.common.verbose {
        pipeline.push(Box::new(DebugLog::new("Processing Image")));
    }

    if spec.minify {
        pipeline.push(Box::new(ImageMin));
    }

    pipeline.push(Box::new(Write));
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Category, TaskSpec};

    fn image_spec(toml: &str) -> ImageSpec {
        let table: toml::value::Table = toml::from_str(toml).unwrap();
        match TaskSpec::from_table(Category::Image, table).unwrap() {
            TaskSpec::Image(s) => s,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_minimal_image_pipeline() {
        let spec = image_spec("src = \"img/**\"\ndest = \"out\"");
        let pipeline = build(&spec);
        assert_eq!(pipeline.stage_names(), vec!["write"]);
    }

    #[test]
    fn test_changed_precedes_minify() {
        let spec = image_spec("src = \"img/**\"\ndest = \"out\"\nchanged = true\nminify = true");
        let pipeline = build(&spec);
        assert_eq!(pipeline.stage_names(), vec!["changed", "image-min", "write"]);
    }
}
