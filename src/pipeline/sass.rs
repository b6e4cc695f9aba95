//! Stylesheet pipeline assembly.
//!
//! Order: sourcemap-init → debug-log → header → compile → post-processing
//! set (autoprefix/minify/media-sort) → dep-order + concat → `.min` suffix
//! rename → custom rename → sourcemap-write → write.

use crate::config::SassSpec;
use crate::pipeline::Pipeline;
use crate::stages::{
    Concat, CssCompile, CssPost, DebugLog, DepOrder, Header, Rename, SourcemapInit, SourcemapWrite,
    Write,
};

/// Build the stage chain for a stylesheet task.
pub fn build(spec: &SassSpec) -> Pipeline {
    let mut pipeline = Pipeline::new();

    if spec.source_maps.enable {
        pipeline.push(Box::new(SourcemapInit));
    }

    if spec.common.verbose {
        pipeline.push(Box::new(DebugLog::new("Processing SASS")));
    }

    if let Some(header) = &spec.header {
        pipeline.push(Box::new(Header::new(header)));
    }

    pipeline.push(Box::new(CssCompile));

    // Post-processing set: flags accumulate into one pass applied after
    // compilation, mirroring a plugin-array model.
    if spec.autoprefix || spec.minify || spec.sort_media_queries {
        pipeline.push(Box::new(CssPost {
            autoprefix: spec.autoprefix,
            minify: spec.minify,
            sort_media_queries: spec.sort_media_queries,
        }));
    }

    if let Some(concat) = &spec.concat {
        if spec.dep_order {
            pipeline.push(Box::new(DepOrder));
        }
        pipeline.push(Box::new(Concat::new(concat)));
    }

    if spec.minify {
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
