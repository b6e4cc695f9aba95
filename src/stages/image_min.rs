//! Lossless-leaning image size reduction.
//!
//! PNG and JPEG sources are decoded and re-encoded; the re-encoded bytes
//! are kept only when they are actually smaller. SVG sources get a textual
//! pass that drops comments and collapses whitespace between tags. GIFs,
//! files outside the handled extensions, and files that fail to decode
//! pass through byte-identical.

use crate::pipeline::{Asset, Stage, StageContext, StageError};
use image::ImageFormat;
use std::io::Cursor;

pub struct ImageMin;

/// Extensions the minifier will touch, matched case-insensitively.
pub fn is_optimizable(extension: &str) -> bool {
    matches!(
        extension.to_ascii_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "gif" | "svg"
    )
}

fn raster_format(extension: &str) -> Option<ImageFormat> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        // GIF is never re-encoded: decoding keeps only the first frame,
        // which would flatten an animation.
        _ => None,
    }
}

fn reencode_raster(contents: &[u8], format: ImageFormat) -> Option<Vec<u8>> {
    let decoded = image::load_from_memory(contents).ok()?;
    let mut encoded = Cursor::new(Vec::new());
    decoded.write_to(&mut encoded, format).ok()?;
    Some(encoded.into_inner())
}

fn minify_svg(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start..].find("-->") {
            Some(end) => rest = &rest[start + end + 3..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);

    // Collapse inter-tag whitespace runs down to nothing.
    let mut collapsed = String::with_capacity(out.len());
    let mut chars = out.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '>' {
            collapsed.push(c);
            while matches!(chars.peek(), Some(w) if w.is_whitespace()) {
                chars.next();
            }
        } else {
            collapsed.push(c);
        }
    }
    collapsed
}

impl Stage for ImageMin {
    fn name(&self) -> &'static str {
        "image-min"
    }

    fn apply(&self, mut assets: Vec<Asset>, cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let Some(ext) = asset.extension() else { continue };
            if !is_optimizable(&ext) {
                continue;
            }

            if ext.eq_ignore_ascii_case("svg") {
                let text = asset.text().into_owned();
                asset.set_text(minify_svg(&text));
                continue;
            }

            let Some(format) = raster_format(&ext) else { continue };
            match reencode_raster(&asset.contents, format) {
                Some(encoded) if encoded.len() < asset.contents.len() => {
                    asset.contents = encoded;
                }
                Some(_) => {}
                None => {
                    if cx.verbose {
                        println!(
                            "{}: could not decode {}, copying as-is",
                            cx.task_name,
                            asset.rel_path.display()
                        );
                    }
                }
            }
        }
        Ok(assets)
    }
}
