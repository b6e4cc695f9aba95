//! Stylesheet compilation and post-processing stages.

use crate::pipeline::{Asset, Stage, StageContext, StageError};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use std::sync::{Arc, RwLock};

/// Parses each stylesheet and re-prints it, normalizing the source and
/// rewriting `.scss`/`.sass` extensions to `.css`. Nested rules are
/// flattened by the parser. A parse failure fails the task with the
/// offending file named; errors the parser would recover from by dropping
/// the offending declaration or rule are failures too, so no authored
/// style is ever silently discarded.
pub struct CssCompile;

/// Post-compilation pass. Flags accumulate: vendor prefixing against a
/// fixed browser matrix, whitespace minification, and reordering of
/// top-level `@media` blocks by ascending `min-width`.
pub struct CssPost {
    pub autoprefix: bool,
    pub minify: bool,
    pub sort_media_queries: bool,
}

fn browser_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(30 << 16),
        edge: Some(15 << 16),
        firefox: Some(30 << 16),
        safari: Some(9 << 16),
        ..Browsers::default()
    })
}

fn css_error(asset: &Asset, message: impl std::fmt::Display) -> StageError {
    StageError::Css {
        file: asset.rel_path.display().to_string(),
        message: message.to_string(),
    }
}

fn reprint(asset: &Asset, targets: Option<Targets>, minify: bool) -> Result<String, StageError> {
    let source = asset.text().into_owned();
    let warnings = Arc::new(RwLock::new(Vec::new()));
    let options = ParserOptions { warnings: Some(warnings.clone()), ..ParserOptions::default() };
    let mut sheet =
        StyleSheet::parse(&source, options).map_err(|e| css_error(asset, e.to_string()))?;

    // The parser recovers from some errors by skipping the bad declaration.
    if let Ok(recovered) = warnings.read() {
        if let Some(first) = recovered.first() {
            return Err(css_error(asset, first));
        }
    }

    let targets = targets.unwrap_or_default();
    sheet
        .minify(MinifyOptions { targets, ..MinifyOptions::default() })
        .map_err(|e| css_error(asset, e))?;

    let printed = sheet
        .to_css(PrinterOptions { minify, targets, ..PrinterOptions::default() })
        .map_err(|e| css_error(asset, e))?;
    Ok(printed.code)
}

impl Stage for CssCompile {
    fn name(&self) -> &'static str {
        "css-compile"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let code = reprint(asset, None, false)?;
            asset.set_text(code);
            if matches!(asset.extension().as_deref(), Some("scss") | Some("sass")) {
                asset.set_extension("css");
            }
        }
        Ok(assets)
    }
}

/// Reorders top-level `@media` blocks by ascending `min-width`, keeping
/// non-media content and media blocks without a `min-width` in place
/// relative to each other.
fn sort_media_blocks(source: &str) -> String {
    let blocks = split_top_level(source);
    let mut media: Vec<(u64, String)> = Vec::new();
    let mut rest: Vec<String> = Vec::new();

    for block in blocks {
        match media_min_width(&block) {
            Some(width) => media.push((width, block)),
            None => rest.push(block),
        }
    }
    media.sort_by_key(|(width, _)| *width);

    let mut out = String::with_capacity(source.len());
    for chunk in rest.into_iter().chain(media.into_iter().map(|(_, b)| b)) {
        out.push_str(&chunk);
    }
    out
}

/// Splits a stylesheet into top-level chunks, each ending at the close of
/// a brace-balanced block.
fn split_top_level(source: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in source.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    chunks.push(source[start..=i].to_string());
                    start = i + 1;
                }
            }
            _ => {}
        }
    }
    if start < source.len() {
        chunks.push(source[start..].to_string());
    }
    chunks
}

fn media_min_width(block: &str) -> Option<u64> {
    let trimmed = block.trim_start();
    if !trimmed.starts_with("@media") {
        return None;
    }
    let header = trimmed.split('{').next()?;
    let idx = header.find("min-width")?;
    let after = &header[idx + "min-width".len()..];
    let digits: String = after
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

impl Stage for CssPost {
    fn name(&self) -> &'static str {
        "css-post"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let targets = self.autoprefix.then(browser_targets);
            let mut code = reprint(asset, targets, self.minify)?;
            if self.sort_media_queries {
                code = sort_media_blocks(&code);
            }
            asset.set_text(code);
        }
        Ok(assets)
    }
}
