//! Markup minification stage.
//!
//! Conservative pass: strips HTML comments (conditional comments are
//! kept) and collapses whitespace runs between tags. Content inside tags
//! and text nodes is untouched.

use crate::pipeline::{Asset, Stage, StageContext, StageError};
use regex::Regex;

pub struct HtmlMin;

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("<!--") {
        // Conditional comments carry real markup for legacy IE.
        if rest[start..].starts_with("<!--[if") {
            match rest[start..].find("-->") {
                Some(end) => {
                    out.push_str(&rest[..start + end + 3]);
                    rest = &rest[start + end + 3..];
                    continue;
                }
                None => break,
            }
        }
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
    out
}

impl Stage for HtmlMin {
    fn name(&self) -> &'static str {
        "html-min"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        let between_tags = Regex::new(r">\s+<").expect("valid regex");
        for asset in &mut assets {
            let text = asset.text().into_owned();
            let stripped = strip_comments(&text);
            let collapsed = between_tags.replace_all(&stripped, "><");
            asset.set_text(collapsed.trim().to_string());
        }
        Ok(assets)
    }
}
