//! Script size reduction stages.
//!
//! Two independent passes with different aggressiveness. `JsMinify` strips
//! comments and blank lines with a string-aware scanner; `JsCompress`
//! additionally drops leading indentation. Neither pass renames symbols or
//! rewrites syntax, and lines inside string or template literals are left
//! untouched, so output stays valid for any input that was valid.

use crate::pipeline::{Asset, Stage, StageContext, StageError};

/// Removes `//` and `/* */` comments outside of string and template
/// literals, then collapses blank lines.
pub struct JsMinify;

/// Secondary pass: comment removal plus whitespace tightening.
pub struct JsCompress;

/// Removes comments, copying everything else through verbatim. Operates on
/// byte offsets but only ever splits the source at ASCII delimiters, so
/// multi-byte characters pass through intact.
fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut span = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'' | b'`') => {
                // Skip to the end of the literal, honoring escapes.
                i += 1;
                while i < bytes.len() {
                    let s = bytes[i];
                    i += 1;
                    if s == b'\\' && i < bytes.len() {
                        i += 1;
                    } else if s == quote {
                        break;
                    }
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&source[span..i]);
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                span = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&source[span..i]);
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                span = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&source[span..]);
    out
}

/// For each line, whether it begins inside a string or template literal.
/// Such lines carry runtime string content and must not be reshaped.
fn lines_in_literal(source: &str) -> Vec<bool> {
    let bytes = source.as_bytes();
    let mut flags = vec![false];
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        i += 1;
        match quote {
            Some(q) => {
                if c == b'\\' && i < bytes.len() {
                    if bytes[i] == b'\n' {
                        flags.push(true);
                    }
                    i += 1;
                } else if c == q {
                    quote = None;
                } else if c == b'\n' {
                    flags.push(true);
                }
            }
            None => {
                if matches!(c, b'"' | b'\'' | b'`') {
                    quote = Some(c);
                } else if c == b'\n' {
                    flags.push(false);
                }
            }
        }
    }
    flags
}

fn drop_blank_lines(source: &str) -> String {
    let protected = lines_in_literal(source);
    let mut out: Vec<&str> = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        if !line.trim().is_empty() || protected.get(idx).copied().unwrap_or(false) {
            out.push(line);
        }
    }
    let mut joined = out.join("\n");
    if source.ends_with('\n') && !joined.is_empty() {
        joined.push('\n');
    }
    joined
}

impl Stage for JsMinify {
    fn name(&self) -> &'static str {
        "js-minify"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let text = asset.text().into_owned();
            asset.set_text(drop_blank_lines(&strip_comments(&text)));
        }
        Ok(assets)
    }
}

impl Stage for JsCompress {
    fn name(&self) -> &'static str {
        "js-compress"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let text = asset.text().into_owned();
            let stripped = strip_comments(&text);
            let protected = lines_in_literal(&stripped);
            let mut lines: Vec<&str> = Vec::new();
            for (idx, line) in stripped.lines().enumerate() {
                if protected.get(idx).copied().unwrap_or(false) {
                    lines.push(line);
                    continue;
                }
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed);
                }
            }
            let mut joined = lines.join("\n");
            if text.ends_with('\n') && !joined.is_empty() {
                joined.push('\n');
            }
            asset.set_text(joined);
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

    fn minify(source: &str) -> String {
        let assets = vec![Asset::new("a.js", source.as_bytes().to_vec())];
        JsMinify.apply(assets, &cx()).unwrap()[0].text().into_owned()
    }

    fn compress(source: &str) -> String {
        let assets = vec![Asset::new("a.js", source.as_bytes().to_vec())];
        JsCompress.apply(assets, &cx()).unwrap()[0].text().into_owned()
    }

    #[test]
    fn test_minify_strips_line_and_block_comments() {
        let out = minify("// header\nlet x = 1; /* note */\n\nlet y = 2;\n");
        assert_eq!(out, "let x = 1; \nlet y = 2;\n");
    }

    #[test]
    fn test_minify_preserves_strings_with_slashes() {
        let out = minify("let url = \"http://example.com\";\n");
        assert_eq!(out, "let url = \"http://example.com\";\n");
    }

    #[test]
    fn test_minify_honors_escaped_quotes() {
        let out = minify("let s = 'it\\'s // not a comment';\n");
        assert_eq!(out, "let s = 'it\\'s // not a comment';\n");
    }

    #[test]
    fn test_minify_preserves_non_ascii_strings() {
        let source = "let s = \"héllo wörld\";\n";
        assert_eq!(minify(source), source);
    }

    #[test]
    fn test_minify_keeps_blank_lines_inside_template_literals() {
        let source = "let t = `line1\n\nline2`;\n";
        assert_eq!(minify(source), source);
    }

    #[test]
    fn test_compress_drops_indentation() {
        let out = compress("function f() {\n    return 1; // inline\n}\n");
        assert_eq!(out, "function f() {\nreturn 1;\n}\n");
    }

    #[test]
    fn test_compress_keeps_template_literal_content() {
        let source = "function f() {\n    return `a\n\n    b`;\n}\n";
        assert_eq!(compress(source), "function f() {\nreturn `a\n\n    b`;\n}\n");
    }
}
