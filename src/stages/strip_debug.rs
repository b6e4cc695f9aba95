//! Debug statement removal for scripts.

use crate::pipeline::{Asset, Stage, StageContext, StageError};
use regex::Regex;

/// Strips `console.*(...)`, `alert(...)` and `debugger` statements from
/// script sources. Matching is line oriented: only statements that make up
/// a full line (with optional leading whitespace and trailing semicolon)
/// are removed, so expressions embedded in larger statements survive and a
/// debug call sharing its line with other code is kept.
pub struct StripDebug {
    line: Regex,
}

impl StripDebug {
    pub fn new() -> Self {
        // Arguments may not contain a semicolon, so a debug call followed
        // by another statement never matches as a full line.
        let line = Regex::new(
            r"(?m)^[ \t]*(?:console\.[A-Za-z]+\s*\([^;\n]*\)|alert\s*\([^;\n]*\)|debugger)[ \t]*;?[ \t]*(?:\r?\n|\z)",
        )
        .expect("valid regex");
        Self { line }
    }
}

impl Default for StripDebug {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for StripDebug {
    fn name(&self) -> &'static str {
        "strip-debug"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            let text = asset.text().into_owned();
            let stripped = self.line.replace_all(&text, "");
            if stripped != text {
                asset.set_text(stripped.into_owned());
            }
        }
        Ok(assets)
    }
}
