//! Localization expansion stage.
//!
//! Expands each view into one output per configured locale. Dictionaries
//! are JSON files named `<locale>.json` under the locale directory; keys
//! in templates use dot paths between the configured delimiters, e.g.
//! `${{ nav.home }}$`. A missing key falls back to the fallback locale's
//! dictionary when one is configured, otherwise the token is left as-is.
//!
//! Output layout follows the configured schema: `fr/index.html`
//! (subdirectory) or `index-fr.html` (suffix).

use crate::config::{LocalizeSchema, LocalizeSpec};
use crate::pipeline::{Asset, Stage, StageContext, StageError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Localize {
    spec: LocalizeSpec,
}

impl Localize {
    pub fn new(spec: LocalizeSpec) -> Self {
        Self { spec }
    }

    fn load_dictionary(&self, root: &Path, locale: &str) -> Result<Value, StageError> {
        let path = root.join(&self.spec.locale_dir).join(format!("{locale}.json"));
        let raw = fs::read_to_string(&path).map_err(|e| {
            StageError::Localize(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            StageError::Localize(format!("invalid dictionary {}: {e}", path.display()))
        })
    }

    fn localized_path(&self, rel_path: &Path, locale: &str) -> PathBuf {
        match self.spec.schema {
            LocalizeSchema::Subdirectory => Path::new(locale).join(rel_path),
            LocalizeSchema::Suffix => {
                let dir = rel_path.parent().unwrap_or(Path::new(""));
                let stem = rel_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let ext = rel_path
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                dir.join(format!("{stem}-{locale}{ext}"))
            }
        }
    }

    fn translate(&self, text: &str, dict: &Value, fallback: Option<&Value>) -> String {
        let [open, close] = &self.spec.delimiters;
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(open.as_str()) {
            out.push_str(&rest[..start]);
            let after = &rest[start + open.len()..];
            match after.find(close.as_str()) {
                Some(end) => {
                    let key = after[..end].trim();
                    match lookup(dict, key).or_else(|| fallback.and_then(|f| lookup(f, key))) {
                        Some(value) => out.push_str(&value),
                        None => out.push_str(&rest[start..start + open.len() + end + close.len()]),
                    }
                    rest = &after[end + close.len()..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Resolve a dot path (`nav.home`) inside a nested JSON object.
fn lookup(dict: &Value, key: &str) -> Option<String> {
    let mut node = dict;
    for part in key.split('.') {
        node = node.get(part)?;
    }
    match node {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Stage for Localize {
    fn name(&self) -> &'static str {
        "localize"
    }

    fn apply(&self, assets: Vec<Asset>, cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        if self.spec.locales.is_empty() {
            return Ok(assets);
        }

        let mut dictionaries: BTreeMap<String, Value> = BTreeMap::new();
        for locale in &self.spec.locales {
            dictionaries.insert(locale.clone(), self.load_dictionary(&cx.root, locale)?);
        }
        let fallback = self
            .spec
            .fallback
            .as_ref()
            .map(|locale| self.load_dictionary(&cx.root, locale))
            .transpose()?;

        let mut expanded = Vec::with_capacity(assets.len() * self.spec.locales.len());
        for asset in &assets {
            let text = asset.text().into_owned();
            for locale in &self.spec.locales {
                let dict = &dictionaries[locale];
                let mut localized = asset.clone();
                localized.rel_path = self.localized_path(&asset.rel_path, locale);
                localized.set_text(self.translate(&text, dict, fallback.as_ref()));
                expanded.push(localized);
            }
        }
        Ok(expanded)
    }
}
