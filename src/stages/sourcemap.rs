//! Sourcemap bookkeeping stages.
//!
//! `SourcemapInit` runs first in a chain and records each asset's original
//! path; transform stages that merge assets carry the lists forward.
//! `SourcemapWrite` runs just before the final write and emits one sidecar
//! `.map` per asset plus a `sourceMappingURL` footer in the asset itself.
//! The maps carry the source list but no mappings; they exist so dev tools
//! can name the inputs a generated file came from.

use crate::pipeline::{Asset, Stage, StageContext, StageError};
use serde_json::json;
use std::path::{Path, PathBuf};

pub struct SourcemapInit;

pub struct SourcemapWrite {
    write_path: String,
}

impl SourcemapWrite {
    /// `write_path` is the map directory relative to the destination;
    /// `None` places maps next to their files.
    pub fn new(write_path: Option<String>) -> Self {
        Self { write_path: write_path.unwrap_or_else(|| ".".to_string()) }
    }

    fn map_rel_path(&self, asset: &Asset) -> PathBuf {
        let file_name = format!("{}.map", asset.file_name());
        if self.write_path == "." {
            let dir = asset.rel_path.parent().unwrap_or(Path::new(""));
            dir.join(file_name)
        } else {
            Path::new(&self.write_path).join(file_name)
        }
    }
}

impl Stage for SourcemapInit {
    fn name(&self) -> &'static str {
        "sourcemap-init"
    }

    fn apply(&self, mut assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        for asset in &mut assets {
            asset.map_sources = Some(vec![asset.rel_path.display().to_string()]);
        }
        Ok(assets)
    }
}

impl Stage for SourcemapWrite {
    fn name(&self) -> &'static str {
        "sourcemap-write"
    }

    fn apply(&self, assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        let mut out = Vec::with_capacity(assets.len() * 2);

        for mut asset in assets {
            let Some(sources) = asset.map_sources.clone() else {
                out.push(asset);
                continue;
            };

            let map_path = self.map_rel_path(&asset);
            let map = json!({
                "version": 3,
                "file": asset.file_name(),
                "sources": sources,
                "mappings": "",
            });
            let map_url = map_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let footer = match asset.extension().as_deref() {
                Some("css") => format!("\n/*# sourceMappingURL={map_url} */\n"),
                _ => format!("\n//# sourceMappingURL={map_url}\n"),
            };
            asset.contents.extend_from_slice(footer.as_bytes());

            out.push(asset);
            out.push(Asset::new(map_path, map.to_string().into_bytes()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cx() -> StageContext {
        StageContext::new("sass-1", Path::new("/p"), Path::new("/p/out"), false)
    }

    #[test]
    fn test_init_records_origin() {
        let assets = vec![Asset::new("css/a.css", b"a{}".to_vec())];
        let out = SourcemapInit.apply(assets, &cx()).unwrap();
        assert_eq!(out[0].map_sources.as_deref(), Some(&["css/a.css".to_string()][..]));
    }

    #[test]
    fn test_write_emits_sidecar_and_footer() {
        let mut asset = Asset::new("style.min.css", b"a{}".to_vec());
        asset.map_sources = Some(vec!["a.scss".to_string(), "b.scss".to_string()]);

        let out = SourcemapWrite::new(None).apply(vec![asset], &cx()).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].text().ends_with("/*# sourceMappingURL=style.min.css.map */\n"));
        assert_eq!(out[1].rel_path, Path::new("style.min.css.map"));

        let map: serde_json::Value = serde_json::from_slice(&out[1].contents).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["sources"][1], "b.scss");
    }

    #[test]
    fn test_js_footer_uses_line_comment() {
        let mut asset = Asset::new("app.js", b"x()".to_vec());
        asset.map_sources = Some(vec!["app.js".to_string()]);

        let out = SourcemapWrite::new(None).apply(vec![asset], &cx()).unwrap();
        assert!(out[0].text().contains("//# sourceMappingURL=app.js.map"));
    }

    #[test]
    fn test_write_path_redirects_maps() {
        let mut asset = Asset::new("css/style.css", b"a{}".to_vec());
        asset.map_sources = Some(vec!["style.scss".to_string()]);

        let out = SourcemapWrite::new(Some("maps".to_string())).apply(vec![asset], &cx()).unwrap();
        assert_eq!(out[1].rel_path, Path::new("maps/style.css.map"));
    }

    #[test]
    fn test_assets_without_sources_untouched() {
        let assets = vec![Asset::new("plain.css", b"a{}".to_vec())];
        let out = SourcemapWrite::new(None).apply(assets, &cx()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text(), "a{}");
    }
}
