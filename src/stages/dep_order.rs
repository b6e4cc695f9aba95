//! Dependency-aware ordering for concatenation.
//!
//! Sources may declare dependencies in a leading comment annotation:
//!
//! ```text
//! /* @requires util.js */
//! // @requires vendor/base.js
//! ```
//!
//! Files are reordered so that a file's requirements come before it.
//! Paths in annotations are matched against asset paths by exact match or
//! by path suffix. Unresolvable or cyclic requirements do not fail the
//! build; the remaining files are appended in their incoming order.

use crate::pipeline::{Asset, Stage, StageContext, StageError};
use regex::Regex;

pub struct DepOrder;

fn requires_of(asset: &Asset, pattern: &Regex) -> Vec<String> {
    let text = asset.text();
    pattern
        .captures_iter(&text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}

fn find_index(assets: &[Asset], wanted: &str) -> Option<usize> {
    let wanted_path = std::path::Path::new(wanted);
    assets.iter().position(|a| a.rel_path == wanted_path).or_else(|| {
        assets.iter().position(|a| a.rel_path.ends_with(wanted_path))
    })
}

impl Stage for DepOrder {
    fn name(&self) -> &'static str {
        "dep-order"
    }

    fn apply(&self, assets: Vec<Asset>, _cx: &StageContext) -> Result<Vec<Asset>, StageError> {
        let pattern = Regex::new(r"@requires?\s+([^\s*]+)").expect("valid regex");

        let deps: Vec<Vec<usize>> = assets
            .iter()
            .map(|asset| {
                requires_of(asset, &pattern)
                    .iter()
                    .filter_map(|want| find_index(&assets, want))
                    .collect()
            })
            .collect();

        // Kahn-style emission preserving incoming order among ready files.
        let mut emitted = vec![false; assets.len()];
        let mut order: Vec<usize> = Vec::with_capacity(assets.len());
        loop {
            let mut progressed = false;
            for i in 0..assets.len() {
                if emitted[i] {
                    continue;
                }
                if deps[i].iter().all(|&d| emitted[d] || d == i) {
                    emitted[i] = true;
                    order.push(i);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
        // Cycles: append whatever remains in incoming order.
        for i in 0..assets.len() {
            if !emitted[i] {
                order.push(i);
            }
        }

        let mut slots: Vec<Option<Asset>> = assets.into_iter().map(Some).collect();
        Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
    }
}
