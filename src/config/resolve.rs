//! Cascading configuration resolution.
//!
//! Merges environment, global, and per-record settings into one effective
//! record per task. The cascade is one-directional and precedence-ordered,
//! not a deep merge: a key present at a higher tier is never overwritten by
//! a lower tier, and only the environment tier may overwrite authored keys.
//!
//! Tiers, high to low:
//! 1. the active environment override (destructive: always wins)
//! 2. the record as authored
//! 3. top-level `global` keys (category sub-tables excluded)
//! 4. the category block: the record's own nested `<category>` table if
//!    authored, otherwise `global.<category>`; exactly one block applies
//!
//! Resolution is a pure function producing a new table per record, so tasks
//! never alias shared sub-tables.

use crate::config::schema::Category;
use toml::value::Table;

/// Resolve one task record against the global and environment tables.
pub fn resolve_record(
    record: &Table,
    category: Category,
    global: &Table,
    env_override: Option<&Table>,
) -> Table {
    let mut out = record.clone();

    // Tier 1: forced environment profile, overwrites unconditionally.
    if let Some(env) = env_override {
        for (key, value) in env {
            out.insert(key.clone(), value.clone());
        }
    }

    // Tier 3: global fills missing keys only. Nested category sub-tables
    // are not copied here; they participate through the block tier below.
    for (key, value) in global {
        if Category::is_category_key(key) {
            continue;
        }
        if !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }

    // Tier 4: the category block. The record's own block shadows the
    // global one; block keys fill still-missing top-level keys only.
    let block = out
        .get(category.key())
        .and_then(|v| v.as_table())
        .cloned()
        .or_else(|| global.get(category.key()).and_then(|v| v.as_table()).cloned());

    if let Some(block) = block {
        for (key, value) in block {
            if !out.contains_key(&key) {
                out.insert(key, value);
            }
        }
    }

    out
}
