//! Configuration schema types for `assetpipe.toml`
//!
//! The configuration tree has five pipeline categories (sass, js, image,
//! view, copy), each an ordered array of task records, plus a `global`
//! table, an optional `env` map of override tables, and a `[serve]`
//! section. Records are kept as raw `toml::Table`s so the cascade in
//! [`crate::config::resolve`] can operate key-wise; typed specs are
//! produced from the resolved tables.

use serde::Deserialize;
use std::collections::BTreeMap;
use toml::value::Table;

/// A pipeline category: one class of asset transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Stylesheets
    Sass,
    /// Scripts
    Js,
    /// Images
    Image,
    /// Templated views
    View,
    /// Static copies
    Copy,
}

impl Category {
    /// All categories in declared registration order.
    pub const ALL: [Category; 5] =
        [Category::Sass, Category::Js, Category::Image, Category::View, Category::Copy];

    /// The configuration key for this category.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Sass => "sass",
            Category::Js => "js",
            Category::Image => "image",
            Category::View => "view",
            Category::Copy => "copy",
        }
    }

    /// Look up a category by its configuration key.
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Whether a top-level key names a pipeline category.
    pub fn is_category_key(key: &str) -> bool {
        Category::from_key(key).is_some()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One string or a list of strings, as TOML allows either.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    /// A single entry
    One(String),
    /// Multiple entries
    Many(Vec<String>),
}

impl StringList {
    /// View the entries as a slice-backed vector.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            StringList::One(s) => vec![s.clone()],
            StringList::Many(v) => v.clone(),
        }
    }

    /// Whether no entries are present.
    pub fn is_empty(&self) -> bool {
        match self {
            StringList::One(s) => s.is_empty(),
            StringList::Many(v) => v.is_empty(),
        }
    }
}

impl Default for StringList {
    fn default() -> Self {
        StringList::Many(vec![])
    }
}

/// The `delete` option: a flag, or explicit path(s)/pattern(s).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeleteSpec {
    /// `delete = true` deletes the destination; `false` disables
    Flag(bool),
    /// Explicit deletion targets (paths or glob patterns)
    Paths(StringList),
}

/// The `watch` option: a flag (watch the task's own src), or explicit
/// pattern(s).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WatchSpec {
    /// `watch = true` watches the task's source patterns
    Flag(bool),
    /// Explicit watch pattern(s)
    Patterns(StringList),
}

impl WatchSpec {
    /// Whether watching is requested at all.
    pub fn is_enabled(&self) -> bool {
        match self {
            WatchSpec::Flag(flag) => *flag,
            WatchSpec::Patterns(p) => !p.is_empty(),
        }
    }
}

/// Source read options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SrcOptions {
    /// Base directory for computing destination-relative paths.
    /// Defaults to the non-glob prefix of each source pattern.
    pub base: Option<String>,
}

/// Deletion options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteOptions {
    /// Log what would be deleted without deleting
    pub dry_run: bool,
}

/// Rename options with gulp-rename field semantics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenameOptions {
    /// Replace the directory portion of the relative path
    pub dirname: Option<String>,
    /// Replace the file stem
    pub basename: Option<String>,
    /// Prepend to the file stem
    pub prefix: Option<String>,
    /// Append to the file stem (before the extension)
    pub suffix: Option<String>,
    /// Replace the extension (with leading dot, e.g. `".html"`)
    pub extname: Option<String>,
}

/// Source map options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceMapsSpec {
    /// Emit sidecar `.map` files
    pub enable: bool,
    /// Directory for map files, relative to the destination
    pub write_path: Option<String>,
}

/// Options common to every task record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommonSpec {
    /// Source glob pattern(s), relative to the project root
    pub src: StringList,
    /// Source read options
    pub src_options: SrcOptions,
    /// Destination directory, relative to the project root
    pub dest: Option<String>,
    /// Delete before building
    pub delete: Option<DeleteSpec>,
    /// Deletion options
    pub delete_options: DeleteOptions,
    /// Watch binding
    pub watch: Option<WatchSpec>,
    /// Apply `rename_options` to output names
    pub rename: bool,
    /// Rename options
    pub rename_options: RenameOptions,
    /// Per-file processing logs
    pub verbose: bool,
    /// Orchestrator-level diagnostics
    pub debug: bool,
}

impl CommonSpec {
    /// Whether this task's watch option is truthy.
    pub fn watch_enabled(&self) -> bool {
        self.watch.as_ref().map(WatchSpec::is_enabled).unwrap_or(false)
    }

    /// The patterns this task watches: the literal configured pattern(s)
    /// if `watch` is a string, else the task's own source patterns.
    pub fn watch_patterns(&self) -> Vec<String> {
        match &self.watch {
            Some(WatchSpec::Patterns(p)) if !p.is_empty() => p.to_vec(),
            Some(WatchSpec::Flag(true)) => self.src.to_vec(),
            _ => vec![],
        }
    }
}

/// Template inclusion options for views.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileIncludeSpec {
    /// Marker prefix before `include(...)`
    pub prefix: String,
    /// Base directory for include paths, relative to the project root
    pub base_path: String,
}

impl Default for FileIncludeSpec {
    fn default() -> Self {
        Self { prefix: "@@".to_string(), base_path: ".".to_string() }
    }
}

/// Localized output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocalizeSchema {
    /// `fr/index.html`
    #[default]
    Subdirectory,
    /// `index-fr.html`
    Suffix,
}

/// Localization expansion options for views.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalizeSpec {
    /// Locale identifiers to expand (e.g. `["en", "fr"]`)
    pub locales: Vec<String>,
    /// Directory containing `<locale>.json` dictionaries
    pub locale_dir: String,
    /// Output layout
    pub schema: LocalizeSchema,
    /// Locale used when a key is missing
    pub fallback: Option<String>,
    /// Token delimiters
    pub delimiters: [String; 2],
}

impl Default for LocalizeSpec {
    fn default() -> Self {
        Self {
            locales: vec![],
            locale_dir: "locales".to_string(),
            schema: LocalizeSchema::default(),
            fallback: None,
            delimiters: ["${{".to_string(), "}}$".to_string()],
        }
    }
}

/// A stylesheet task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SassSpec {
    /// Common options
    #[serde(flatten)]
    pub common: CommonSpec,
    /// Banner prepended before compilation
    pub header: Option<String>,
    /// Add vendor prefixes
    pub autoprefix: bool,
    /// Minify output (adds the `.min` suffix)
    pub minify: bool,
    /// Reorder media queries mobile-first
    pub sort_media_queries: bool,
    /// Concatenate into a single named file
    pub concat: Option<String>,
    /// Honor `@requires` annotations when concatenating
    pub dep_order: bool,
    /// Source map emission
    pub source_maps: SourceMapsSpec,
}

/// A script task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsSpec {
    /// Common options
    #[serde(flatten)]
    pub common: CommonSpec,
    /// Remove console/debugger/alert statements
    pub strip_debug: bool,
    /// Concatenate into a single named file
    pub concat: Option<String>,
    /// Honor `@requires` annotations when concatenating
    pub dep_order: bool,
    /// Primary minifier (adds the `.min` suffix)
    pub minify: bool,
    /// Secondary minifier (independent of `minify`; also adds `.min`)
    pub compress: bool,
    /// Source map emission
    pub source_maps: SourceMapsSpec,
}

/// An image task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageSpec {
    /// Common options
    #[serde(flatten)]
    pub common: CommonSpec,
    /// Optimize png/jpg/jpeg/gif/svg files; others pass through
    pub minify: bool,
    /// Skip files not newer than their destination copy
    pub changed: bool,
}

/// A templated view task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewSpec {
    /// Common options
    #[serde(flatten)]
    pub common: CommonSpec,
    /// Minify HTML output
    pub minify: bool,
    /// Template inclusion
    pub file_include: Option<FileIncludeSpec>,
    /// Localization expansion
    pub localize: Option<LocalizeSpec>,
}

/// A verbatim copy task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CopySpec {
    /// Common options
    #[serde(flatten)]
    pub common: CommonSpec,
}

/// A resolved, typed task configuration, one variant per category.
#[derive(Debug, Clone)]
pub enum TaskSpec {
    /// Stylesheet pipeline
    Sass(SassSpec),
    /// Script pipeline
    Js(JsSpec),
    /// Image pipeline
    Image(ImageSpec),
    /// View pipeline
    View(ViewSpec),
    /// Copy pipeline
    Copy(CopySpec),
}

impl TaskSpec {
    /// Deserialize a resolved record into the typed spec for a category.
    pub fn from_table(category: Category, table: Table) -> Result<TaskSpec, toml::de::Error> {
        let value = toml::Value::Table(table);
        Ok(match category {
            Category::Sass => TaskSpec::Sass(value.try_into()?),
            Category::Js => TaskSpec::Js(value.try_into()?),
            Category::Image => TaskSpec::Image(value.try_into()?),
            Category::View => TaskSpec::View(value.try_into()?),
            Category::Copy => TaskSpec::Copy(value.try_into()?),
        })
    }

    /// The category this spec belongs to.
    pub fn category(&self) -> Category {
        match self {
            TaskSpec::Sass(_) => Category::Sass,
            TaskSpec::Js(_) => Category::Js,
            TaskSpec::Image(_) => Category::Image,
            TaskSpec::View(_) => Category::View,
            TaskSpec::Copy(_) => Category::Copy,
        }
    }

    /// The common options of any variant.
    pub fn common(&self) -> &CommonSpec {
        match self {
            TaskSpec::Sass(s) => &s.common,
            TaskSpec::Js(s) => &s.common,
            TaskSpec::Image(s) => &s.common,
            TaskSpec::View(s) => &s.common,
            TaskSpec::Copy(s) => &s.common,
        }
    }
}

/// Dev server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self { host: "localhost".to_string(), port: 3000 }
    }
}

/// Complete `assetpipe.toml` configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Environment override tables, keyed by environment name
    pub env: BTreeMap<String, Table>,
    /// Global defaults filled into every record
    pub global: Table,
    /// Stylesheet task records
    pub sass: Vec<Table>,
    /// Script task records
    pub js: Vec<Table>,
    /// Image task records
    pub image: Vec<Table>,
    /// View task records
    pub view: Vec<Table>,
    /// Copy task records
    pub copy: Vec<Table>,
    /// Dev server settings
    pub serve: ServeConfig,
}

/// Configuration validation error.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "sass[0].src")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assetpipe.toml: '{}' {}", self.field, self.message)
    }
}

impl RawConfig {
    /// The ordered record array for a category.
    pub fn records(&self, category: Category) -> &[Table] {
        match category {
            Category::Sass => &self.sass,
            Category::Js => &self.js,
            Category::Image => &self.image,
            Category::View => &self.view,
            Category::Copy => &self.copy,
        }
    }

    /// Total number of task records across all categories.
    pub fn record_count(&self) -> usize {
        Category::ALL.iter().map(|c| self.records(*c).len()).sum()
    }

    /// Validate the configuration and return any errors.
    ///
    /// Cascade-dependent requirements (src/dest presence) are checked at
    /// registration, after resolution; this validates what must hold on
    /// the raw tree.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.serve.port == 0 {
            errors.push(ConfigValidationError {
                field: "serve.port".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        for (name, table) in &self.env {
            if name.is_empty() {
                errors.push(ConfigValidationError {
                    field: "env".to_string(),
                    message: "environment names must be non-empty".to_string(),
                });
            }
            if table.is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("env.{}", name),
                    message: "override table is empty".to_string(),
                });
            }
        }

        errors
    }

    /// Check if validation passed.
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
