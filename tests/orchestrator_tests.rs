//! Orchestrator integration tests.
//!
//! End-to-end scenarios over real temp directories: configuration load,
//! cascade resolution, task registration, selection, and full pipeline
//! runs writing to a destination tree.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use assetpipe::config::{load_config, Category, RawConfig, CONFIG_FILE};
use assetpipe::outputs::OutputRegistry;
use assetpipe::registry::TaskSet;
use assetpipe::runner::{RunOptions, Runner, Selection, TaskStatus};

// ============================================================================
// Test Utilities
// ============================================================================

/// Create a file under the project root, creating parent directories.
fn create_test_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Write an `assetpipe.toml` and load it back through the loader.
fn project_with_config(toml: &str) -> (TempDir, RawConfig) {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), CONFIG_FILE, toml);
    let loaded = load_config(Some(&temp.path().join(CONFIG_FILE))).unwrap();
    assert_eq!(loaded.root, temp.path());
    (temp, loaded.raw)
}

fn run_all(temp: &TempDir, raw: &RawConfig) -> (OutputRegistry, bool) {
    run_selected(temp, raw, Selection::all())
}

fn run_selected(temp: &TempDir, raw: &RawConfig, selection: Selection) -> (OutputRegistry, bool) {
    let tasks = TaskSet::register(raw, None).unwrap();
    let runner = Runner::new(&tasks, RunOptions::new(temp.path()));
    let mut outputs = OutputRegistry::new();
    let result = runner.run_build(&selection, &mut outputs);
    (outputs, result.is_success())
}

// ============================================================================
// Copy and selection
// ============================================================================

#[test]
fn test_copy_task_mirrors_tree_verbatim() {
    let (temp, raw) = project_with_config(
        r#"
[[copy]]
src = "static/**/*"
dest = "dist"
"#,
    );
    create_test_file(temp.path(), "static/robots.txt", "User-agent: *\n");
    create_test_file(temp.path(), "static/fonts/a.woff2", "binaryish");

    let (_outputs, ok) = run_all(&temp, &raw);
    assert!(ok);
    assert_eq!(
        fs::read_to_string(temp.path().join("dist/robots.txt")).unwrap(),
        "User-agent: *\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("dist/fonts/a.woff2")).unwrap(),
        "binaryish"
    );
}

#[test]
fn test_category_filter_runs_only_matching_tasks() {
    let (temp, raw) = project_with_config(
        r#"
[[js]]
src = "js/app/*.js"
dest = "dist/js"

[[js]]
src = "js/vendor/*.js"
dest = "dist/vendor"

[[copy]]
src = "static/*"
dest = "dist"
"#,
    );
    create_test_file(temp.path(), "js/app/main.js", "run();");
    create_test_file(temp.path(), "js/vendor/lib.js", "lib();");
    create_test_file(temp.path(), "static/a.txt", "a");

    let (outputs, ok) = run_selected(&temp, &raw, Selection::categories(vec![Category::Js]));
    assert!(ok);
    assert!(temp.path().join("dist/js/main.js").exists());
    assert!(temp.path().join("dist/vendor/lib.js").exists());
    assert!(!temp.path().join("dist/a.txt").exists());
    assert!(outputs.get(Category::Copy, 0).is_none());
}

#[test]
fn test_filter_matching_nothing_falls_back_to_all_tasks() {
    let (temp, raw) = project_with_config(
        r#"
[[copy]]
src = "static/*"
dest = "dist"
"#,
    );
    create_test_file(temp.path(), "static/a.txt", "a");

    // No image tasks exist; the filter must not turn the run into a no-op.
    let (_outputs, ok) = run_selected(&temp, &raw, Selection::categories(vec![Category::Image]));
    assert!(ok);
    assert!(temp.path().join("dist/a.txt").exists());
}

// ============================================================================
// Stylesheet pipeline
// ============================================================================

#[test]
fn test_sass_concat_minify_produces_single_min_file() {
    let (temp, raw) = project_with_config(
        r#"
[[sass]]
src = "scss/*.scss"
dest = "dist/css"
concat = "style.css"
minify = true
"#,
    );
    create_test_file(temp.path(), "scss/a.scss", ".a { color: red; }\n");
    create_test_file(temp.path(), "scss/b.scss", ".b { color: blue; }\n");

    let (outputs, ok) = run_all(&temp, &raw);
    assert!(ok);

    let out = temp.path().join("dist/css/style.min.css");
    assert!(out.exists());
    let css = fs::read_to_string(&out).unwrap();
    assert!(css.contains(".a"));
    assert!(css.contains(".b"));
    // Inputs must not be written individually.
    assert!(!temp.path().join("dist/css/a.css").exists());
    assert_eq!(outputs.get(Category::Sass, 0).unwrap().paths, vec![out]);
}

#[test]
fn test_invalid_stylesheet_fails_its_task_only() {
    let (temp, raw) = project_with_config(
        r#"
[[sass]]
src = "scss/*.scss"
dest = "dist/css"

[[copy]]
src = "static/*"
dest = "dist"
"#,
    );
    create_test_file(temp.path(), "scss/bad.scss", "..a { color: red }\n");
    create_test_file(temp.path(), "static/ok.txt", "fine");

    let tasks = TaskSet::register(&raw, None).unwrap();
    let runner = Runner::new(&tasks, RunOptions::new(temp.path()));
    let mut outputs = OutputRegistry::new();
    let result = runner.run_build(&Selection::all(), &mut outputs);

    assert!(!result.is_success());
    assert_eq!(result.failed_count(), 1);
    assert!(matches!(result.tasks[0].status, TaskStatus::Failed(_)));
    assert!(temp.path().join("dist/ok.txt").exists());
}

// ============================================================================
// Cascade and environments
// ============================================================================

#[test]
fn test_global_fills_missing_record_keys() {
    let (temp, raw) = project_with_config(
        r#"
[global]
dest = "dist"

[[copy]]
src = "static/*"

[[copy]]
src = "extra/*"
dest = "elsewhere"
"#,
    );
    create_test_file(temp.path(), "static/a.txt", "a");
    create_test_file(temp.path(), "extra/b.txt", "b");

    let (_outputs, ok) = run_all(&temp, &raw);
    assert!(ok);
    assert!(temp.path().join("dist/a.txt").exists());
    // An authored dest must win over the global one.
    assert!(temp.path().join("elsewhere/b.txt").exists());
    assert!(!temp.path().join("dist/b.txt").exists());
}

#[test]
fn test_env_profile_forces_deletion() {
    let (temp, raw) = project_with_config(
        r#"
[env.prod]
delete = true

[[copy]]
src = "static/*"
dest = "dist"
"#,
    );
    create_test_file(temp.path(), "static/a.txt", "fresh");
    create_test_file(temp.path(), "dist/stale.txt", "stale");

    let tasks = TaskSet::register(&raw, Some("prod")).unwrap();
    let runner = Runner::new(&tasks, RunOptions::new(temp.path()));
    let mut outputs = OutputRegistry::new();
    let result = runner.run_build(&Selection::all(), &mut outputs);

    assert!(result.is_success());
    assert!(!temp.path().join("dist/stale.txt").exists());
    assert!(temp.path().join("dist/a.txt").exists());
}

#[test]
fn test_deletion_precedes_write() {
    let (temp, raw) = project_with_config(
        r#"
[[copy]]
src = "static/*"
dest = "dist"
delete = true
"#,
    );
    create_test_file(temp.path(), "static/a.txt", "new");
    create_test_file(temp.path(), "dist/a.txt", "old");
    create_test_file(temp.path(), "dist/leftover.txt", "old");

    let (_outputs, ok) = run_all(&temp, &raw);
    assert!(ok);
    assert_eq!(fs::read_to_string(temp.path().join("dist/a.txt")).unwrap(), "new");
    assert!(!temp.path().join("dist/leftover.txt").exists());
}

#[test]
fn test_no_delete_keeps_stale_outputs() {
    let (temp, raw) = project_with_config(
        r#"
[[copy]]
src = "static/*"
dest = "dist"
delete = true
"#,
    );
    create_test_file(temp.path(), "static/a.txt", "new");
    create_test_file(temp.path(), "dist/leftover.txt", "old");

    let tasks = TaskSet::register(&raw, None).unwrap();
    let mut options = RunOptions::new(temp.path());
    options.no_delete = true;
    let runner = Runner::new(&tasks, options);
    let mut outputs = OutputRegistry::new();
    let result = runner.run_build(&Selection::all(), &mut outputs);

    assert!(result.is_success());
    assert!(temp.path().join("dist/leftover.txt").exists());
    assert!(temp.path().join("dist/a.txt").exists());
}

// ============================================================================
// View pipeline
// ============================================================================

#[test]
fn test_view_include_and_rename_writes_both_outputs() {
    let (temp, raw) = project_with_config(
        r#"
[[view]]
src = "views/*.html"
dest = "dist"
rename = true
rename_options = { extname = ".php" }

[view.file_include]
base_path = "partials"
"#,
    );
    create_test_file(temp.path(), "partials/head.html", "<head><title>t</title></head>");
    create_test_file(
        temp.path(),
        "views/index.html",
        "<html>@@include('head.html')<body></body></html>",
    );

    let (_outputs, ok) = run_all(&temp, &raw);
    assert!(ok);

    let html = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
    assert!(html.contains("<title>t</title>"));
    let php = fs::read_to_string(temp.path().join("dist/index.php")).unwrap();
    assert_eq!(html, php);
}

#[test]
fn test_view_localization_expands_per_locale() {
    let (temp, raw) = project_with_config(
        r#"
[[view]]
src = "views/*.html"
dest = "dist"

[view.localize]
locales = ["en", "fr"]
"#,
    );
    create_test_file(temp.path(), "locales/en.json", r#"{"greet": "Hello"}"#);
    create_test_file(temp.path(), "locales/fr.json", r#"{"greet": "Bonjour"}"#);
    create_test_file(temp.path(), "views/index.html", "<h1>${{ greet }}$</h1>");

    let (_outputs, ok) = run_all(&temp, &raw);
    assert!(ok);
    assert_eq!(
        fs::read_to_string(temp.path().join("dist/en/index.html")).unwrap(),
        "<h1>Hello</h1>"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("dist/fr/index.html")).unwrap(),
        "<h1>Bonjour</h1>"
    );
}

// ============================================================================
// Script pipeline
// ============================================================================

#[test]
fn test_js_strip_debug_concat_minify() {
    let (temp, raw) = project_with_config(
        r#"
[[js]]
src = "js/*.js"
dest = "dist/js"
strip_debug = true
concat = "app.js"
minify = true
"#,
    );
    create_test_file(temp.path(), "js/a.js", "let a = 1;\nconsole.log(a);\n");
    create_test_file(temp.path(), "js/b.js", "// header\nlet b = 2;\n");

    let (_outputs, ok) = run_all(&temp, &raw);
    assert!(ok);

    let out = fs::read_to_string(temp.path().join("dist/js/app.min.js")).unwrap();
    assert!(out.contains("let a = 1;"));
    assert!(out.contains("let b = 2;"));
    assert!(!out.contains("console.log"));
    assert!(!out.contains("header"));
}

// ============================================================================
// Registration errors
// ============================================================================

#[test]
fn test_unknown_env_fails_registration() {
    let (_temp, raw) = project_with_config(
        r#"
[env.prod]
minify = true

[[copy]]
src = "a/*"
dest = "b"
"#,
    );
    assert!(TaskSet::register(&raw, Some("qa")).is_err());
}

#[test]
fn test_record_without_dest_fails_registration() {
    let (_temp, raw) = project_with_config("[[copy]]\nsrc = \"a/*\"");
    assert!(TaskSet::register(&raw, None).is_err());
}
