use std::fs;
use tempfile::TempDir;

use repo_intake::config::{parse_config, Config};
use repo_intake::models::SourceInfo;
use repo_intake::pipeline::ingest_directory;

fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("node_modules/dep")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();

    fs::write(root.join("src/main.rs"), "fn main() {\n    println!(\"hi\");\n}\n").unwrap();
    fs::write(root.join("README.md"), "# Demo\n").unwrap();
    fs::write(root.join("docs/guide.md"), "Guide").unwrap();
    fs::write(root.join("node_modules/dep/index.js"), "module.exports = 1;").unwrap();
    fs::write(root.join(".git/config"), "[core]").unwrap();
    fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G', 0, 0]).unwrap();
    fs::write(root.join("Cargo.lock"), "# lock").unwrap();

    tmp
}

#[test]
fn scans_only_valuable_files() {
    let tmp = setup_project();

    let ingestion = ingest_directory(&Config::default(), tmp.path()).unwrap();
    let paths: Vec<&str> = ingestion.files.iter().map(|f| f.path.as_str()).collect();

    assert_eq!(paths, vec!["README.md", "docs/guide.md", "src/main.rs"]);
    assert_eq!(ingestion.tree, "README.md\ndocs/guide.md\nsrc/main.rs");
    assert!(ingestion.digest.signals.has_docs);
    let SourceInfo::Directory { skipped, .. } = &ingestion.source else {
        panic!("expected directory source, got {:?}", ingestion.source);
    };
    // logo.png and Cargo.lock; pruned directories are never offered.
    assert_eq!(skipped.ignored, 2);
}

#[test]
fn extra_ignored_dirs_from_config_prune_the_walk() {
    let tmp = setup_project();
    let config = parse_config(
        r#"
[filter]
extra_ignored_dirs = ["docs"]
"#,
    )
    .unwrap();

    let ingestion = ingest_directory(&config, tmp.path()).unwrap();
    assert!(ingestion.files.iter().all(|f| !f.path.starts_with("docs/")));
    assert_eq!(ingestion.files.len(), 2);
}

#[test]
fn exclude_globs_reject_matching_files() {
    let tmp = setup_project();
    let config = parse_config(
        r#"
[filter]
exclude_globs = ["**/*.md"]
"#,
    )
    .unwrap();

    let ingestion = ingest_directory(&config, tmp.path()).unwrap();
    let paths: Vec<&str> = ingestion.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/main.rs"]);
}

#[test]
fn preview_is_bounded_by_config() {
    let tmp = TempDir::new().unwrap();
    let body: String = (1..=10).map(|i| format!("line {}\n", i)).collect();
    fs::write(tmp.path().join("notes.txt"), &body).unwrap();

    let config = parse_config("[preview]\nlines = 3\n").unwrap();
    let ingestion = ingest_directory(&config, tmp.path()).unwrap();

    assert_eq!(ingestion.files[0].preview, "line 1\nline 2\nline 3");
    assert_eq!(ingestion.files[0].content, body);
}
