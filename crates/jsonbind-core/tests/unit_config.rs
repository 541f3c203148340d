//! Unit tests for loading read options from files

use jsonbind_core::{ConfigError, ReadOptions, DEFAULT_MAX_DEPTH};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_each_format() {
    let dir = TempDir::new().unwrap();
    let expected = ReadOptions::fail_fast().with_max_depth(16);

    let json = write(&dir, "options.json", r#"{"fail_fast": true, "max_depth": 16}"#);
    assert_eq!(ReadOptions::load(&json).unwrap(), expected);

    let yaml = write(&dir, "options.yaml", "fail_fast: true\nmax_depth: 16\n");
    assert_eq!(ReadOptions::load(&yaml).unwrap(), expected);

    let yml = write(&dir, "options.YML", "fail_fast: true\nmax_depth: 16\n");
    assert_eq!(ReadOptions::load(&yml).unwrap(), expected);

    let toml = write(&dir, "options.toml", "fail_fast = true\nmax_depth = 16\n");
    assert_eq!(ReadOptions::load(&toml).unwrap(), expected);
}

#[test]
fn test_missing_keys_use_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "options.toml", "fail_fast = true\n");
    let options = ReadOptions::load(&path).unwrap();
    assert!(options.fail_fast);
    assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("absent.json");
    assert!(matches!(ReadOptions::load(&missing), Err(ConfigError::Io { .. })));

    let unsupported = write(&dir, "options.ini", "fail_fast=true");
    assert!(matches!(
        ReadOptions::load(&unsupported),
        Err(ConfigError::UnsupportedFormat { .. })
    ));

    let broken = write(&dir, "options.json", "{\"fail_fast\": ");
    match ReadOptions::load(&broken) {
        Err(ConfigError::Parse { format, .. }) => assert_eq!(format, "JSON"),
        other => panic!("expected parse error, got {:?}", other),
    }

    let wrong_type = write(&dir, "options.yaml", "max_depth: deep\n");
    assert!(matches!(ReadOptions::load(&wrong_type), Err(ConfigError::Parse { format: "YAML", .. })));
}

#[test]
fn test_overrides_after_load() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "options.json", r#"{"max_depth": 8}"#);
    let options = ReadOptions::load(&path)
        .unwrap()
        .apply_overrides(|var| (var == "JSONBIND_FAIL_FAST").then(|| "yes".to_string()))
        .unwrap();
    assert_eq!(options, ReadOptions::fail_fast().with_max_depth(8));
}
