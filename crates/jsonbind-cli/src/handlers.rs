//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

use crate::cli::{LookupArgs, OutputFormat};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use jsonbind_core::{resolve_any, Environment, Failure, JsonPath, Location, ReadOptions, Value};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Machine-readable result of a lookup
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LookupReport<'a> {
    Defined {
        location: &'a Location,
        value: serde_json::Value,
    },
    Undefined {
        failure: &'a Failure,
    },
}

/// Load read options from an optional file, then apply environment overrides
pub fn load_options(path: Option<&Path>) -> Result<ReadOptions> {
    load_options_with(path, |var| std::env::var(var).ok())
}

fn load_options_with<F>(path: Option<&Path>, lookup: F) -> Result<ReadOptions>
where
    F: Fn(&str) -> Option<String>,
{
    let options = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading read options");
            ReadOptions::load(path)?
        }
        None => ReadOptions::default(),
    };
    Ok(options.apply_overrides(lookup)?)
}

/// Handle the lookup command
pub fn handle_lookup(args: LookupArgs, env: &Environment, output: &mut OutputWriter) -> Result<()> {
    let paths = args
        .paths
        .iter()
        .map(|path| JsonPath::parse(path))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if !args.file.exists() {
        return Err(Error::FileNotFound { path: args.file });
    }
    let content = fs::read_to_string(&args.file)?;
    let tree = Value::parse(&content).map_err(|source| Error::InvalidJson {
        path: args.file.clone(),
        source,
    })?;

    tracing::debug!(file = %args.file.display(), candidates = paths.len(), "Resolving paths");

    match resolve_any(&tree, &Location::root(), &paths) {
        Ok(defined) => {
            let value = defined.value.to_json();
            match output.format() {
                OutputFormat::Human => {
                    output.success(&format!("Found at '{}'", defined.location))?;
                    output.data(&value)?;
                }
                OutputFormat::Json => output.data(&LookupReport::Defined {
                    location: &defined.location,
                    value,
                })?,
            }
            Ok(())
        }
        Err(undefined) => {
            if let Some(failure) = Failure::merge_all(undefined.iter().map(|outcome| outcome.to_failure(env))) {
                match output.format() {
                    OutputFormat::Human => {
                        for cause in failure.causes() {
                            output.error(&cause.to_string())?;
                        }
                    }
                    OutputFormat::Json => output.data(&LookupReport::Undefined { failure: &failure })?,
                }
            }
            Err(Error::Undefined { count: paths.len() })
        }
    }
}

/// Handle the config command
pub fn handle_config(options: &ReadOptions, source: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    match output.format() {
        OutputFormat::Json => output.data(options),
        OutputFormat::Human => {
            let source = source.map_or_else(|| "defaults".to_string(), |path| path.display().to_string());
            output.field("source", &source)?;
            output.field("fail_fast", &options.fail_fast)?;
            output.field("max_depth", &options.max_depth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::capture::Captured;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn document(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("doc.json");
        fs::write(&path, content).unwrap();
        path
    }

    fn lookup(format: OutputFormat, file: PathBuf, paths: &[&str]) -> (Result<()>, String) {
        let captured = Captured::default();
        let mut output = OutputWriter::with_writer(format, false, false, Box::new(captured.clone()));
        let args = LookupArgs {
            file,
            paths: paths.iter().map(|p| p.to_string()).collect(),
        };
        let result = handle_lookup(args, &Environment::default(), &mut output);
        (result, captured.text())
    }

    #[test]
    fn test_lookup_found_by_fallback() {
        let dir = TempDir::new().unwrap();
        let file = document(&dir, r#"{"user": {"name": "Ada"}}"#);
        let (result, text) = lookup(OutputFormat::Human, file, &["$.user.nick", "/user/name"]);
        assert!(result.is_ok());
        assert_eq!(text, "Found at '/user/name'\n\"Ada\"\n");
    }

    #[test]
    fn test_lookup_json_report() {
        let dir = TempDir::new().unwrap();
        let file = document(&dir, r#"{"a": [10, 20]}"#);
        let (result, text) = lookup(OutputFormat::Json, file, &["$.a[1]"]);
        assert!(result.is_ok());
        let report: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(report["status"], "defined");
        assert_eq!(report["location"], "/a/1");
        assert_eq!(report["value"], 20);
    }

    #[test]
    fn test_lookup_reports_every_candidate() {
        let dir = TempDir::new().unwrap();
        let file = document(&dir, r#"{"a": 5}"#);
        let (result, text) = lookup(OutputFormat::Human, file, &["$.a.b", "$.c"]);
        let error = result.unwrap_err();
        assert_eq!(error.exit_code(), 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ERROR: at '/a'"));
        assert_eq!(lines[1], "ERROR: at '/c': Path is missing");
    }

    #[test]
    fn test_lookup_input_errors() {
        let dir = TempDir::new().unwrap();
        let (result, _) = lookup(OutputFormat::Human, dir.path().join("absent.json"), &["$.a"]);
        assert_eq!(result.unwrap_err().exit_code(), 3);

        let file = document(&dir, "{not json");
        let (result, _) = lookup(OutputFormat::Human, file.clone(), &["$.a"]);
        assert_eq!(result.unwrap_err().exit_code(), 4);

        let (result, _) = lookup(OutputFormat::Human, file, &["$.a["]);
        assert_eq!(result.unwrap_err().exit_code(), 2);
    }

    #[test]
    fn test_load_options_file_then_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("options.yaml");
        fs::write(&path, "max_depth: 4\n").unwrap();

        let options = load_options_with(Some(&path), |var| (var == "JSONBIND_MAX_DEPTH").then(|| "9".to_string())).unwrap();
        assert_eq!(options, ReadOptions::default().with_max_depth(9));

        let options = load_options_with(None, |_| None).unwrap();
        assert_eq!(options, ReadOptions::default());

        let error = load_options_with(Some(&dir.path().join("options.ini")), |_| None).unwrap_err();
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_config_output() {
        let captured = Captured::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(captured.clone()));
        handle_config(&ReadOptions::fail_fast(), None, &mut output).unwrap();
        assert_eq!(captured.text(), "{\"fail_fast\":true,\"max_depth\":128}\n");

        let captured = Captured::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, false, Box::new(captured.clone()));
        handle_config(&ReadOptions::default(), None, &mut output).unwrap();
        assert_eq!(captured.text(), "source: defaults\nfail_fast: false\nmax_depth: 128\n");
    }
}
