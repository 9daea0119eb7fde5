//! Golden-file runner: generates tests for every `tests/fixtures/<case>/`
//! directory and diffs the result against its `expected_test.go`.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use handler_testgen::config::{Config, UnknownTypePolicy};
use handler_testgen::render::Template;

/// Per-fixture `config.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FixtureConfig {
    request_types: Vec<String>,
    response_types: Vec<String>,
    jq_expr: Option<String>,
    strict_types: bool,
}

static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

fn normalize(src: &str) -> String {
    let src = TRAILING_WS.replace_all(src, "");
    BLANK_LINES.replace_all(&src, "\n").trim().to_string()
}

fn fixtures_root() -> PathBuf {
    match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("tests").join("fixtures"),
    }
}

fn run_case(dir: &Path) -> Result<(), String> {
    let config_src = std::fs::read_to_string(dir.join("config.json")).unwrap_or_else(|_| "{}".to_string());
    let fixture: FixtureConfig = serde_json::from_str(&config_src).map_err(|e| format!("config.json: {e}"))?;

    let name = dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let output = std::env::temp_dir().join(format!("testgen-fixture-{name}_test.go"));
    let config = Config {
        input_file: dir.join("handler.go"),
        output_file: output.clone(),
        test_cases: vec![dir.join("testcases.json").display().to_string()],
        request_types: fixture.request_types,
        response_types: fixture.response_types,
        template: None,
        jq_expr: fixture.jq_expr,
        unknown_types: if fixture.strict_types { UnknownTypePolicy::Fail } else { UnknownTypePolicy::Warn },
    };
    handler_testgen::pipeline::run(&config, &Template::builtin()).map_err(|e| e.to_string())?;

    let expected = std::fs::read_to_string(dir.join("expected_test.go"))
        .map_err(|e| format!("expected_test.go: {e}"))?;
    let actual = std::fs::read_to_string(&output).map_err(|e| format!("{}: {e}", output.display()))?;
    let _ = std::fs::remove_file(&output);

    let (expected, actual) = (normalize(&expected), normalize(&actual));
    if expected == actual {
        return Ok(());
    }
    let first_diff = expected
        .lines()
        .zip(actual.lines())
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.lines().count().min(actual.lines().count()));
    let expected_line = expected.lines().nth(first_diff).unwrap_or("<eof>");
    let actual_line = actual.lines().nth(first_diff).unwrap_or("<eof>");
    Err(format!(
        "output differs at normalized line {}\n    expected: {expected_line}\n    actual:   {actual_line}",
        first_diff + 1
    ))
}

fn main() -> ExitCode {
    let root = fixtures_root();
    let mut cases = match std::fs::read_dir(&root) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.join("handler.go").is_file())
            .collect::<Vec<_>>(),
        Err(error) => {
            eprintln!("{} {}: {error}", "❌ cannot read".red(), root.display());
            return ExitCode::FAILURE;
        }
    };
    cases.sort();

    let mut failed = 0usize;
    for dir in &cases {
        let name = dir.file_name().unwrap_or_default().to_string_lossy();
        match run_case(dir) {
            Ok(()) => eprintln!("{} {name}", "✅ pass".green()),
            Err(message) => {
                failed += 1;
                eprintln!("{} {name}: {message}", "❌ fail".red());
            }
        }
    }

    let summary = format!("{} fixtures, {} failed", cases.len(), failed);
    if failed == 0 {
        eprintln!("{}", summary.green().bold());
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", summary.red().bold());
        ExitCode::FAILURE
    }
}
