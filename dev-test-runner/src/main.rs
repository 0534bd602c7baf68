//! Golden-file runner: compile every `fixtures/<case>/schema.json` and compare
//! with the committed `expected.gbnf` / `expected.txt` snapshots.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use fncall_grammar::{Grammar, path_de, render_documentation};

#[derive(Parser, Debug)]
struct Settings {
    /// directory holding one sub-directory per case
    #[arg(long, default_value = "fixtures")]
    fixtures: PathBuf,

    /// rewrite the snapshots instead of comparing
    #[arg(long)]
    bless: bool,
}

struct Outcome {
    case: String,
    mismatches: Vec<String>,
}

fn main() -> ExitCode {
    let settings = Settings::parse();
    match run(&settings) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<bool> {
    let mut cases = std::fs::read_dir(&settings.fixtures)
        .with_context(|| format!("failed to list {}", settings.fixtures.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.join("schema.json").is_file())
        .collect::<Vec<_>>();
    cases.sort();

    let mut all_passed = true;
    for case in &cases {
        let outcome = check_case(case, settings.bless)?;
        if outcome.mismatches.is_empty() {
            eprintln!("✅ {}", outcome.case.green());
        } else {
            all_passed = false;
            eprintln!("❌ {}", outcome.case.red());
            for mismatch in &outcome.mismatches {
                eprintln!("   {mismatch}");
            }
        }
    }
    eprintln!("{} case(s) checked", cases.len());
    Ok(all_passed)
}

fn check_case(dir: &Path, bless: bool) -> Result<Outcome> {
    let case = dir
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let source = std::fs::read_to_string(dir.join("schema.json"))
        .with_context(|| format!("failed to read schema for {case}"))?;
    let document = path_de::from_str_with_path::<serde_json::Value>(&source)
        .with_context(|| format!("invalid JSON in {case}"))?;
    let functions = path_de::functions_from_value(document)
        .with_context(|| format!("invalid schema in {case}"))?;

    let grammar = Grammar::compile(&functions).with_context(|| format!("failed to compile {case}"))?;
    let actual = [
        ("expected.gbnf", format!("{}\n", grammar.render())),
        ("expected.txt", render_documentation(&functions)),
    ];

    let mut mismatches = Vec::new();
    for (file, text) in actual {
        let path = dir.join(file);
        if bless {
            std::fs::write(&path, &text).with_context(|| format!("failed to write {}", path.display()))?;
            continue;
        }
        let expected = std::fs::read_to_string(&path).unwrap_or_default();
        if let Some(diff) = first_difference(&expected, &text) {
            mismatches.push(format!("{file}: {diff}"));
        }
    }
    Ok(Outcome { case, mismatches })
}

/// First differing line, 1-based, or `None` when the texts are identical.
fn first_difference(expected: &str, actual: &str) -> Option<String> {
    if expected == actual {
        return None;
    }
    let mut expected_lines = expected.split('\n');
    let mut actual_lines = actual.split('\n');
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(e), Some(a)) if e == a => line += 1,
            (e, a) => {
                return Some(format!(
                    "line {line}\n     expected: {}\n     actual:   {}",
                    e.unwrap_or("<eof>"),
                    a.unwrap_or("<eof>")
                ));
            }
        }
    }
}
