use std::path::{Component, Path};

use anyhow::Context;
use tower_lsp::lsp_types::DiagnosticSeverity;

use super::analysis::parse_diagnostics;

/// One-shot analysis mode: `taskflow-lsp --analyze [--errors-only] <file>`.
/// Returns `Ok(None)` when no CLI flags are present and the process should
/// start serving LSP instead.
pub(crate) fn try_cli_analyze() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() <= 1 {
        return Ok(None);
    }

    let Some(i) = args.iter().position(|a| a == "--analyze") else {
        return Ok(None);
    };

    let mut path_index = i + 1;
    while path_index < args.len() && args[path_index].starts_with("--") {
        path_index += 1;
    }
    let path = args.get(path_index).cloned().ok_or_else(|| {
        anyhow::anyhow!(
            "Usage: taskflow-lsp --analyze [--errors-only] <relative-file-path>\n  --analyze <file>     : Structural analysis with JSON output\n  --errors-only        : Show only errors in simple format"
        )
    })?;

    let errors_only = args.iter().any(|a| a == "--errors-only");
    let content = read_file_content(&path)?;
    let diagnostics = parse_diagnostics(&content);

    if errors_only {
        let errors: Vec<String> = diagnostics
            .iter()
            .filter(|d| d.severity == Some(DiagnosticSeverity::ERROR))
            .map(|d| {
                format!(
                    "Line {}:{}: {}",
                    d.range.start.line + 1,
                    d.range.start.character + 1,
                    d.message
                )
            })
            .collect();
        if errors.is_empty() {
            return Ok(Some("No errors found".to_string()));
        }
        return Ok(Some(errors.join("\n")));
    }

    let tasks = taskflow_core::facts::task_keys(&content, None);
    let output = serde_json::json!({
        "diagnostics": diagnostics,
        "tasks": tasks,
    });
    Ok(Some(serde_json::to_string_pretty(&output)?))
}

pub(crate) fn is_safe_path(path: &str) -> bool {
    let path = Path::new(path);

    if path.as_os_str().is_empty() {
        return false;
    }
    if path.is_absolute() {
        return false;
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return false;
    }

    let s = path.to_string_lossy();
    if s.chars().any(|c| matches!(c, '\0' | '\n' | '\r' | '\t')) {
        return false;
    }
    // reject drive-prefixed paths that slip past is_absolute on unix
    if s.as_bytes().get(1) == Some(&b':') {
        return false;
    }
    true
}

pub(crate) fn read_file_content(path: &str) -> anyhow::Result<String> {
    if !is_safe_path(path) {
        return Err(anyhow::anyhow!("Unsafe file path: {}", path));
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))
}
