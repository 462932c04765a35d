//! Facade over the external structural parser.
//!
//! The parser itself is a collaborator, not something this crate builds: full
//! text goes in, a structured task list or a positioned error comes out.
//! Callers hand mid-edit buffers through [`crate::repair`] first.

use serde_yaml::Value;

/// A positioned failure from the structural parser. Line and character are
/// zero-based; when the parser reports no location the issue points at the
/// start of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub message: String,
    pub line: u32,
    pub character: u32,
}

/// Structured view of a workflow document, as far as the parser can see one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowDocument {
    pub tasks: Vec<TaskEntry>,
}

/// One entry of the top-level task list. `key` is `None` when the entry has
/// no string-valued `key` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEntry {
    pub key: Option<String>,
}

/// Run the document through the structural parser.
pub fn parse_document(text: &str) -> Result<FlowDocument, ParseIssue> {
    let value: Value = serde_yaml::from_str(text).map_err(|err| {
        let (line, character) = err
            .location()
            .map(|loc| {
                (
                    loc.line().saturating_sub(1) as u32,
                    loc.column().saturating_sub(1) as u32,
                )
            })
            .unwrap_or((0, 0));
        ParseIssue {
            message: err.to_string(),
            line,
            character,
        }
    })?;

    let mut doc = FlowDocument::default();
    let Value::Mapping(map) = value else {
        return Ok(doc);
    };
    for (k, v) in &map {
        if k.as_str() != Some("tasks") {
            continue;
        }
        let Value::Sequence(items) = v else {
            continue;
        };
        for item in items {
            let key = item
                .as_mapping()
                .and_then(|m| m.iter().find(|(k, _)| k.as_str() == Some("key")))
                .and_then(|(_, v)| v.as_str())
                .map(str::to_string);
            doc.tasks.push(TaskEntry { key });
        }
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_task_keys_in_order() {
        let text = "tasks:\n  - key: build\n    run: a\n  - key: test\n    use: build\n";
        let doc = parse_document(text).unwrap();
        let keys: Vec<_> = doc.tasks.iter().filter_map(|t| t.key.as_deref()).collect();
        assert_eq!(keys, ["build", "test"]);
    }

    #[test]
    fn entries_without_string_keys_stay_keyless() {
        let text = "tasks:\n  - run: a\n  - key: 7\n  - key: ok\n";
        let doc = parse_document(text).unwrap();
        assert_eq!(doc.tasks.len(), 3);
        assert_eq!(doc.tasks[0].key, None);
        assert_eq!(doc.tasks[1].key, None);
        assert_eq!(doc.tasks[2].key.as_deref(), Some("ok"));
    }

    #[test]
    fn aliases_resolve_through_the_parser() {
        let text = "defaults: &base\n  run: a\ntasks:\n  - key: one\n    env: *base\n";
        assert!(parse_document(text).is_ok());
    }

    #[test]
    fn broken_yaml_reports_a_position() {
        let text = "tasks:\n  - key: [oops\n";
        let issue = parse_document(text).unwrap_err();
        assert!(!issue.message.is_empty());
        assert!(issue.line >= 1);
    }

    #[test]
    fn non_mapping_documents_yield_empty_task_lists() {
        assert_eq!(parse_document("- a\n- b\n").unwrap().tasks.len(), 0);
        assert_eq!(parse_document("").unwrap().tasks.len(), 0);
    }
}
