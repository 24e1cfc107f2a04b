//! Nested checkbox task lists
//!
//! ```text
//! - [X] feat: add parser
//!   implementation notes
//!   - [ ] subtask one
//!   - [X] subtask two
//! ```
//!
//! Each level is indented two spaces deeper than its parent. Lines between a
//! task and its first nested checkbox form the task body. Text that follows
//! the subtasks at their own indent is added to the last subtask's body.

use std::sync::LazyLock;

use proman_core::commit::{ConventionalMessage, MessageParser};
use proman_core::error::ProtocolError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

static CHECKBOX_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \[([ xX])\](?: (.*))?$").expect("Invalid regex"));

const INDENT: usize = 2;

/// Summary line of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSummary {
    /// Top-level summary in conventional commit form, with the line as written
    Commit {
        raw: String,
        message: ConventionalMessage,
    },
    /// Free text
    Text(String),
}

impl TaskSummary {
    /// Conventional summary rendered from `message`
    pub fn from_message(message: ConventionalMessage) -> Self {
        Self::Commit {
            raw: message.summary(),
            message,
        }
    }

    /// Summary as written in the document
    pub fn text(&self) -> &str {
        match self {
            Self::Commit { raw, .. } => raw,
            Self::Text(text) => text,
        }
    }
}

/// One task and its subtasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Checked explicitly, or every subtask is complete
    pub complete: bool,
    pub summary: TaskSummary,
    /// Body text, dedented to the task's content column
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskEntry>,
}

impl TaskEntry {
    /// Create a task without body or subtasks
    pub fn new(summary: TaskSummary, complete: bool) -> Self {
        Self {
            complete,
            summary,
            body: String::new(),
            subtasks: Vec::new(),
        }
    }

    /// The conventional commit message of the summary, if any
    pub fn commit(&self) -> Option<&ConventionalMessage> {
        match &self.summary {
            TaskSummary::Commit { message, .. } => Some(message),
            TaskSummary::Text(_) => None,
        }
    }
}

struct Line<'a> {
    number: usize,
    indent: usize,
    raw: &'a str,
}

impl<'a> Line<'a> {
    fn new(number: usize, raw: &'a str) -> Self {
        let raw = raw.trim_end();
        let indent = raw.len() - raw.trim_start().len();
        Self { number, indent, raw }
    }

    fn is_blank(&self) -> bool {
        self.raw.is_empty()
    }

    fn content(&self) -> &'a str {
        &self.raw[self.indent..]
    }

    fn checkbox(&self) -> Option<(bool, &'a str)> {
        let caps = CHECKBOX_LINE.captures(self.content())?;
        let checked = caps.get(1).is_some_and(|m| m.as_str() != " ");
        let summary = caps.get(2).map_or("", |m| m.as_str());
        Some((checked, summary))
    }
}

/// Parse a task list.
///
/// Top-level summaries are handed to `parser`; those it does not recognize
/// stay plain text. Nested summaries are always plain text.
pub fn parse(text: &str, parser: &dyn MessageParser) -> Result<Vec<TaskEntry>, ProtocolError> {
    let lines: Vec<Line<'_>> = text
        .lines()
        .enumerate()
        .map(|(i, raw)| Line::new(i + 1, raw))
        .collect();
    let entries = parse_level(&lines, Some(parser))?;
    debug!(count = entries.len(), "parsed tasklist");
    Ok(entries)
}

fn parse_level(
    lines: &[Line<'_>],
    parser: Option<&dyn MessageParser>,
) -> Result<Vec<TaskEntry>, ProtocolError> {
    let Some(level) = lines.iter().find(|l| !l.is_blank()).map(|l| l.indent) else {
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        if line.is_blank() {
            i += 1;
            continue;
        }

        let (checked, summary) = match line.checkbox() {
            Some(checkbox) if line.indent == level => checkbox,
            Some(_) => {
                return Err(ProtocolError::MalformedTasklist {
                    line: line.number,
                    reason: format!(
                        "checkbox indented {} columns, expected {}",
                        line.indent, level
                    ),
                })
            }
            None => match entries.last_mut() {
                Some(previous) => {
                    append_body(previous, line, level);
                    i += 1;
                    continue;
                }
                None => {
                    return Err(ProtocolError::MalformedTasklist {
                        line: line.number,
                        reason: "expected a checkbox item".to_string(),
                    })
                }
            },
        };

        let mut end = i + 1;
        while end < lines.len() && (lines[end].is_blank() || lines[end].indent > level) {
            end += 1;
        }
        let block = &lines[i + 1..end];
        let split = block
            .iter()
            .position(|l| l.checkbox().is_some())
            .unwrap_or(block.len());

        let body = render_body(&block[..split], level);
        let subtasks = parse_level(&block[split..], None)?;
        let complete = checked || (!subtasks.is_empty() && subtasks.iter().all(|t| t.complete));

        let summary = match parser.and_then(|p| p.parse_message(summary)) {
            Some(message) => TaskSummary::Commit {
                raw: summary.to_string(),
                message,
            },
            None => TaskSummary::Text(summary.to_string()),
        };

        entries.push(TaskEntry {
            complete,
            summary,
            body,
            subtasks,
        });
        i = end;
    }

    Ok(entries)
}

/// Text after a task's subtasks, back at the task's own indent
fn append_body(entry: &mut TaskEntry, line: &Line<'_>, level: usize) {
    if !entry.body.is_empty() {
        entry.body.push('\n');
    }
    entry.body.push_str(&line.raw[line.indent.min(level + INDENT)..]);
}

fn render_body(lines: &[Line<'_>], level: usize) -> String {
    let strip = level + INDENT;
    let body: Vec<&str> = lines
        .iter()
        .map(|l| {
            if l.is_blank() {
                ""
            } else {
                &l.raw[l.indent.min(strip)..]
            }
        })
        .collect();

    let first = body.iter().position(|l| !l.is_empty()).unwrap_or(body.len());
    let last = body.iter().rposition(|l| !l.is_empty()).map_or(first, |p| p + 1);
    body[first..last].join("\n")
}

/// Render tasks as checkbox markdown, one line per task or body line
pub fn serialize(entries: &[TaskEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        write_entry(&mut out, entry, 0);
    }
    out
}

fn write_entry(out: &mut String, entry: &TaskEntry, indent: usize) {
    let pad = " ".repeat(indent);
    let mark = if entry.complete { 'X' } else { ' ' };
    let summary = entry.summary.text();

    out.push_str(&pad);
    out.push_str("- [");
    out.push(mark);
    out.push(']');
    if !summary.is_empty() {
        out.push(' ');
        out.push_str(summary);
    }
    out.push('\n');

    let body_pad = " ".repeat(indent + INDENT);
    for line in entry.body.lines() {
        if !line.is_empty() {
            out.push_str(&body_pad);
            out.push_str(line);
        }
        out.push('\n');
    }

    for sub in &entry.subtasks {
        write_entry(out, sub, indent + INDENT);
    }
}

/// Mark every incomplete top-level task whose summary equals `summary`
/// complete; returns how many changed
pub fn mark_complete(entries: &mut [TaskEntry], summary: &str) -> usize {
    let mut changed = 0;
    for entry in entries.iter_mut().filter(|e| !e.complete) {
        if entry.summary.text() == summary {
            entry.complete = true;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `type: description` and `type(scope): description`
    struct HeaderParser;

    impl MessageParser for HeaderParser {
        fn parse_message(&self, message: &str) -> Option<ConventionalMessage> {
            let (head, description) = message.split_once(": ")?;
            let (commit_type, scope) = match head.split_once('(') {
                Some((t, rest)) => (t, Some(rest.strip_suffix(')')?)),
                None => (head, None),
            };
            if commit_type.is_empty() || !commit_type.chars().all(|c| c.is_ascii_alphabetic()) {
                return None;
            }
            let mut msg = ConventionalMessage::new(commit_type, description);
            msg.scope = scope.map(str::to_string);
            Some(msg)
        }
    }

    /// Lowercases the type and trims the description
    struct NormalizingParser;

    impl MessageParser for NormalizingParser {
        fn parse_message(&self, message: &str) -> Option<ConventionalMessage> {
            let (head, description) = message.split_once(':')?;
            if head.is_empty() || !head.chars().all(|c| c.is_ascii_alphabetic()) {
                return None;
            }
            Some(ConventionalMessage::new(
                head.to_lowercase(),
                description.trim(),
            ))
        }
    }

    const NESTED: &str = "- [X] feat: add parser\n  implementation notes\n  - [ ] subtask one\n  - [X] subtask two\n";

    #[test]
    fn test_parse_nested() {
        let entries = parse(NESTED, &HeaderParser).unwrap();
        assert_eq!(entries.len(), 1);

        let top = &entries[0];
        assert!(top.complete);
        assert_eq!(top.commit().map(|c| c.commit_type.as_str()), Some("feat"));
        assert_eq!(top.body, "implementation notes");
        assert_eq!(top.subtasks.len(), 2);
        assert!(!top.subtasks[0].complete);
        assert!(top.subtasks[1].complete);
        assert_eq!(top.subtasks[1].summary, TaskSummary::Text("subtask two".to_string()));
    }

    #[test]
    fn test_completion_propagates_upwards() {
        let text = "- [ ] fix: tabs\n  - [x] one\n  - [X] two\n- [ ] docs: readme\n  - [X] one\n  - [ ] two\n";
        let entries = parse(text, &HeaderParser).unwrap();
        assert!(entries[0].complete);
        assert!(!entries[1].complete);
    }

    #[test]
    fn test_non_conventional_summary_is_text() {
        let entries = parse("- [ ] Write the announcement\n", &HeaderParser).unwrap();
        assert_eq!(
            entries[0].summary,
            TaskSummary::Text("Write the announcement".to_string())
        );
        assert!(entries[0].commit().is_none());
    }

    #[test]
    fn test_round_trip() {
        let text = "- [ ] feat(cli): add flag\n  first line\n\n    indented detail\n  - [ ] sub a\n    sub body\n    - [X] deep\n- [X] chore: tidy\n- [ ]\n";
        let entries = parse(text, &HeaderParser).unwrap();
        let rendered = serialize(&entries);
        let reparsed = parse(&rendered, &HeaderParser).unwrap();
        assert_eq!(reparsed, entries);

        assert_eq!(entries[0].body, "first line\n\n  indented detail");
        assert!(entries[0].subtasks[0].complete);
        assert_eq!(entries[2].summary, TaskSummary::Text(String::new()));
    }

    #[test]
    fn test_serialize_format() {
        let entries = parse(NESTED, &HeaderParser).unwrap();
        assert_eq!(serialize(&entries), NESTED);
    }

    #[test]
    fn test_malformed_input() {
        let err = parse("intro text\n- [ ] feat: x\n", &HeaderParser).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedTasklist { line: 1, .. }));

        let err = parse("- [ ] feat: x\n  - [ ] a\n - [ ] b\n", &HeaderParser).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedTasklist { line: 3, .. }));
    }

    #[test]
    fn test_empty_list() {
        assert!(parse("", &HeaderParser).unwrap().is_empty());
        assert!(parse("\n\n", &HeaderParser).unwrap().is_empty());
    }

    #[test]
    fn test_summary_kept_as_written() {
        let text = "- [ ] Feat: Add X\n- [ ] fix:  handle tabs\n";
        let parser = NormalizingParser;
        let mut entries = parse(text, &parser).unwrap();
        assert_eq!(entries[0].commit().map(|c| c.commit_type.as_str()), Some("feat"));
        assert_eq!(serialize(&entries), text);

        assert_eq!(mark_complete(&mut entries, "Feat: Add X"), 1);
        assert_eq!(mark_complete(&mut entries, "fix:  handle tabs"), 1);
        assert_eq!(serialize(&entries), "- [X] Feat: Add X\n- [X] fix:  handle tabs\n");
    }

    #[test]
    fn test_note_after_subtasks_joins_last_subtask() {
        let text = "- [ ] feat: a\n  - [ ] sub\n  trailing note\n- [ ] fix: b\n";
        let entries = parse(text, &HeaderParser).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].body, "");
        assert_eq!(entries[0].subtasks.len(), 1);
        assert_eq!(entries[0].subtasks[0].body, "trailing note");

        let reparsed = parse(&serialize(&entries), &HeaderParser).unwrap();
        assert_eq!(reparsed, entries);
    }

    #[test]
    fn test_mark_complete() {
        let mut entries = parse("- [ ] feat: a\n- [ ] fix: b\n", &HeaderParser).unwrap();
        assert_eq!(mark_complete(&mut entries, "fix: b"), 1);
        assert_eq!(mark_complete(&mut entries, "fix: b"), 0);
        assert!(!entries[0].complete);
        assert!(entries[1].complete);
    }

    #[test]
    fn test_serde_shape() {
        let entries = parse("- [X] feat: a\n", &HeaderParser).unwrap();
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["complete"], true);
        assert_eq!(json[0]["summary"]["commit"]["raw"], "feat: a");
        assert_eq!(json[0]["summary"]["commit"]["message"]["type"], "feat");
    }
}
