//! Single-checkbox toggling

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

static TOP_LEVEL_CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- \[[ xX]\]").expect("Invalid regex"));

/// Check or uncheck the only top-level checkbox in `text`.
///
/// Text with zero or several top-level checkboxes is returned unchanged and a
/// warning is logged.
pub fn toggle_checkbox(text: &str, check: bool) -> String {
    let mut matches = TOP_LEVEL_CHECKBOX.find_iter(text);
    let (Some(found), None) = (matches.next(), matches.next()) else {
        let count = TOP_LEVEL_CHECKBOX.find_iter(text).count();
        warn!(count, "expected exactly one checkbox, leaving text unchanged");
        return text.to_string();
    };

    let mark = if check { "- [X]" } else { "- [ ]" };
    let mut updated = String::with_capacity(text.len());
    updated.push_str(&text[..found.start()]);
    updated.push_str(mark);
    updated.push_str(&text[found.end()..]);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_and_uncheck() {
        assert_eq!(toggle_checkbox("- [ ] done", true), "- [X] done");
        assert_eq!(toggle_checkbox("- [x] done", false), "- [ ] done");
        assert_eq!(toggle_checkbox("\n- [X] Design\n", true), "\n- [X] Design\n");
    }

    #[test]
    fn test_no_checkbox_is_unchanged() {
        assert_eq!(toggle_checkbox("no checkbox here", true), "no checkbox here");
    }

    #[test]
    fn test_several_checkboxes_are_unchanged() {
        let text = "- [ ] one\n- [ ] two\n";
        assert_eq!(toggle_checkbox(text, true), text);
    }

    #[test]
    fn test_nested_checkboxes_do_not_count() {
        let text = "- [ ] parent\n  - [ ] child\n";
        assert_eq!(toggle_checkbox(text, true), "- [X] parent\n  - [ ] child\n");
    }
}
