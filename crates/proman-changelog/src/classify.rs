//! Conventional commit type classification

use std::collections::BTreeMap;

use proman_core::config::CommitTypeConfig;
use proman_core::{ConventionalMessage, ReleaseAction};
use proman_protocol::TaskEntry;
use tracing::{debug, instrument, warn};

/// Maps conventional commit types to changelog placement and release actions
#[derive(Debug, Clone, Copy)]
pub struct CommitClassifier<'c> {
    types: &'c BTreeMap<String, CommitTypeConfig>,
}

impl<'c> CommitClassifier<'c> {
    pub fn new(types: &'c BTreeMap<String, CommitTypeConfig>) -> Self {
        Self { types }
    }

    /// Classification of the message's type; `None` for unknown types
    pub fn classify(&self, message: &ConventionalMessage) -> Option<&'c CommitTypeConfig> {
        let found = self.types.get(&message.commit_type);
        if found.is_none() {
            warn!(commit_type = %message.commit_type, "unknown conventional commit type");
        }
        found
    }

    /// Release action of one message. Breaking changes always release a major.
    pub fn action_for(&self, message: &ConventionalMessage) -> Option<ReleaseAction> {
        if message.breaking {
            return Some(ReleaseAction::Major);
        }
        self.classify(message).and_then(|c| c.release_action)
    }

    /// Highest release action over the completed conventional tasks;
    /// `None` when every change is internal
    #[instrument(skip_all, fields(tasks = entries.len()))]
    pub fn release_action(&self, entries: &[TaskEntry]) -> Option<ReleaseAction> {
        let action = entries
            .iter()
            .filter(|e| e.complete)
            .filter_map(TaskEntry::commit)
            .filter_map(|message| self.action_for(message))
            .max();
        debug!(action = ?action, "release action from tasklist");
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proman_core::config::default_commit_types;
    use proman_protocol::TaskSummary;

    fn task(message: ConventionalMessage, complete: bool) -> TaskEntry {
        TaskEntry::new(TaskSummary::from_message(message), complete)
    }

    #[test]
    fn test_classify_default_types() {
        let types = default_commit_types();
        let classifier = CommitClassifier::new(&types);

        let feat = classifier.classify(&ConventionalMessage::new("feat", "x")).unwrap();
        assert_eq!(feat.channel, "public");
        assert_eq!(feat.section, "features");
        assert!(classifier.classify(&ConventionalMessage::new("wip", "x")).is_none());
    }

    #[test]
    fn test_release_action_takes_highest_completed() {
        let types = default_commit_types();
        let classifier = CommitClassifier::new(&types);

        let entries = vec![
            task(ConventionalMessage::new("fix", "a"), true),
            task(ConventionalMessage::new("feat", "b"), true),
            task(ConventionalMessage::new("docs", "c"), true),
            task(ConventionalMessage::new("feat", "d").with_breaking(true), false),
        ];
        assert_eq!(classifier.release_action(&entries), Some(ReleaseAction::Minor));
    }

    #[test]
    fn test_breaking_forces_major() {
        let types = default_commit_types();
        let classifier = CommitClassifier::new(&types);

        let entries = vec![task(
            ConventionalMessage::new("refactor", "drop old api").with_breaking(true),
            true,
        )];
        assert_eq!(classifier.release_action(&entries), Some(ReleaseAction::Major));
    }

    #[test]
    fn test_internal_changes_have_no_action() {
        let types = default_commit_types();
        let classifier = CommitClassifier::new(&types);

        let entries = vec![
            task(ConventionalMessage::new("chore", "deps"), true),
            TaskEntry::new(TaskSummary::Text("write notes".to_string()), true),
        ];
        assert_eq!(classifier.release_action(&entries), None);
        assert_eq!(classifier.release_action(&[]), None);
    }
}
