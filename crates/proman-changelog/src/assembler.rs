//! Changelog assembly from completed tasks

use std::collections::BTreeMap;

use proman_core::config::{ChangelogConfig, Config};
use proman_protocol::TaskEntry;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::classify::CommitClassifier;

/// A single changelog line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

/// Entries keyed by channel id, then section id
pub type Changes = BTreeMap<String, BTreeMap<String, Vec<ChangeEntry>>>;

/// Builds changelog entries from a parsed tasklist
#[derive(Debug, Clone, Copy)]
pub struct ChangelogAssembler<'c> {
    classifier: CommitClassifier<'c>,
    config: &'c ChangelogConfig,
}

impl<'c> ChangelogAssembler<'c> {
    pub fn new(classifier: CommitClassifier<'c>, config: &'c ChangelogConfig) -> Self {
        Self { classifier, config }
    }

    /// Assembler using the commit types and changelog settings of `config`
    pub fn from_config(config: &'c Config) -> Self {
        Self::new(CommitClassifier::new(&config.commits), &config.changelog)
    }

    /// Collect every completed top-level conventional task.
    ///
    /// In pre-release mode only entries of the public channel are kept, and
    /// they are filed under the pre-release channel instead.
    #[instrument(skip_all, fields(tasks = entries.len(), prerelease = prerelease))]
    pub fn assemble(&self, entries: &[TaskEntry], prerelease: bool) -> Changes {
        let mut changes = Changes::new();

        for entry in entries.iter().filter(|e| e.complete) {
            let Some(message) = entry.commit() else {
                continue;
            };
            let Some(class) = self.classifier.classify(message) else {
                continue;
            };

            let channel = if !prerelease {
                &class.channel
            } else if class.channel == self.config.public_channel {
                &self.config.prerelease_channel
            } else {
                continue;
            };

            let title = match &message.scope {
                Some(scope) => format!("{}: {}", scope, message.description),
                None => message.description.clone(),
            };
            changes
                .entry(channel.clone())
                .or_default()
                .entry(class.section.clone())
                .or_default()
                .push(ChangeEntry {
                    title,
                    details: entry.body.clone(),
                });
        }

        debug!(
            channels = changes.len(),
            entries = changes.values().flat_map(|s| s.values()).map(Vec::len).sum::<usize>(),
            "assembled changelog"
        );
        changes
    }
}
