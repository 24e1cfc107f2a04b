//! Protocol document engine

use chrono::{DateTime, Utc};
use proman_core::commit::MessageParser;
use proman_core::config::ProtocolConfig;
use proman_core::error::{ProtocolError, Result};
use proman_core::{IssueStatus, TemplateEnv};
use tracing::{debug, instrument, warn};

use crate::checkbox::toggle_checkbox;
use crate::markers::{splice, MarkerPair, STATUS_CHECKBOX_PREFIX};
use crate::tasklist::{self, TaskEntry};

pub const TASKLIST: &str = "tasklist";
pub const TIMELINE: &str = "timeline";
pub const REFERENCES: &str = "references";
pub const PR_LIST: &str = "pr_list";
pub const PR_TITLE: &str = "pr_title";
pub const STATUS: &str = "status";

/// An issue or pull request body with marker-delimited fields.
///
/// Mutations edit the in-memory text only; writing it back is up to the
/// caller. Every `add_*`/`update_*` operation returns whether the text changed.
#[derive(Debug, Clone)]
pub struct ProtocolDocument<'c> {
    text: String,
    config: &'c ProtocolConfig,
    now: Option<DateTime<Utc>>,
}

impl<'c> ProtocolDocument<'c> {
    /// Wrap a document body
    pub fn new(text: impl Into<String>, config: &'c ProtocolConfig) -> Self {
        Self {
            text: text.into(),
            config,
            now: None,
        }
    }

    /// Pin the time used for the `timestamp` template variable
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Current document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the document, returning its text
    pub fn into_text(self) -> String {
        self.text
    }

    /// Text between the markers of `id`; empty when the markers are absent
    pub fn get_data(&self, id: &str) -> Result<&str> {
        let markers = MarkerPair::for_field(id, self.config)?;
        match markers.locate(&self.text) {
            Some(span) => Ok(&self.text[span.content]),
            None => {
                debug!(id, "field markers not found");
                Ok("")
            }
        }
    }

    /// Write `data` into field `id`.
    ///
    /// With `replace` the field content is replaced, otherwise `data` is
    /// appended just before the end marker. Missing markers are logged and
    /// leave the document unchanged.
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub fn add_data(&mut self, id: &str, data: &str, replace: bool) -> Result<bool> {
        let markers = MarkerPair::for_field(id, self.config)?;
        if markers.is_contained_in(data) {
            return Err(ProtocolError::MarkerInData(id.to_string()).into());
        }

        let Some(span) = markers.locate(&self.text) else {
            warn!(id, start = %markers.start, "field markers not found, document unchanged");
            return Ok(false);
        };
        if markers.occurrences(&self.text) > 1 {
            warn!(id, "field markers occur more than once, using the first pair");
        }

        let range = if replace {
            span.content
        } else {
            span.content.end..span.content.end
        };
        let updated = splice(&self.text, range, data);
        let changed = updated != self.text;
        self.text = updated;
        Ok(changed)
    }

    /// Parse the task list field
    pub fn get_tasklist(&self, parser: &dyn MessageParser) -> Result<Vec<TaskEntry>> {
        Ok(tasklist::parse(self.get_data(TASKLIST)?, parser)?)
    }

    /// Replace the task list field with `entries`
    pub fn update_tasklist(&mut self, entries: &[TaskEntry]) -> Result<bool> {
        let data = format!("\n{}", tasklist::serialize(entries));
        self.add_data(TASKLIST, &data, true)
    }

    /// Append a timeline entry rendered from the `timeline` template
    pub fn add_timeline_entry(&mut self, env: &TemplateEnv) -> Result<bool> {
        self.append_rendered(TIMELINE, env)
    }

    /// Append a reference rendered from the `references` template
    pub fn add_reference(&mut self, env: &TemplateEnv) -> Result<bool> {
        self.append_rendered(REFERENCES, env)
    }

    /// Append a pull request entry rendered from the `pr_list` template
    pub fn add_pr_list_entry(&mut self, env: &TemplateEnv) -> Result<bool> {
        self.append_rendered(PR_LIST, env)
    }

    /// Replace the pull request title field
    pub fn update_pr_title(&mut self, title: &str) -> Result<bool> {
        self.add_data(PR_TITLE, title, true)
    }

    /// Write the status field and recompute every status checkbox.
    ///
    /// A checkbox is checked once `status` has reached the level of the
    /// status it is mapped to.
    #[instrument(skip(self, env), fields(status = %status))]
    pub fn update_status(&mut self, status: IssueStatus, env: &TemplateEnv) -> Result<bool> {
        let env = env.clone().with("status", status.as_str());
        let content = self.config.status_template.render(&self.render_env(&env))?;
        let mut changed = self.add_data(STATUS, &content, true)?;

        let config = self.config;
        for (name, target) in &config.status_checkboxes {
            let id = format!("{}{}", STATUS_CHECKBOX_PREFIX, name);
            let current = self.get_data(&id)?;
            if current.is_empty() {
                debug!(checkbox = %name, "status checkbox not in document");
                continue;
            }

            let toggled = toggle_checkbox(current, status.level() >= target.level());
            if toggled != current {
                changed |= self.add_data(&id, &toggled, true)?;
            }
        }

        Ok(changed)
    }

    fn render_env(&self, env: &TemplateEnv) -> TemplateEnv {
        let now = self.now.unwrap_or_else(Utc::now);
        TemplateEnv::merged(&self.config.env, env, now, &self.config.timestamp_format)
    }

    fn append_rendered(&mut self, id: &str, env: &TemplateEnv) -> Result<bool> {
        let template = self.config.fields.get(id).and_then(|f| f.template.as_ref());
        let Some(template) = template else {
            warn!(id, "no template configured for field, document unchanged");
            return Ok(false);
        };

        let data = template.render(&self.render_env(env))?;
        self.add_data(id, &data, false)
    }
}
