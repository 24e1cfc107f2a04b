//! Delayed-evaluation text templates
//!
//! Templates are stored unrendered in the configuration and only evaluated
//! when a caller supplies an environment. Placeholders use the form
//! `{{variable}}`; variables missing from the environment are left unchanged
//! in the output.
//!
//! ```rust
//! use proman_core::template::{Template, TemplateEnv};
//!
//! let env = TemplateEnv::new().with("version", "1.2.0");
//! let rendered = Template::new("Released {{ version }}").render(&env).unwrap();
//! assert_eq!(rendered, "Released 1.2.0");
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TemplateError;

/// Variables available to a template at render time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateEnv {
    vars: BTreeMap<String, String>,
}

impl TemplateEnv {
    /// Creates an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the environment a render sees: base variables, overlaid by
    /// call-site variables, plus `timestamp` formatted from `now`
    pub fn merged(
        base: &TemplateEnv,
        call_site: &TemplateEnv,
        now: DateTime<Utc>,
        timestamp_format: &str,
    ) -> Self {
        let mut vars = base.vars.clone();
        vars.extend(call_site.vars.clone());
        vars.insert(
            "timestamp".to_string(),
            now.format(timestamp_format).to_string(),
        );
        Self { vars }
    }

    /// Sets a variable and returns self for chaining
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Gets the value for a variable by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|s| s.as_str())
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variables are set
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// An unrendered template string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template {
    source: String,
}

impl Template {
    /// Wraps a template string
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The raw template text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of all placeholders, in order of appearance
    pub fn placeholders(&self) -> Result<Vec<String>, TemplateError> {
        let mut names = Vec::new();
        self.walk(|segment| {
            if let Segment::Placeholder(name) = segment {
                names.push(name.to_string());
            }
        })?;
        Ok(names)
    }

    /// Renders the template against an environment
    pub fn render(&self, env: &TemplateEnv) -> Result<String, TemplateError> {
        let mut output = String::with_capacity(self.source.len());
        self.walk(|segment| match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Placeholder(name) => match env.get(name) {
                Some(value) => output.push_str(value),
                None => {
                    debug!(variable = name, "template variable not set, left unchanged");
                    output.push_str("{{");
                    output.push_str(name);
                    output.push_str("}}");
                }
            },
        })?;
        Ok(output)
    }

    fn walk<'a>(&'a self, mut visit: impl FnMut(Segment<'a>)) -> Result<(), TemplateError> {
        let mut rest = self.source.as_str();
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            visit(Segment::Text(&rest[..open]));
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or_else(|| TemplateError::Unterminated {
                    template: self.source.clone(),
                    offset: offset + open,
                })?;
            let name = after_open[..close].trim();
            if name.is_empty() {
                return Err(TemplateError::EmptyPlaceholder {
                    template: self.source.clone(),
                    offset: offset + open,
                });
            }
            visit(Segment::Placeholder(name));

            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        visit(Segment::Text(rest));
        Ok(())
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}
