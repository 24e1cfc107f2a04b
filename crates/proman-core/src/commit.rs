//! Conventional commit message types

use serde::{Deserialize, Serialize};

/// A footer field from a conventional commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    /// Footer token (e.g., "BREAKING CHANGE", "Fixes", "Refs")
    pub token: String,
    /// Footer value
    pub value: String,
}

/// A commit message in conventional commit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionalMessage {
    /// Commit type (feat, fix, etc.)
    #[serde(rename = "type")]
    pub commit_type: String,
    /// Scope (optional, in parentheses)
    pub scope: Option<String>,
    /// Whether the header carries the `!` breaking marker or a breaking footer
    pub breaking: bool,
    /// Commit description
    pub description: String,
    /// Commit body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Footer fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footers: Vec<Footer>,
}

impl ConventionalMessage {
    /// Create a message with only a header
    pub fn new(commit_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            scope: None,
            breaking: false,
            description: description.into(),
            body: None,
            footers: Vec::new(),
        }
    }

    /// Set the scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Mark as breaking
    pub fn with_breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    /// Header line: `type(scope)!: description`
    pub fn summary(&self) -> String {
        let mut header = self.commit_type.clone();
        if let Some(scope) = &self.scope {
            header.push('(');
            header.push_str(scope);
            header.push(')');
        }
        if self.breaking && !self.has_breaking_footer() {
            header.push('!');
        }
        header.push_str(": ");
        header.push_str(&self.description);
        header
    }

    fn has_breaking_footer(&self) -> bool {
        self.footers.iter().any(|f| {
            f.token.eq_ignore_ascii_case("BREAKING CHANGE")
                || f.token.eq_ignore_ascii_case("BREAKING-CHANGE")
        })
    }
}

impl std::fmt::Display for ConventionalMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())?;
        if let Some(body) = &self.body {
            write!(f, "\n\n{}", body)?;
        }
        if !self.footers.is_empty() {
            f.write_str("\n")?;
            for footer in &self.footers {
                write!(f, "\n{}: {}", footer.token, footer.value)?;
            }
        }
        Ok(())
    }
}

/// Parses raw text into a conventional commit message
pub trait MessageParser: Send + Sync {
    /// Parse a message; `None` when the text is not in conventional form
    fn parse_message(&self, message: &str) -> Option<ConventionalMessage>;
}
