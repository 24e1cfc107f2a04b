//! Conventional Commits parser
//!
//! Parses Conventional Commits messages:
//! https://www.conventionalcommits.org/

use std::sync::LazyLock;

use proman_core::commit::{ConventionalMessage, Footer, MessageParser};
use regex::Regex;
use tracing::trace;

static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?: (?P<description>.+)$",
    )
    .expect("Invalid regex")
});

static FOOTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<token>BREAKING CHANGE|[A-Za-z-]+)(?:: | #)(?P<value>.+)$")
        .expect("Invalid regex")
});

/// Parser for Conventional Commits messages
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionalParser;

impl ConventionalParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_body(&self, body: &str) -> (Option<String>, Vec<Footer>) {
        let mut footers: Vec<Footer> = Vec::new();
        let mut body_lines = Vec::new();
        let mut in_footer = false;

        for line in body.lines() {
            if let Some(caps) = FOOTER_REGEX.captures(line) {
                in_footer = true;
                let token = caps.name("token").map_or("", |m| m.as_str());
                let value = caps.name("value").map_or("", |m| m.as_str());
                footers.push(Footer {
                    token: token.to_string(),
                    value: value.to_string(),
                });
            } else if in_footer && line.starts_with(' ') {
                if let Some(last) = footers.last_mut() {
                    last.value.push('\n');
                    last.value.push_str(line.trim());
                }
            } else if !in_footer {
                body_lines.push(line);
            }
        }

        let body_text = body_lines.join("\n").trim().to_string();
        let body_text = (!body_text.is_empty()).then_some(body_text);
        (body_text, footers)
    }
}

impl MessageParser for ConventionalParser {
    fn parse_message(&self, message: &str) -> Option<ConventionalMessage> {
        let (header, body) = match message.split_once('\n') {
            Some((header, body)) => (header.trim_end(), Some(body)),
            None => (message.trim_end(), None),
        };

        let Some(caps) = HEADER_REGEX.captures(header) else {
            trace!(header, "not a conventional commit header");
            return None;
        };

        let commit_type = caps.name("type")?.as_str().to_lowercase();
        let description = caps.name("description")?.as_str().trim().to_string();
        let (body, footers) = body.map(|b| self.parse_body(b)).unwrap_or_default();

        let breaking_in_footer = footers.iter().any(|f| {
            f.token.eq_ignore_ascii_case("BREAKING CHANGE")
                || f.token.eq_ignore_ascii_case("BREAKING-CHANGE")
        });

        Some(ConventionalMessage {
            commit_type,
            scope: caps.name("scope").map(|m| m.as_str().to_string()),
            breaking: caps.name("breaking").is_some() || breaking_in_footer,
            description,
            body,
            footers,
        })
    }
}
