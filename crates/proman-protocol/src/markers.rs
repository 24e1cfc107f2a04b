//! Marker pairs and span location
//!
//! Markers are located with plain substring search and content is replaced
//! by splicing, so field data never passes through a regex replacement.

use std::ops::Range;

use proman_core::config::{MarkerSpec, ProtocolConfig};
use proman_core::error::ProtocolError;

/// Prefix of status checkbox field ids (`status_checkbox.design`)
pub const STATUS_CHECKBOX_PREFIX: &str = "status_checkbox.";

/// Start and end marker of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    pub start: String,
    pub end: String,
}

/// Location of a field inside a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// From the first byte of the start marker to the last byte of the end marker
    pub outer: Range<usize>,
    /// Bytes strictly between the markers
    pub content: Range<usize>,
}

impl MarkerPair {
    /// Build a pair from a pattern containing `{pos}` and optionally `{id}`
    pub fn from_pattern(pattern: &str, id: &str, pos_start: &str, pos_end: &str) -> Self {
        let with_id = pattern.replace("{id}", id);
        Self {
            start: with_id.replace("{pos}", pos_start),
            end: with_id.replace("{pos}", pos_end),
        }
    }

    /// Markers of field `id`.
    ///
    /// Fields must be declared in `config.fields` unless they are status
    /// checkboxes named in `config.status_checkboxes`.
    pub fn for_field(id: &str, config: &ProtocolConfig) -> Result<Self, ProtocolError> {
        let spec = match config.fields.get(id) {
            Some(field) => field.marker.as_ref(),
            None => {
                let known_checkbox = id
                    .strip_prefix(STATUS_CHECKBOX_PREFIX)
                    .is_some_and(|name| config.status_checkboxes.contains_key(name));
                if !known_checkbox {
                    return Err(ProtocolError::UnknownField(id.to_string()));
                }
                None
            }
        };

        Ok(match spec {
            Some(MarkerSpec::Literal { start, end }) => Self {
                start: start.clone(),
                end: end.clone(),
            },
            Some(MarkerSpec::Pattern(pattern)) => {
                Self::from_pattern(pattern, id, &config.pos_start, &config.pos_end)
            }
            None => Self::from_pattern(
                &config.marker_pattern,
                id,
                &config.pos_start,
                &config.pos_end,
            ),
        })
    }

    /// Find the first start marker and the first end marker after it
    pub fn locate(&self, text: &str) -> Option<Span> {
        let start = text.find(&self.start)?;
        let content_start = start + self.start.len();
        let end_offset = text[content_start..].find(&self.end)?;
        let content_end = content_start + end_offset;

        Some(Span {
            outer: start..content_end + self.end.len(),
            content: content_start..content_end,
        })
    }

    /// Number of times the start marker occurs
    pub fn occurrences(&self, text: &str) -> usize {
        text.matches(self.start.as_str()).count()
    }

    /// Whether `data` contains either marker
    pub fn is_contained_in(&self, data: &str) -> bool {
        data.contains(&self.start) || data.contains(&self.end)
    }
}

/// Replace `range` of `text` with `replacement`
pub fn splice(text: &str, range: Range<usize>, replacement: &str) -> String {
    let mut updated = String::with_capacity(text.len() + replacement.len());
    updated.push_str(&text[..range.start]);
    updated.push_str(replacement);
    updated.push_str(&text[range.end..]);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use proman_core::config::FieldConfig;

    #[test]
    fn test_default_pattern() {
        let config = ProtocolConfig::default();
        let markers = MarkerPair::for_field("timeline", &config).unwrap();
        assert_eq!(markers.start, "<!-- start-timeline -->");
        assert_eq!(markers.end, "<!-- end-timeline -->");
    }

    #[test]
    fn test_literal_and_pattern_overrides() {
        let mut config = ProtocolConfig::default();
        config.fields.insert(
            "tasklist".to_string(),
            FieldConfig {
                marker: Some(MarkerSpec::Literal {
                    start: "<!-- Begin Tasklist -->".to_string(),
                    end: "<!-- End Tasklist -->".to_string(),
                }),
                template: None,
            },
        );
        config.fields.insert(
            "references".to_string(),
            FieldConfig {
                marker: Some(MarkerSpec::Pattern("[//]: # ({pos} refs)".to_string())),
                template: None,
            },
        );

        let tasks = MarkerPair::for_field("tasklist", &config).unwrap();
        assert_eq!(tasks.start, "<!-- Begin Tasklist -->");
        let refs = MarkerPair::for_field("references", &config).unwrap();
        assert_eq!(refs.end, "[//]: # (end refs)");
    }

    #[test]
    fn test_status_checkbox_ids() {
        let config = ProtocolConfig::default();
        let markers = MarkerPair::for_field("status_checkbox.design", &config).unwrap();
        assert_eq!(markers.start, "<!-- start-status_checkbox.design -->");

        assert!(matches!(
            MarkerPair::for_field("status_checkbox.unknown", &config),
            Err(ProtocolError::UnknownField(_))
        ));
        assert!(matches!(
            MarkerPair::for_field("summary", &config),
            Err(ProtocolError::UnknownField(_))
        ));
    }

    #[test]
    fn test_locate_and_splice() {
        let markers = MarkerPair::from_pattern("<!-- {pos}-{id} -->", "x", "start", "end");
        let text = "head <!-- start-x -->old<!-- end-x --> tail";
        let span = markers.locate(text).unwrap();
        assert_eq!(&text[span.content.clone()], "old");

        let updated = splice(text, span.content, "new");
        assert_eq!(updated, "head <!-- start-x -->new<!-- end-x --> tail");
        assert_eq!(markers.occurrences(&updated), 1);
    }

    #[test]
    fn test_locate_requires_end_after_start() {
        let markers = MarkerPair::from_pattern("<{pos}>", "x", "s", "e");
        assert_eq!(markers.locate("<e> text <s>"), None);
        assert_eq!(markers.locate("no markers"), None);
    }
}
