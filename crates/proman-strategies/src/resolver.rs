//! Next-version resolution

use proman_core::config::VersioningConfig;
use proman_core::error::{Result, VersionError};
use proman_core::ReleaseAction;
use tracing::{debug, instrument};

use crate::types::PrePhase;
use crate::version::SemanticVersion;

/// Computes release and development versions from a release action
#[derive(Debug, Clone)]
pub struct VersionResolver {
    tag_prefix: String,
    zero_major_softening: bool,
}

impl VersionResolver {
    /// Create a resolver from the versioning configuration
    pub fn new(config: &VersioningConfig) -> Self {
        Self {
            tag_prefix: config.tag_prefix.clone(),
            zero_major_softening: config.zero_major_softening,
        }
    }

    /// Tag prefix
    pub fn tag_prefix(&self) -> &str {
        &self.tag_prefix
    }

    /// Next release version for `action`.
    ///
    /// | action | `0.x` (softened) | `>= 1.x` |
    /// |---|---|---|
    /// | major | next minor | next major |
    /// | minor | next patch | next minor |
    /// | patch | next patch | next patch |
    /// | post  | next post  | next post  |
    ///
    /// A pre-release base stays on its release tuple: `post` produces the next
    /// post release, any other action moves `a -> b -> rc`. A release
    /// candidate only accepts `post`.
    #[instrument(skip_all, fields(base = %base, action = %action))]
    pub fn next_version(
        &self,
        base: &SemanticVersion,
        action: ReleaseAction,
    ) -> Result<SemanticVersion> {
        if action == ReleaseAction::Post {
            return Ok(base.next_post());
        }

        if base.is_prerelease() {
            return base.next_pre_phase().ok_or_else(|| {
                VersionError::InvalidAction {
                    action: action.to_string(),
                    version: base.to_string(),
                    reason: "release candidates only accept post releases".to_string(),
                }
                .into()
            });
        }

        let soften = self.zero_major_softening && base.major() == 0;
        let next = match (action, soften) {
            (ReleaseAction::Major, false) => base.next_major(),
            (ReleaseAction::Major, true) | (ReleaseAction::Minor, false) => base.next_minor(),
            (ReleaseAction::Minor, true) | (ReleaseAction::Patch, _) => base.next_patch(),
            (ReleaseAction::Post, _) => base.next_post(),
        };

        debug!(next = %next, softened = soften, "resolved next version");
        Ok(next)
    }

    /// Development build version for a head branch ahead of `base`.
    ///
    /// `head_dev` is the latest dev-tagged version already on the head branch.
    /// Its dev counter is continued when it targets the same release, otherwise
    /// counting starts at 0. Changes with an action other than `post` are
    /// built as an alpha numbered after `issue`; internal changes (`None`)
    /// are built on the next post release.
    #[instrument(skip_all, fields(base = %base, issue = issue))]
    pub fn next_dev_version(
        &self,
        base: &SemanticVersion,
        head_dev: Option<&SemanticVersion>,
        action: Option<ReleaseAction>,
        issue: u64,
    ) -> Result<SemanticVersion> {
        let candidate = if base.is_prerelease() {
            base.next_post()
        } else {
            match action {
                Some(action) => {
                    let next = self.next_version(base, action)?;
                    if action == ReleaseAction::Post {
                        next
                    } else {
                        next.with_pre(PrePhase::Alpha, issue)
                    }
                }
                None => base.next_post(),
            }
        };

        let dev = match head_dev {
            Some(head) if head.without_dev() == candidate => head.dev().map_or(0, |n| n + 1),
            _ => 0,
        };

        let version = candidate.with_dev(dev);
        debug!(version = %version, "resolved dev version");
        Ok(version)
    }

    /// Tag name for a version: `<prefix><version>`
    pub fn release_tag(&self, version: &SemanticVersion) -> String {
        format!("{}{}", self.tag_prefix, version)
    }

    /// Parse a tag carrying the configured prefix; `None` for foreign tags
    pub fn parse_tag(&self, tag: &str) -> Option<SemanticVersion> {
        let raw = tag.strip_prefix(self.tag_prefix.as_str())?;
        SemanticVersion::parse(raw).ok()
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new(&VersioningConfig::default())
    }
}
