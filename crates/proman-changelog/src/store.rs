//! JSON changelog store
//!
//! The file is a JSON array of records, newest first. A record carrying
//! `"ongoing": true` at index 0 describes the unreleased build; it is held
//! apart as the current record until [`ChangelogStore::seal_release`] turns
//! it into a permanent entry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use proman_core::error::{ChangelogError, Result};
use proman_protocol::TaskEntry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::assembler::Changes;

/// Commit the record's build is based on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u64>,
}

/// Protocol text and parsed tasks at the time of the record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolSnapshot {
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskEntry>,
}

/// Published release payloads, one per platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Releases {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zenodo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zenodo_sandbox: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A contributor and the roles they held, with each role's priority
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub member: bool,
    #[serde(default)]
    pub roles: BTreeMap<String, u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One changelog revision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ongoing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Parent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Releases>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contributors: BTreeMap<String, Contributor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub changes: Changes,
    /// Keys this crate does not model, kept as read
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// A fresh record for the unreleased build
    pub fn ongoing() -> Self {
        Self {
            ongoing: true,
            ..Self::default()
        }
    }

    pub fn update_parent(&mut self, sha: &str, version: Option<String>, distance: Option<u64>) {
        self.parent = Some(Parent {
            sha: sha.to_string(),
            version,
            distance,
        });
    }

    pub fn update_protocol(&mut self, data: &str, tasks: &[TaskEntry]) {
        self.protocol = Some(ProtocolSnapshot {
            data: data.to_string(),
            tasks: tasks.to_vec(),
        });
    }

    pub fn update_release_github(&mut self, payload: Value) {
        self.release.get_or_insert_with(Releases::default).github = Some(payload);
    }

    pub fn update_release_zenodo(&mut self, payload: Value) {
        self.release.get_or_insert_with(Releases::default).zenodo = Some(payload);
    }

    pub fn update_release_zenodo_sandbox(&mut self, payload: Value) {
        self.release
            .get_or_insert_with(Releases::default)
            .zenodo_sandbox = Some(payload);
    }

    /// Record a contributor. Roles already present keep the first priority
    /// recorded for them.
    pub fn update_contributor(&mut self, id: &str, member: bool, roles: &BTreeMap<String, u32>) {
        let contributor = self.contributors.entry(id.to_string()).or_default();
        contributor.member = member;
        for (role, priority) in roles {
            contributor.roles.entry(role.clone()).or_insert(*priority);
        }
    }

    pub fn update_issue(&mut self, issue: Value) {
        self.issue = Some(issue);
    }

    pub fn update_pull_request(&mut self, pull_request: Value) {
        self.pull_request = Some(pull_request);
    }

    pub fn update_milestone(&mut self, milestone: Value) {
        self.milestone = Some(milestone);
    }

    pub fn update_changes(&mut self, changes: Changes) {
        self.changes = changes;
    }
}

/// Changelog file manager with a write-if-changed policy
#[derive(Debug)]
pub struct ChangelogStore {
    path: PathBuf,
    current: Option<Record>,
    sealed: Vec<Record>,
    snapshot: Value,
}

impl ChangelogStore {
    /// Load the store at `path`; a missing file yields an empty store
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("changelog file not found, starting empty");
            return Self::from_records(path, Vec::new());
        }

        let content = std::fs::read_to_string(path).map_err(ChangelogError::Io)?;
        Self::parse(path, &content)
    }

    /// Build a store from JSON text that belongs to `path`
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let records: Vec<Record> =
            serde_json::from_str(content).map_err(|e| ChangelogError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::from_records(path, records)
    }

    fn from_records(path: &Path, mut records: Vec<Record>) -> Result<Self> {
        if records.iter().skip(1).any(|r| r.ongoing) {
            return Err(ChangelogError::Malformed {
                path: path.to_path_buf(),
                reason: "only the first record may be ongoing".to_string(),
            }
            .into());
        }

        let current = match records.first() {
            Some(first) if first.ongoing => Some(records.remove(0)),
            _ => None,
        };

        let mut store = Self {
            path: path.to_path_buf(),
            current,
            sealed: records,
            snapshot: Value::Null,
        };
        store.snapshot = store.to_value()?;
        debug!(
            sealed = store.sealed.len(),
            ongoing = store.current.is_some(),
            "changelog loaded"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The ongoing record, if a cycle is open
    pub fn current(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    /// The ongoing record, or [`ChangelogError::NoOngoingRecord`]
    pub fn current_mut(&mut self) -> Result<&mut Record> {
        Ok(self
            .current
            .as_mut()
            .ok_or(ChangelogError::NoOngoingRecord)?)
    }

    /// Open a new ongoing record unless one is already open
    pub fn begin_next_cycle(&mut self) -> &mut Record {
        self.current.get_or_insert_with(|| {
            debug!("opening ongoing changelog record");
            Record::ongoing()
        })
    }

    /// Seal the ongoing record as the release of `version`
    #[instrument(skip(self), fields(version = %version))]
    pub fn seal_release(&mut self, version: &str, date: DateTime<Utc>) -> Result<&Record> {
        let mut record = self.current.take().ok_or(ChangelogError::NoOngoingRecord)?;
        record.ongoing = false;
        record.version = Some(version.to_string());
        record.date = Some(date.format("%Y-%m-%d").to_string());

        info!("sealed changelog record");
        self.sealed.insert(0, record);
        Ok(&self.sealed[0])
    }

    /// Sealed records, newest first
    pub fn sealed(&self) -> &[Record] {
        &self.sealed
    }

    /// Whether the in-memory state differs from what was loaded or last written
    pub fn is_dirty(&self) -> Result<bool> {
        Ok(self.to_value()? != self.snapshot)
    }

    /// Write the file if anything changed; returns whether a write happened
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn write_file(&mut self) -> Result<bool> {
        let value = self.to_value()?;
        if value == self.snapshot {
            debug!("changelog unchanged, skipping write");
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(ChangelogError::Io)?;
        }
        let mut content = serde_json::to_string_pretty(&value)?;
        content.push('\n');
        std::fs::write(&self.path, content).map_err(|e| {
            warn!(error = %e, "failed to write changelog");
            ChangelogError::WriteFailed(e.to_string())
        })?;

        info!(
            records = self.sealed.len() + usize::from(self.current.is_some()),
            "changelog written"
        );
        self.snapshot = value;
        Ok(true)
    }

    fn to_value(&self) -> Result<Value> {
        let records: Vec<&Record> = self.current.iter().chain(self.sealed.iter()).collect();
        Ok(serde_json::to_value(records)?)
    }
}
