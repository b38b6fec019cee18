//! Registry event stream
//!
//! Each committed mutation produces one `RegistryEvent`. The event log keeps
//! them as JSON lines so that off-line tooling can rebuild the current view of
//! every list (`Snapshot`) without access to the registry state itself.

use crate::registry::ListId;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use registry_core::{Paths, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Something that happened to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    RegistryCreated {
        list: ListId,
        owner: Address,
    },
    OwnerChanged {
        list: ListId,
        previous_owner: Address,
        new_owner: Address,
    },
    TimelockChangeRequested {
        current_period: u64,
        new_period: u64,
        confirmable_after: Timestamp,
    },
    TimelockChanged {
        previous_period: u64,
        new_period: u64,
    },
    DappAdded {
        list: ListId,
        dapp: Address,
        filter: Address,
        valid_after: Timestamp,
    },
    DappRemoved {
        list: ListId,
        dapp: Address,
        filter: Address,
    },
    FilterUpdateRequested {
        list: ListId,
        dapp: Address,
        current_filter: Address,
        new_filter: Address,
        confirmable_after: Timestamp,
    },
    FilterUpdated {
        list: ListId,
        dapp: Address,
        previous_filter: Address,
        new_filter: Address,
        valid_after: Timestamp,
    },
    TrustListToggled {
        wallet: Address,
        list: ListId,
        enabled: bool,
    },
}

impl RegistryEvent {
    /// Stable snake_case name, as written in the log
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryEvent::RegistryCreated { .. } => "registry_created",
            RegistryEvent::OwnerChanged { .. } => "owner_changed",
            RegistryEvent::TimelockChangeRequested { .. } => "timelock_change_requested",
            RegistryEvent::TimelockChanged { .. } => "timelock_changed",
            RegistryEvent::DappAdded { .. } => "dapp_added",
            RegistryEvent::DappRemoved { .. } => "dapp_removed",
            RegistryEvent::FilterUpdateRequested { .. } => "filter_update_requested",
            RegistryEvent::FilterUpdated { .. } => "filter_updated",
            RegistryEvent::TrustListToggled { .. } => "trust_list_toggled",
        }
    }

    /// The trust list concerned, if any
    pub fn list(&self) -> Option<ListId> {
        match self {
            RegistryEvent::RegistryCreated { list, .. }
            | RegistryEvent::OwnerChanged { list, .. }
            | RegistryEvent::DappAdded { list, .. }
            | RegistryEvent::DappRemoved { list, .. }
            | RegistryEvent::FilterUpdateRequested { list, .. }
            | RegistryEvent::FilterUpdated { list, .. }
            | RegistryEvent::TrustListToggled { list, .. } => Some(*list),
            RegistryEvent::TimelockChangeRequested { .. }
            | RegistryEvent::TimelockChanged { .. } => None,
        }
    }

    /// The dapp concerned, if any
    pub fn dapp(&self) -> Option<Address> {
        match self {
            RegistryEvent::DappAdded { dapp, .. }
            | RegistryEvent::DappRemoved { dapp, .. }
            | RegistryEvent::FilterUpdateRequested { dapp, .. }
            | RegistryEvent::FilterUpdated { dapp, .. } => Some(*dapp),
            _ => None,
        }
    }
}

/// An event together with the registry time it was committed at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Registry clock at commit time
    pub at: Timestamp,

    #[serde(flatten)]
    pub event: RegistryEvent,
}

impl EventRecord {
    pub fn new(at: Timestamp, event: RegistryEvent) -> Self {
        Self { at, event }
    }

    /// Commit time as a UTC date, for display
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.at).ok()?, 0)
    }
}

/// Append-only JSON lines event log
pub struct EventLog {
    log_path: PathBuf,
}

impl EventLog {
    /// Log for an environment at the default location
    pub fn new(env: &str) -> Self {
        Self::with_path(Paths::new().events(env))
    }

    /// Create with custom path
    pub fn with_path(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Append records in order
    pub fn append(&self, records: &[EventRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open event log at {:?}", self.log_path))?;

        let mut writer = BufWriter::new(file);
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Every record in commit order
    pub fn read_all(&self) -> Result<Vec<EventRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.log_path)?);
        let mut records = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(line = n + 1, error = %e, "skipping malformed event"),
            }
        }
        Ok(records)
    }

    /// Matching records, most recent first
    pub fn query(&self, query: &EventQuery) -> Result<Vec<EventRecord>> {
        let mut records: Vec<EventRecord> = self
            .read_all()?
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();

        records.reverse();
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }

        Ok(records)
    }

    /// Current view rebuilt from the whole log
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::from_events(&self.read_all()?))
    }
}

/// Query builder for the event log
#[derive(Debug, Default, Clone)]
pub struct EventQuery {
    pub list: Option<ListId>,
    pub dapp: Option<Address>,
    pub kind: Option<String>,
    pub since: Option<Timestamp>,
    pub limit: Option<usize>,
}

impl EventQuery {
    pub fn list(mut self, list: ListId) -> Self {
        self.list = Some(list);
        self
    }

    pub fn dapp(mut self, dapp: Address) -> Self {
        self.dapp = Some(dapp);
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn since(mut self, since: Timestamp) -> Self {
        self.since = Some(since);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        if let Some(list) = self.list {
            if record.event.list() != Some(list) {
                return false;
            }
        }

        if let Some(dapp) = self.dapp {
            if record.event.dapp() != Some(dapp) {
                return false;
            }
        }

        if let Some(ref kind) = self.kind {
            if record.event.kind() != kind {
                return false;
            }
        }

        if let Some(since) = self.since {
            if record.at < since {
                return false;
            }
        }

        true
    }
}

/// A dapp as seen from the event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappView {
    pub filter: Address,
    pub valid_after: Timestamp,
    pub pending_filter: Option<Address>,
    pub confirmable_after: Option<Timestamp>,
    /// Time of the last event touching this dapp
    pub last_change: Timestamp,
}

/// A trust list as seen from the event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListView {
    pub owner: Address,
    pub dapps: BTreeMap<Address, DappView>,
}

/// Projection of the event stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timelock_period: Option<u64>,
    pub pending_timelock: Option<(u64, Timestamp)>,
    pub lists: BTreeMap<ListId, ListView>,
    pub toggles: BTreeMap<Address, BTreeMap<ListId, bool>>,
}

impl Snapshot {
    /// Fold records, oldest first
    pub fn from_events<'a>(records: impl IntoIterator<Item = &'a EventRecord>) -> Self {
        let mut snapshot = Snapshot::default();
        for record in records {
            snapshot.apply(record);
        }
        snapshot
    }

    pub fn apply(&mut self, record: &EventRecord) {
        let at = record.at;
        match &record.event {
            RegistryEvent::RegistryCreated { list, owner } => {
                self.lists.insert(
                    *list,
                    ListView {
                        owner: *owner,
                        dapps: BTreeMap::new(),
                    },
                );
            }
            RegistryEvent::OwnerChanged {
                list, new_owner, ..
            } => {
                if let Some(view) = self.lists.get_mut(list) {
                    view.owner = *new_owner;
                }
            }
            RegistryEvent::TimelockChangeRequested {
                new_period,
                confirmable_after,
                ..
            } => {
                self.pending_timelock = Some((*new_period, *confirmable_after));
            }
            RegistryEvent::TimelockChanged { new_period, .. } => {
                self.timelock_period = Some(*new_period);
                self.pending_timelock = None;
            }
            RegistryEvent::DappAdded {
                list,
                dapp,
                filter,
                valid_after,
            } => {
                if let Some(view) = self.lists.get_mut(list) {
                    view.dapps.insert(
                        *dapp,
                        DappView {
                            filter: *filter,
                            valid_after: *valid_after,
                            pending_filter: None,
                            confirmable_after: None,
                            last_change: at,
                        },
                    );
                }
            }
            RegistryEvent::DappRemoved { list, dapp, .. } => {
                if let Some(view) = self.lists.get_mut(list) {
                    view.dapps.remove(dapp);
                }
            }
            RegistryEvent::FilterUpdateRequested {
                list,
                dapp,
                new_filter,
                confirmable_after,
                ..
            } => {
                if let Some(dapp) = self.dapp_mut(*list, *dapp) {
                    dapp.pending_filter = Some(*new_filter);
                    dapp.confirmable_after = Some(*confirmable_after);
                    dapp.last_change = at;
                }
            }
            RegistryEvent::FilterUpdated {
                list,
                dapp,
                new_filter,
                valid_after,
                ..
            } => {
                if let Some(dapp) = self.dapp_mut(*list, *dapp) {
                    dapp.filter = *new_filter;
                    dapp.valid_after = *valid_after;
                    dapp.pending_filter = None;
                    dapp.confirmable_after = None;
                    dapp.last_change = at;
                }
            }
            RegistryEvent::TrustListToggled {
                wallet,
                list,
                enabled,
            } => {
                self.toggles
                    .entry(*wallet)
                    .or_default()
                    .insert(*list, *enabled);
            }
        }
    }

    fn dapp_mut(&mut self, list: ListId, dapp: Address) -> Option<&mut DappView> {
        self.lists.get_mut(&list)?.dapps.get_mut(&dapp)
    }
}
