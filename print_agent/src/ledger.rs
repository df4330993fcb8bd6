//! The processed-order ledger: the ids of orders that have already been dispatched.
//!
//! The ledger is persisted as `{ "orders": [...], "lastUpdate": "<RFC 3339>" }`. It keeps insertion order so that when
//! it grows past [`MAX_LEDGER_SIZE`] entries, only the [`PRUNED_LEDGER_SIZE`] most recent ones are kept. Orders evicted
//! this way could be dispatched again if the store still reports them, which only means a reprint.
use std::{
    collections::{HashSet, VecDeque},
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use dpa_common::OrderId;
use log::*;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::errors::AgentError;

pub const MAX_LEDGER_SIZE: usize = 1000;
pub const PRUNED_LEDGER_SIZE: usize = 500;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerFile {
    orders: Vec<OrderId>,
    last_update: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ProcessedOrderLedger {
    path: PathBuf,
    order: VecDeque<OrderId>,
    index: HashSet<OrderId>,
}

impl ProcessedOrderLedger {
    /// Creates an empty ledger backed by `path`. Nothing is read until [`ProcessedOrderLedger::load`] is called.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf(), order: VecDeque::new(), index: HashSet::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory set with the persisted one. A missing or unreadable file leaves the ledger empty.
    pub fn load(&mut self) {
        self.order.clear();
        self.index.clear();
        if !self.path.exists() {
            info!("📒 No processed-order ledger at {}. Starting with an empty one.", self.path.display());
            return;
        }
        let file = fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str::<LedgerFile>(&s).map_err(|e| e.to_string()));
        match file {
            Ok(file) => {
                for id in file.orders {
                    self.insert(id);
                }
                info!(
                    "📒 Loaded {} processed orders from {} (last updated {})",
                    self.len(),
                    self.path.display(),
                    file.last_update
                );
            },
            Err(e) => {
                let path = self.path.display();
                warn!("📒 Could not read the processed-order ledger at {path}. Starting with an empty one. {e}");
            },
        }
    }

    /// Persists the ledger with [`write_atomically`].
    pub fn save(&self) -> Result<(), AgentError> {
        let file = LedgerFile { orders: self.order.iter().cloned().collect(), last_update: Utc::now() };
        let json = serde_json::to_string_pretty(&file)?;
        write_atomically(&self.path, &json)?;
        trace!("📒 Saved {} processed orders to {}", self.len(), self.path.display());
        Ok(())
    }

    pub fn has(&self, id: &OrderId) -> bool {
        self.index.contains(id)
    }

    /// Records `id` as processed. Returns false if it was already there. If the ledger outgrows [`MAX_LEDGER_SIZE`],
    /// it is pruned and persisted straight away.
    pub fn add(&mut self, id: OrderId) -> bool {
        if !self.insert(id) {
            return false;
        }
        if self.order.len() > MAX_LEDGER_SIZE {
            self.prune();
            if let Err(e) = self.save() {
                error!("📒 Could not save the processed-order ledger after pruning. {e}");
            }
        }
        true
    }

    /// Empties the ledger and persists the empty set.
    pub fn clear(&mut self) -> Result<(), AgentError> {
        self.order.clear();
        self.index.clear();
        info!("📒 Processed-order ledger cleared");
        self.save()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in the order they were added, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &OrderId> {
        self.order.iter()
    }

    fn insert(&mut self, id: OrderId) -> bool {
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.order.push_back(id);
        true
    }

    fn prune(&mut self) {
        let excess = self.order.len().saturating_sub(PRUNED_LEDGER_SIZE);
        for id in self.order.drain(..excess) {
            self.index.remove(&id);
        }
        info!("📒 Pruned {excess} old entries from the processed-order ledger");
    }
}

/// Writes `contents` to a temporary file next to `path` and moves it into place, so a crash mid-write never leaves a
/// truncated file behind.
pub(crate) fn write_atomically(path: &Path, contents: &str) -> Result<(), AgentError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| AgentError::PersistenceError(e.to_string()))?;
    Ok(())
}
