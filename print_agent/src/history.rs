//! A rolling local history of the orders the agent has dispatched, newest first.
use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use dpa_common::OrderId;
use log::*;
use serde::{Deserialize, Serialize};
use woo_tools::Order;

use crate::{errors::AgentError, ledger::write_atomically};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintStatus {
    Printed,
    Failed,
}

/// A local copy of an order, annotated with what happened when it was printed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub order: Order,
    pub printed_at: DateTime<Utc>,
    pub print_status: PrintStatus,
}

#[derive(Debug)]
pub struct OrderHistory {
    path: PathBuf,
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl OrderHistory {
    pub fn new<P: AsRef<Path>>(path: P, capacity: usize) -> Self {
        Self { path: path.as_ref().to_path_buf(), capacity: capacity.max(1), entries: VecDeque::new() }
    }

    pub fn load(&mut self) {
        self.entries.clear();
        if !self.path.exists() {
            debug!("🖨️ No order history at {}", self.path.display());
            return;
        }
        let entries = fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str::<Vec<HistoryEntry>>(&s).map_err(|e| e.to_string()));
        match entries {
            Ok(entries) => {
                self.entries = entries.into_iter().take(self.capacity).collect();
                debug!("🖨️ Loaded {} history entries", self.entries.len());
            },
            Err(e) => warn!("🖨️ Could not read the order history at {}. Starting afresh. {e}", self.path.display()),
        }
    }

    pub fn save(&self) -> Result<(), AgentError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        write_atomically(&self.path, &json)
    }

    /// Adds `order` to the front of the history. A reprinted order replaces its earlier entry.
    pub fn record(&mut self, order: Order, print_status: PrintStatus) -> &HistoryEntry {
        self.entries.retain(|e| e.order.id != order.id);
        self.entries.push_front(HistoryEntry { order, printed_at: Utc::now(), print_status });
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn find(&self, id: &OrderId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| &e.order.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
