use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;

/// Maximum retained entries
const HISTORY_CAP: usize = 10;

/// One recorded forwarder invocation for the dashboard playground
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsHistoryEntry {
    pub id: String,
    /// Base64 `data:audio/mpeg` URL
    pub audio: String,
    pub timestamp: String,
    pub voice: String,
    pub text: String,
    /// Approximate seconds, derived from byte length
    pub duration: usize,
    pub api_key: String,
    pub api_key_name: String,
}

/// Bounded in-memory log of recent synthesis calls, newest first
///
/// Owned by the composition root and handed to request handlers; not
/// persisted, lost on restart. The mutex guards short, non-awaiting
/// critical sections only.
#[derive(Debug, Default)]
pub struct TtsHistory {
    entries: Mutex<VecDeque<TtsHistoryEntry>>,
}

impl TtsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry, evicting the oldest beyond the cap
    pub fn record(&self, entry: TtsHistoryEntry) {
        let mut entries = self.entries.lock().expect("history lock poisoned");
        entries.push_front(entry);
        entries.truncate(HISTORY_CAP);
    }

    /// All entries, newest first
    pub fn list(&self) -> Vec<TtsHistoryEntry> {
        self.entries.lock().expect("history lock poisoned").iter().cloned().collect()
    }

    /// Remove an entry by id; false when no entry matches
    pub fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.lock().expect("history lock poisoned");
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.entries.lock().expect("history lock poisoned").clear();
    }
}
