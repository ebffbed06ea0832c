use super::model::HistoricalEntry;

/// Oldest entries are evicted first once the log is full.
pub const MAX_HISTORY_ENTRIES: usize = 500;

/// FIFO log of historical entries, bounded at [`MAX_HISTORY_ENTRIES`].
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoricalEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        HistoryLog::default()
    }

    /// Rebuild a log from persisted entries. Anything past the cap is
    /// dropped from the front so the newest entries survive.
    pub fn from_entries(mut entries: Vec<HistoricalEntry>) -> Self {
        if entries.len() > MAX_HISTORY_ENTRIES {
            let excess = entries.len() - MAX_HISTORY_ENTRIES;
            entries.drain(..excess);
        }
        HistoryLog { entries }
    }

    /// Append an entry, evicting the oldest one when the log is full.
    pub fn append(&mut self, entry: HistoricalEntry) {
        if self.entries.len() >= MAX_HISTORY_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoricalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
