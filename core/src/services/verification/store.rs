//! TTL-aware in-memory store for verification entries
//!
//! Entries are keyed by recipient. Every insert also pushes an expiry record
//! onto a min-heap so that sweeping only touches entries that are due.
//! Records left behind by superseded or consumed entries are recognised by
//! their issuance number and discarded.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use bk_shared::utils::mask_recipient;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::entities::VerificationEntry;

/// Heap size above `2 * entries + COMPACT_SLACK` triggers a rebuild
const COMPACT_SLACK: usize = 1024;

/// Outcome of looking up a recipient at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// No entry stored for the recipient
    Missing,
    /// The entry had expired and has been removed
    Expired(VerificationEntry),
    /// The entry exists but `now` lies before its issuance time
    NotYetValid(VerificationEntry),
    /// The entry is inside its validity window
    Live(VerificationEntry),
}

/// Outcome of inserting an entry
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    /// The entry as stored, with its issuance number assigned
    pub entry: VerificationEntry,
    /// Whether a previous entry for the same recipient was replaced
    pub superseded: bool,
    /// Recipient evicted to make room, if the store was full
    pub evicted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ExpiryRecord {
    expires_at: DateTime<Utc>,
    issue_seq: u64,
    recipient: String,
}

impl ExpiryRecord {
    fn for_entry(entry: &VerificationEntry) -> Self {
        Self {
            expires_at: entry.expires_at,
            issue_seq: entry.issue_seq,
            recipient: entry.recipient.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: HashMap<String, VerificationEntry>,
    expirations: BinaryHeap<Reverse<ExpiryRecord>>,
    next_seq: u64,
}

impl StoreInner {
    fn is_current(&self, record: &ExpiryRecord) -> bool {
        self.entries
            .get(&record.recipient)
            .map(|entry| entry.issue_seq == record.issue_seq)
            .unwrap_or(false)
    }

    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        while let Some(Reverse(record)) = self.expirations.peek() {
            if record.expires_at > now {
                break;
            }
            let Some(Reverse(record)) = self.expirations.pop() else {
                break;
            };
            if self.is_current(&record) {
                self.entries.remove(&record.recipient);
                removed += 1;
            }
        }
        removed
    }

    /// Removes the live entry with the earliest expiry
    fn evict_earliest(&mut self) -> Option<String> {
        while let Some(Reverse(record)) = self.expirations.pop() {
            if self.is_current(&record) {
                self.entries.remove(&record.recipient);
                return Some(record.recipient);
            }
        }
        None
    }

    fn compact_if_needed(&mut self) {
        if self.expirations.len() > self.entries.len() * 2 + COMPACT_SLACK {
            self.expirations = self
                .entries
                .values()
                .map(|entry| Reverse(ExpiryRecord::for_entry(entry)))
                .collect();
        }
    }
}

/// Bounded, expiring store of verification entries
///
/// Owned exclusively by the verification code manager.
#[derive(Debug)]
pub struct VerificationStore {
    inner: Mutex<StoreInner>,
    max_entries: usize,
}

impl VerificationStore {
    /// Create a store holding at most `max_entries` entries
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            max_entries: max_entries.max(1),
        }
    }

    /// Store an entry, replacing any previous entry for the same recipient
    ///
    /// When a new recipient arrives at a full store, expired entries are
    /// swept first and, if that frees nothing, the entry closest to expiry
    /// is evicted.
    pub async fn insert(&self, mut entry: VerificationEntry, now: DateTime<Utc>) -> InsertOutcome {
        let mut inner = self.inner.lock().await;

        let mut evicted = None;
        if !inner.entries.contains_key(&entry.recipient) && inner.entries.len() >= self.max_entries
        {
            let swept = inner.sweep(now);
            if swept == 0 {
                evicted = inner.evict_earliest();
                if let Some(recipient) = &evicted {
                    tracing::warn!(
                        recipient = %mask_recipient(recipient),
                        max_entries = self.max_entries,
                        event = "verification_entry_evicted",
                        "Verification store full, evicted entry closest to expiry"
                    );
                }
            }
        }

        inner.next_seq += 1;
        entry.issue_seq = inner.next_seq;

        inner
            .expirations
            .push(Reverse(ExpiryRecord::for_entry(&entry)));
        let superseded = inner
            .entries
            .insert(entry.recipient.clone(), entry.clone())
            .is_some();
        inner.compact_if_needed();

        InsertOutcome {
            entry,
            superseded,
            evicted,
        }
    }

    /// Look up a recipient, removing the entry if it has expired
    pub async fn lookup(&self, recipient: &str, now: DateTime<Utc>) -> Lookup {
        let mut inner = self.inner.lock().await;

        match inner.entries.get(recipient) {
            None => return Lookup::Missing,
            Some(entry) if !entry.is_expired_at(now) => {
                return if now < entry.issued_at {
                    Lookup::NotYetValid(entry.clone())
                } else {
                    Lookup::Live(entry.clone())
                };
            }
            Some(_) => {}
        }

        match inner.entries.remove(recipient) {
            Some(expired) => Lookup::Expired(expired),
            None => Lookup::Missing,
        }
    }

    /// Current entry for a recipient, expired or not
    pub async fn get(&self, recipient: &str) -> Option<VerificationEntry> {
        self.inner.lock().await.entries.get(recipient).cloned()
    }

    /// Remove the entry for a recipient unconditionally
    pub async fn remove(&self, recipient: &str) -> Option<VerificationEntry> {
        self.inner.lock().await.entries.remove(recipient)
    }

    /// Remove the entry only if it is still the issuance numbered `issue_seq`
    pub async fn remove_if_seq(&self, recipient: &str, issue_seq: u64) -> bool {
        let mut inner = self.inner.lock().await;
        let is_same_issuance = inner
            .entries
            .get(recipient)
            .map(|entry| entry.issue_seq == issue_seq)
            .unwrap_or(false);
        if is_same_issuance {
            inner.entries.remove(recipient);
        }
        is_same_issuance
    }

    /// Remove every entry expired at `now`, returning how many were removed
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        self.inner.lock().await.sweep(now)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) async fn pending_expiry_records(&self) -> usize {
        self.inner.lock().await.expirations.len()
    }
}
