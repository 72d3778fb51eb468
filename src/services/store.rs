//! Notification store.
//!
//! Canonical, ordered collection of notifications, most recent first.
//! `replace_all` installs a backlog snapshot atomically, `prepend` adds one
//! live event to the front. Both validate their input and never leave the
//! collection half-updated.

use std::collections::{HashSet, VecDeque, vec_deque};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Notification, NotificationId, RawNotification};

/// How repeated source ids are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep every occurrence, duplicates included
    #[default]
    None,
    /// Drop notifications whose source id is already held
    SourceId,
}

impl DedupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DedupPolicy::None => "none",
            DedupPolicy::SourceId => "source_id",
        }
    }
}

impl std::str::FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(DedupPolicy::None),
            "source_id" | "id" => Ok(DedupPolicy::SourceId),
            _ => Err(format!(
                "Invalid dedup policy '{}'. Valid policies are: none, source_id",
                s
            )),
        }
    }
}

/// Counts reported by [`NotificationStore::replace_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    pub accepted: usize,
    pub malformed: usize,
    pub duplicates: usize,
}

impl ReplaceOutcome {
    pub fn dropped(&self) -> usize {
        self.malformed + self.duplicates
    }
}

/// Read-only iterator over the stored notifications, most recent first.
pub type Snapshot<'a> = vec_deque::Iter<'a, Notification>;

#[derive(Debug, Default)]
pub struct NotificationStore {
    items: VecDeque<Notification>,
    source_ids: HashSet<String>,
    next_seq: u64,
    dedup: DedupPolicy,
}

impl NotificationStore {
    pub fn new(dedup: DedupPolicy) -> Self {
        Self {
            dedup,
            ..Default::default()
        }
    }

    pub fn dedup_policy(&self) -> DedupPolicy {
        self.dedup
    }

    /// Replace the whole collection with a backlog snapshot, in the order given.
    ///
    /// Malformed items are dropped individually. The synthetic sequence
    /// restarts at zero, so replaying the same backlog twice produces the
    /// same state, synthetic ids included.
    pub fn replace_all<I>(&mut self, items: I) -> ReplaceOutcome
    where
        I: IntoIterator<Item = RawNotification>,
    {
        let mut outcome = ReplaceOutcome::default();
        let mut fresh = VecDeque::new();
        let mut seen = HashSet::new();
        let mut next_seq = 0;

        for (index, raw) in items.into_iter().enumerate() {
            let mut notification = match raw.validate() {
                Ok(notification) => notification,
                Err(error) => {
                    tracing::warn!(index, error = %error, "Dropping malformed backlog item");
                    outcome.malformed += 1;
                    continue;
                }
            };

            if let Some(id) = notification.source_id() {
                if !seen.insert(id.to_string()) && self.dedup == DedupPolicy::SourceId {
                    tracing::debug!(index, id, "Dropping duplicate backlog item");
                    outcome.duplicates += 1;
                    continue;
                }
            }

            if notification.id.is_none() {
                notification.id = Some(NotificationId::Synthetic(next_seq));
                next_seq += 1;
            }
            fresh.push_back(notification);
        }

        outcome.accepted = fresh.len();
        self.items = fresh;
        self.source_ids = seen;
        self.next_seq = next_seq;
        outcome
    }

    /// Add one live notification to the front of the collection.
    ///
    /// # Errors
    /// - `AppError::MalformedNotification` if required fields are missing
    /// - `AppError::DuplicateNotification` if the source id is already held
    ///   and the policy is [`DedupPolicy::SourceId`]
    ///
    /// The store is unchanged on error.
    pub fn prepend(&mut self, raw: RawNotification) -> AppResult<&Notification> {
        let mut notification = raw.validate()?;

        if let Some(id) = notification.source_id() {
            if self.dedup == DedupPolicy::SourceId && self.source_ids.contains(id) {
                return Err(AppError::DuplicateNotification { id: id.to_string() });
            }
            self.source_ids.insert(id.to_string());
        }

        if notification.id.is_none() {
            notification.id = Some(NotificationId::Synthetic(self.next_seq));
            self.next_seq += 1;
        }

        self.items.push_front(notification);
        Ok(&self.items[0])
    }

    /// Current collection, most recent first.
    pub fn snapshot(&self) -> Snapshot<'_> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
