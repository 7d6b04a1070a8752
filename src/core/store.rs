//! In-memory FIFO membership queue.
//!
//! Members are kept in join order. The store never reorders entries:
//! `add` appends, `remove` drops a single entry in place.

use chrono::{DateTime, Utc};

/// A queued member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    /// Name shown in the rendered queue
    pub display_name: String,

    /// Platform user ID (identity)
    pub member_id: String,

    /// When the member joined; never changes
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(display_name: &str, member_id: &str, joined_at: DateTime<Utc>) -> Self {
        Self {
            display_name: display_name.to_string(),
            member_id: member_id.to_string(),
            joined_at,
        }
    }
}

/// Ordered collection of members, unique by `member_id`.
#[derive(Debug, Default, Clone)]
pub struct QueueStore {
    members: Vec<Member>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member. Returns false without mutating if the ID is already queued.
    pub fn add(&mut self, display_name: &str, member_id: &str, now: DateTime<Utc>) -> bool {
        if self.contains(member_id) {
            return false;
        }
        self.members.push(Member::new(display_name, member_id, now));
        true
    }

    /// Remove a member by ID. Returns false without mutating if absent.
    pub fn remove(&mut self, member_id: &str) -> bool {
        match self.members.iter().position(|m| m.member_id == member_id) {
            Some(idx) => {
                self.members.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m.member_id == member_id)
    }

    pub fn find(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.member_id == member_id)
    }

    /// Current members, earliest joiner first.
    pub fn snapshot(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
