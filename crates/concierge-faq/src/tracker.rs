// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded per-sender reply history.
//!
//! Appends for one sender are atomic with respect to each other. Two replies
//! to the same sender computed concurrently may both observe the same count.

use std::collections::VecDeque;

use concierge_core::ResponseCategory;
use dashmap::DashMap;

/// One reply sent to a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub text: String,
    pub category: ResponseCategory,
}

/// In-memory map of sender id to their most recent replies.
#[derive(Debug)]
pub struct ConversationTracker {
    histories: DashMap<String, VecDeque<Exchange>>,
    limit: usize,
}

impl ConversationTracker {
    /// Keeps at most `limit` replies per sender.
    pub fn new(limit: usize) -> Self {
        Self {
            histories: DashMap::new(),
            limit,
        }
    }

    /// Appends a reply, dropping the oldest entries beyond the limit.
    pub fn record(&self, sender_id: &str, text: impl Into<String>, category: ResponseCategory) {
        let mut history = self.histories.entry(sender_id.to_string()).or_default();
        history.push_back(Exchange {
            text: text.into(),
            category,
        });
        while history.len() > self.limit {
            history.pop_front();
        }
    }

    /// Replies currently held for `sender_id`; 0 for unseen senders.
    pub fn count(&self, sender_id: &str) -> usize {
        self.histories.get(sender_id).map_or(0, |h| h.len())
    }

    /// Snapshot of a sender's history, oldest first.
    pub fn history(&self, sender_id: &str) -> Vec<Exchange> {
        self.histories
            .get(sender_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of senders with any history.
    pub fn sender_count(&self) -> usize {
        self.histories.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
