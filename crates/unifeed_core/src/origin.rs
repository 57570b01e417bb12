/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::collections::HashMap;
use std::sync::Arc;

/// Supported origin kinds. Closed set: validation rules and text limits are
/// matched on the kind, nothing is dispatched through open inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginKind {
    Unknown,
    ActivityPub,
    StatusNet,
    Pumpio,
}

impl OriginKind {
    pub fn text_limit(self) -> usize {
        match self {
            OriginKind::Unknown => 0,
            OriginKind::ActivityPub => 5000,
            OriginKind::StatusNet => 200,
            OriginKind::Pumpio => 5000,
        }
    }
}

/// One federated source: its own id namespace and its own validation rules.
#[derive(Debug, Clone)]
pub struct Origin {
    pub id: i64,
    pub kind: OriginKind,
    pub name: String,
    pub host: String,
}

impl Origin {
    pub fn new(id: i64, kind: OriginKind, name: impl Into<String>, host: impl Into<String>) -> Origin {
        Origin {
            id,
            kind,
            name: name.into(),
            host: host.into(),
        }
    }

    pub fn empty() -> Origin {
        Origin {
            id: 0,
            kind: OriginKind::Unknown,
            name: String::new(),
            host: String::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.id != 0 && self.kind != OriginKind::Unknown && !self.name.is_empty()
    }

    /// Whether `username` is syntactically acceptable on this origin.
    /// Pump.io-style origins address users by `user@host`, so a valid username
    /// there is itself a WebFinger-shaped id.
    pub fn is_username_valid(&self, username: &str) -> bool {
        if username.is_empty() {
            return false;
        }
        match self.kind {
            OriginKind::Unknown => false,
            OriginKind::ActivityPub => username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_'),
            OriginKind::StatusNet => username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "_./()-".contains(c)),
            OriginKind::Pumpio => crate::actor::is_webfinger_id_valid(username),
        }
    }

    pub fn text_limit(&self) -> usize {
        self.kind.text_limit()
    }

    pub fn characters_left(&self, text: &str) -> i64 {
        self.text_limit() as i64 - text.chars().count() as i64
    }
}

impl PartialEq for Origin {
    fn eq(&self, other: &Origin) -> bool {
        self.id == other.id
    }
}

impl Eq for Origin {}

impl std::hash::Hash for Origin {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

pub fn host_is_valid(host: &str) -> bool {
    !host.is_empty()
        && host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

/// Origin id to shared record, for row hydration. Unknown ids resolve to the
/// empty origin, never to an error.
pub struct OriginRegistry {
    by_id: HashMap<i64, Arc<Origin>>,
    empty: Arc<Origin>,
}

impl OriginRegistry {
    pub fn new(origins: impl IntoIterator<Item = Origin>) -> OriginRegistry {
        let by_id = origins
            .into_iter()
            .map(|o| (o.id, Arc::new(o)))
            .collect();
        OriginRegistry {
            by_id,
            empty: Arc::new(Origin::empty()),
        }
    }

    pub fn from_id(&self, id: i64) -> Arc<Origin> {
        self.by_id.get(&id).cloned().unwrap_or_else(|| self.empty.clone())
    }

    pub fn empty_origin(&self) -> Arc<Origin> {
        self.empty.clone()
    }
}
