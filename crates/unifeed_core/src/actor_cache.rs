/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::actor::Actor;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Best-known actor record per local id, shared between loader threads and
/// the rendering thread. Entries are replaced, never mutated in place; the
/// merge comparison always runs against whatever is present at write time,
/// so a lost race can only be superseded by a better record, not by a worse
/// one. `get`/`offer` do no I/O.
pub struct ActorCache {
    empty: Arc<Actor>,
    map: RwLock<HashMap<i64, Arc<Actor>>>,
}

impl ActorCache {
    pub fn new() -> ActorCache {
        ActorCache {
            empty: Arc::new(Actor::empty()),
            map: RwLock::new(HashMap::new()),
        }
    }

    /// The well-known empty record. Callers treat it as "not yet known
    /// locally", not as a failure.
    pub fn empty_actor(&self) -> Arc<Actor> {
        self.empty.clone()
    }

    pub fn get(&self, local_id: i64) -> Arc<Actor> {
        if local_id == 0 {
            return self.empty.clone();
        }
        let map = self.map.read().unwrap();
        map.get(&local_id).cloned().unwrap_or_else(|| self.empty.clone())
    }

    /// Returns whichever of {candidate, cached} wins the merge comparison,
    /// installing the candidate when it wins. Offering a record with no local
    /// id is a no-op and hands the candidate back.
    pub fn offer(&self, candidate: Arc<Actor>) -> Arc<Actor> {
        if candidate.local_id == 0 {
            return candidate;
        }
        let mut map = self.map.write().unwrap();
        match map.get(&candidate.local_id) {
            Some(cached) if Arc::ptr_eq(cached, &candidate) => candidate,
            Some(cached) if !candidate.is_better_to_cache_than(cached) => cached.clone(),
            _ => {
                map.insert(candidate.local_id, candidate.clone());
                candidate
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.map.write().unwrap().clear();
    }
}

impl Default for ActorCache {
    fn default() -> ActorCache {
        ActorCache::new()
    }
}
