/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::actor::Actor;
use crate::actor_cache::ActorCache;
use std::sync::Arc;

/// Contract against the persistent store. A miss is 0 or `None`; a failing
/// store is indistinguishable from a miss, implementations log and answer
/// "not found" rather than surface errors into resolution.
pub trait ActorStore: Send + Sync {
    fn find_local_id(&self, origin_id: i64, oid: &str) -> i64;
    fn find_local_id_by_webfinger(&self, origin_id: i64, webfinger_id: &str) -> i64;
    fn find_local_id_by_username(&self, origin_id: i64, username: &str) -> i64;
    fn load_actor(&self, local_id: i64) -> Option<Actor>;
}

/// Read-through load with cache update: a fully defined cached record is
/// answered as-is, anything weaker is re-read from the store and offered to
/// the cache, and whichever record wins comes back. The store is consulted
/// outside any cache lock.
pub fn load_actor_cached(store: &dyn ActorStore, cache: &ActorCache, local_id: i64) -> Arc<Actor> {
    if local_id == 0 {
        return cache.empty_actor();
    }
    let cached = cache.get(local_id);
    if !cached.is_empty() && !cached.is_partially_defined() {
        return cached;
    }
    match store.load_actor(local_id) {
        Some(actor) => cache.offer(Arc::new(actor)),
        None => cached,
    }
}
