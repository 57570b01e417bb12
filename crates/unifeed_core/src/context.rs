/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::actor_cache::ActorCache;
use crate::actor_db::ActorDb;
use crate::config::CoreConfig;
use crate::mention::MentionExtractor;
use crate::origin::{Origin, OriginRegistry};
use crate::timeline::TimelineContext;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Top-level wiring. The cache, the store and the origin registry are
/// constructed here and injected everywhere else; nothing in the crate is
/// process-global, so tests and embedders can hold as many independent
/// contexts as they like.
pub struct CoreContext {
    pub origins: Arc<OriginRegistry>,
    pub cache: Arc<ActorCache>,
    pub db: Arc<ActorDb>,
    pub config: CoreConfig,
}

impl CoreContext {
    pub fn open(
        db_path: impl AsRef<Path>,
        origins: Vec<Origin>,
        config: CoreConfig,
    ) -> Result<CoreContext> {
        let origins = Arc::new(OriginRegistry::new(origins));
        let db = Arc::new(ActorDb::open(db_path, origins.clone())?);
        Ok(CoreContext {
            origins,
            cache: Arc::new(ActorCache::new()),
            db,
            config,
        })
    }

    pub fn mention_extractor(&self) -> MentionExtractor<'_> {
        MentionExtractor::new(self.db.as_ref(), &self.cache)
    }

    pub fn timeline_context(&self) -> TimelineContext {
        TimelineContext {
            preferred_origin: None,
            dedup: self.config.dedup.clone(),
        }
    }
}
