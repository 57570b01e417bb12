/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::actor::{Actor, AvatarFile};
use crate::origin::OriginRegistry;
use crate::store::ActorStore;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct ActorDb {
    path: PathBuf,
    origins: Arc<OriginRegistry>,
}

impl ActorDb {
    pub fn open(db_path: impl AsRef<Path>, origins: Arc<OriginRegistry>) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&path).with_context(|| format!("open db: {}", path.display()))?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS actors (
              actor_id INTEGER PRIMARY KEY AUTOINCREMENT,
              origin_id INTEGER NOT NULL,
              actor_oid TEXT NOT NULL,
              username TEXT NOT NULL DEFAULT '',
              webfinger_id TEXT NOT NULL DEFAULT '',
              real_name TEXT NOT NULL DEFAULT '',
              profile_url TEXT NOT NULL DEFAULT '',
              homepage TEXT NOT NULL DEFAULT '',
              avatar_url TEXT NOT NULL DEFAULT '',
              notes_count INTEGER NOT NULL DEFAULT 0,
              favorites_count INTEGER NOT NULL DEFAULT 0,
              following_count INTEGER NOT NULL DEFAULT 0,
              followers_count INTEGER NOT NULL DEFAULT 0,
              created_date_ms INTEGER NOT NULL DEFAULT 0,
              updated_date_ms INTEGER NOT NULL DEFAULT 0,
              avatar_file_url TEXT NOT NULL DEFAULT '',
              avatar_downloaded_ms INTEGER NOT NULL DEFAULT 0,
              latest_activity_id INTEGER NOT NULL DEFAULT 0,
              UNIQUE(origin_id, actor_oid)
            );
            CREATE INDEX IF NOT EXISTS idx_actors_webfinger ON actors(origin_id, webfinger_id);
            CREATE INDEX IF NOT EXISTS idx_actors_username ON actors(origin_id, username);
            "#,
        )
        .context("create actors schema")?;
        Ok(Self { path, origins })
    }

    pub fn health_check(&self) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    /// Upsert keyed by (origin_id, actor_oid). A record with no oid yet is
    /// stored under its synthesized placeholder, so repeated saves of the
    /// same unresolved mention land on one row. Returns the row id.
    pub fn save_actor(&self, actor: &Actor) -> Result<i64> {
        let oid = if actor.oid.is_empty() {
            actor.temp_oid()
        } else {
            actor.oid.clone()
        };
        let conn = Connection::open(&self.path)?;
        conn.execute(
            r#"
            INSERT INTO actors (
              origin_id, actor_oid, username, webfinger_id, real_name,
              profile_url, homepage, avatar_url,
              notes_count, favorites_count, following_count, followers_count,
              created_date_ms, updated_date_ms,
              avatar_file_url, avatar_downloaded_ms, latest_activity_id
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17)
            ON CONFLICT(origin_id, actor_oid) DO UPDATE SET
              username=excluded.username,
              webfinger_id=excluded.webfinger_id,
              real_name=excluded.real_name,
              profile_url=excluded.profile_url,
              homepage=excluded.homepage,
              avatar_url=excluded.avatar_url,
              notes_count=excluded.notes_count,
              favorites_count=excluded.favorites_count,
              following_count=excluded.following_count,
              followers_count=excluded.followers_count,
              created_date_ms=excluded.created_date_ms,
              updated_date_ms=MAX(actors.updated_date_ms, excluded.updated_date_ms),
              avatar_file_url=excluded.avatar_file_url,
              avatar_downloaded_ms=excluded.avatar_downloaded_ms,
              latest_activity_id=excluded.latest_activity_id
            "#,
            params![
                actor.origin.id,
                oid,
                actor.username(),
                actor.webfinger_id(),
                actor.real_name(),
                actor.profile_url(),
                actor.homepage,
                actor.avatar_url,
                actor.notes_count,
                actor.favorites_count,
                actor.following_count,
                actor.followers_count,
                actor.created_date(),
                actor.updated_date(),
                actor.avatar_file.url,
                actor.avatar_file.downloaded_date,
                actor.latest_activity_id,
            ],
        )
        .context("save actor")?;
        let id: i64 = conn.query_row(
            "SELECT actor_id FROM actors WHERE origin_id=?1 AND actor_oid=?2",
            params![actor.origin.id, oid],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    pub fn find_local_id(&self, origin_id: i64, oid: &str) -> Result<i64> {
        if oid.is_empty() {
            return Ok(0);
        }
        let conn = Connection::open(&self.path)?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT actor_id FROM actors WHERE origin_id=?1 AND actor_oid=?2",
                params![origin_id, oid],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id.unwrap_or(0))
    }

    pub fn find_local_id_by_webfinger(&self, origin_id: i64, webfinger_id: &str) -> Result<i64> {
        if webfinger_id.is_empty() {
            return Ok(0);
        }
        let conn = Connection::open(&self.path)?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT actor_id FROM actors WHERE origin_id=?1 AND webfinger_id=?2",
                params![origin_id, webfinger_id.to_lowercase()],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id.unwrap_or(0))
    }

    pub fn find_local_id_by_username(&self, origin_id: i64, username: &str) -> Result<i64> {
        if username.is_empty() {
            return Ok(0);
        }
        let conn = Connection::open(&self.path)?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT actor_id FROM actors WHERE origin_id=?1 AND username=?2",
                params![origin_id, username],
                |r| r.get(0),
            )
            .optional()?;
        Ok(id.unwrap_or(0))
    }

    /// Full row hydration.
    pub fn load_actor_row(&self, local_id: i64) -> Result<Option<Actor>> {
        if local_id == 0 {
            return Ok(None);
        }
        let conn = Connection::open(&self.path)?;
        conn.query_row(
            r#"
            SELECT origin_id, actor_oid, username, webfinger_id, real_name,
                   profile_url, homepage, avatar_url,
                   notes_count, favorites_count, following_count, followers_count,
                   created_date_ms, updated_date_ms,
                   avatar_file_url, avatar_downloaded_ms, latest_activity_id
            FROM actors WHERE actor_id=?1
            "#,
            params![local_id],
            |r| {
                let origin_id: i64 = r.get(0)?;
                let oid: String = r.get(1)?;
                let username: String = r.get(2)?;
                let webfinger_id: String = r.get(3)?;
                let real_name: String = r.get(4)?;
                let profile_url: String = r.get(5)?;
                let homepage: String = r.get(6)?;
                let avatar_url: String = r.get(7)?;
                let origin = self.origins.from_id(origin_id);
                let mut actor = Actor::from_origin_and_id(origin, local_id, &oid)
                    .with_profile_url(&profile_url)
                    .with_username(&username)
                    .with_webfinger_id(&webfinger_id)
                    .with_real_name(&real_name);
                actor.homepage = homepage;
                actor.avatar_url = avatar_url;
                actor.notes_count = r.get(8)?;
                actor.favorites_count = r.get(9)?;
                actor.following_count = r.get(10)?;
                actor.followers_count = r.get(11)?;
                let created: i64 = r.get(12)?;
                let updated: i64 = r.get(13)?;
                actor = actor.with_created(created).with_updated(updated);
                actor.avatar_file = AvatarFile {
                    url: r.get(14)?,
                    downloaded_date: r.get(15)?,
                };
                actor.latest_activity_id = r.get(16)?;
                Ok(actor)
            },
        )
        .optional()
        .map_err(Into::into)
    }
}

/// Lookup misses and store failures both answer "not found"; failures are
/// logged here and nowhere else.
impl ActorStore for ActorDb {
    fn find_local_id(&self, origin_id: i64, oid: &str) -> i64 {
        ActorDb::find_local_id(self, origin_id, oid).unwrap_or_else(|e| {
            warn!("actor lookup by oid failed: {e:#}");
            0
        })
    }

    fn find_local_id_by_webfinger(&self, origin_id: i64, webfinger_id: &str) -> i64 {
        ActorDb::find_local_id_by_webfinger(self, origin_id, webfinger_id).unwrap_or_else(|e| {
            warn!("actor lookup by webfinger failed: {e:#}");
            0
        })
    }

    fn find_local_id_by_username(&self, origin_id: i64, username: &str) -> i64 {
        ActorDb::find_local_id_by_username(self, origin_id, username).unwrap_or_else(|e| {
            warn!("actor lookup by username failed: {e:#}");
            0
        })
    }

    fn load_actor(&self, local_id: i64) -> Option<Actor> {
        match self.load_actor_row(local_id) {
            Ok(found) => found,
            Err(e) => {
                warn!("load actor {local_id} failed: {e:#}");
                None
            }
        }
    }
}

pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
