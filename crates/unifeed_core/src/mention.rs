/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::actor::{is_webfinger_id_valid, Actor};
use crate::actor_cache::ActorCache;
use crate::origin::host_is_valid;
use crate::profile_fetch::ProfileFetchHandle;
use crate::store::ActorStore;
use crate::text::strip_html;
use std::sync::Arc;

/// Characters that end an `@name` token. `.` and `@` are deliberately absent:
/// hosts and `user@host` forms extend the token, and validity tracking trims
/// whatever extended too far.
const SEPARATORS: &str = ", ;'=`~!#$%^&*(){}[]/";

pub struct MentionExtractor<'a> {
    store: &'a dyn ActorStore,
    cache: &'a ActorCache,
    fetcher: Option<&'a ProfileFetchHandle>,
}

impl<'a> MentionExtractor<'a> {
    pub fn new(store: &'a dyn ActorStore, cache: &'a ActorCache) -> MentionExtractor<'a> {
        MentionExtractor {
            store,
            cache,
            fetcher: None,
        }
    }

    /// Actors found incomplete during extraction get a fire-and-forget
    /// profile fetch through this handle.
    pub fn with_fetcher(mut self, fetcher: &'a ProfileFetchHandle) -> MentionExtractor<'a> {
        self.fetcher = Some(fetcher);
        self
    }

    /// Scans `text` left to right for `@name` tokens and resolves each one,
    /// in appearance order, with no two results equal by identity. With
    /// `reply_only` set only a leading `@` counts. From every `@` the token
    /// is extended greedily; the longest prefix that is a valid username on
    /// the author's origin and the longest prefix that is a valid WebFinger
    /// address are tracked independently.
    pub fn extract(
        &self,
        author: &Arc<Actor>,
        text_in: &str,
        reply_only: bool,
        in_reply_to: &Arc<Actor>,
    ) -> Vec<Arc<Actor>> {
        let mut actors: Vec<Arc<Actor>> = Vec::new();
        let text = strip_html(text_in);
        let mut rest = text.as_str();
        while !rest.is_empty() {
            let Some(at_pos) = rest.find('@') else { break };
            if at_pos > 0 && reply_only {
                break;
            }
            let token = &rest[at_pos + 1..];
            let mut valid_username = "";
            let mut valid_webfinger = "";
            let mut end = token.len();
            for (i, ch) in token.char_indices() {
                if SEPARATORS.contains(ch) {
                    end = i;
                    break;
                }
                let prefix = &token[..i + ch.len_utf8()];
                if author.origin.is_username_valid(prefix) {
                    valid_username = prefix;
                }
                if is_webfinger_id_valid(prefix) {
                    valid_webfinger = prefix;
                }
            }
            rest = &token[end..];
            if !valid_webfinger.is_empty() || !valid_username.is_empty() {
                self.add_extracted(&mut actors, author, valid_webfinger, valid_username, in_reply_to);
            }
        }
        actors
    }

    fn add_extracted(
        &self,
        actors: &mut Vec<Arc<Actor>>,
        author: &Arc<Actor>,
        webfinger_id: &str,
        username: &str,
        in_reply_to: &Arc<Actor>,
    ) {
        let origin = author.origin.clone();
        let candidate: Arc<Actor> = if is_webfinger_id_valid(webfinger_id) {
            Arc::new(
                Actor::from_origin_and_oid(origin, "")
                    .with_webfinger_id(webfinger_id)
                    .with_username(username),
            )
        } else if username.eq_ignore_ascii_case(in_reply_to.username()) {
            // The common "replying in thread" case: no lookup needed.
            in_reply_to.clone()
        } else if username.eq_ignore_ascii_case(author.username()) {
            author.clone()
        } else {
            let mut actor = Actor::from_origin_and_oid(origin.clone(), "");
            let mut hosts = vec![author.host()];
            if !hosts.contains(&origin.host) {
                hosts.push(origin.host.clone());
            }
            for host in hosts {
                if !host_is_valid(&host) {
                    continue;
                }
                let possible = format!("{username}@{host}");
                let id = self.store.find_local_id_by_webfinger(origin.id, &possible);
                if id != 0 {
                    actor = actor.with_local_id(id).with_webfinger_id(&possible);
                    break;
                }
            }
            Arc::new(actor.with_username(username))
        };
        let resolved = self.resolve(candidate);
        if !actors.iter().any(|known| **known == *resolved) {
            actors.push(resolved);
        }
    }

    /// Full local-id lookup for the candidate, then the cache gets a say: a
    /// fully defined cached record wins over a fresh stub, otherwise the stub
    /// is offered up. Records still incomplete after all that are queued for
    /// a profile fetch.
    fn resolve(&self, candidate: Arc<Actor>) -> Arc<Actor> {
        let local_id = candidate.lookup_local_id(self.store);
        if local_id == 0 {
            return candidate;
        }
        let cached = self.cache.get(local_id);
        if !cached.is_empty() && !cached.is_partially_defined() {
            return cached;
        }
        let resolved = if candidate.local_id == local_id {
            candidate
        } else {
            Arc::new(candidate.as_ref().clone().with_local_id(local_id))
        };
        let best = self.cache.offer(resolved);
        if best.is_partially_defined() {
            if let Some(fetcher) = self.fetcher {
                fetcher.request_actor(&best);
            }
        }
        best
    }
}
