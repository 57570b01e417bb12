/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::actor::Actor;
use crate::actor_cache::ActorCache;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// Fire-and-forget request for the full profile of an actor that was used
/// but found incomplete.
#[derive(Debug, Clone)]
pub struct ProfileFetchRequest {
    pub local_id: i64,
    pub origin_id: i64,
    pub username: String,
    pub webfinger_id: String,
}

/// The network collaborator. How profiles are actually fetched is not this
/// crate's concern.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// `None` when the origin doesn't know the actor.
    async fn fetch_profile(&self, req: &ProfileFetchRequest) -> Result<Option<Actor>>;
}

#[derive(Clone)]
pub struct ProfileFetchHandle {
    tx: mpsc::UnboundedSender<ProfileFetchRequest>,
    in_flight: Arc<Mutex<HashSet<i64>>>,
}

impl ProfileFetchHandle {
    /// Never blocks. Requests for an id already in flight are dropped.
    pub fn request(&self, req: ProfileFetchRequest) {
        if req.local_id != 0 && !self.in_flight.lock().unwrap().insert(req.local_id) {
            return;
        }
        let _ = self.tx.send(req);
    }

    pub fn request_actor(&self, actor: &Actor) {
        self.request(ProfileFetchRequest {
            local_id: actor.local_id,
            origin_id: actor.origin.id,
            username: actor.username().to_string(),
            webfinger_id: actor.webfinger_id().to_string(),
        });
    }
}

/// Drains fetch requests and feeds every fetched record back through
/// `cache.offer`. A failed fetch stays a resolution miss: logged, dropped,
/// not retried here.
pub fn start_profile_fetch_worker(
    mut shutdown: watch::Receiver<bool>,
    source: Arc<dyn ProfileSource>,
    cache: Arc<ActorCache>,
) -> ProfileFetchHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<ProfileFetchRequest>();
    let in_flight = Arc::new(Mutex::new(HashSet::new()));
    let handle = ProfileFetchHandle {
        tx,
        in_flight: in_flight.clone(),
    };
    tokio::spawn(async move {
        loop {
            tokio::select! {
                req = rx.recv() => {
                    let Some(req) = req else { break };
                    let res = source.fetch_profile(&req).await;
                    if req.local_id != 0 {
                        in_flight.lock().unwrap().remove(&req.local_id);
                    }
                    match res {
                        Ok(Some(actor)) => {
                            cache.offer(Arc::new(actor));
                        }
                        Ok(None) => {
                            debug!("profile fetch: actor {} unknown upstream", req.local_id);
                        }
                        Err(e) => {
                            warn!("profile fetch for actor {} failed: {e:#}", req.local_id);
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    });
    handle
}
