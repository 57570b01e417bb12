/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::env;
use unifeed_core::actor::Actor;
use unifeed_core::config::CoreConfig;
use unifeed_core::context::CoreContext;
use unifeed_core::origin::{Origin, OriginKind};
use unifeed_core::store::load_actor_cached;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let mut args = env::args().skip(1);
    let db_path = args.next().unwrap_or_default();
    let handle = args.next().unwrap_or_default();
    if db_path.trim().is_empty() || handle.trim().is_empty() {
        anyhow::bail!("usage: dev_resolve_actor <db_path> <user@host|username>");
    }
    let handle = handle.trim();

    let origin = Origin::new(1, OriginKind::ActivityPub, "dev", "example.org");
    let ctx = CoreContext::open(&db_path, vec![origin], CoreConfig::default())?;

    let mut probe = Actor::from_origin_and_oid(ctx.origins.from_id(1), "");
    if let Some((user, _host)) = handle.split_once('@') {
        probe = probe.with_webfinger_id(handle).with_username(user);
    } else {
        probe = probe.with_username(handle);
    }

    let local_id = probe.lookup_local_id(ctx.db.as_ref());
    println!("local_id={local_id}");
    if local_id != 0 {
        let actor = load_actor_cached(ctx.db.as_ref(), &ctx.cache, local_id);
        println!("title={}", actor.to_actor_title(true));
        println!("partially_defined={}", actor.is_partially_defined());
    }
    Ok(())
}
