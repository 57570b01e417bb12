/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::env;
use unifeed_core::actor::Actor;
use unifeed_core::config::CoreConfig;
use unifeed_core::context::CoreContext;
use unifeed_core::origin::{Origin, OriginKind};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let reply_only = if let Some(pos) = args.iter().position(|a| a == "--reply-only") {
        args.remove(pos);
        true
    } else {
        false
    };
    if args.len() < 3 {
        anyhow::bail!("usage: dev_extract_mentions [--reply-only] <db_path> <origin_host> <text>");
    }
    let db_path = args.remove(0);
    let host = args.remove(0);
    let text = args.join(" ");

    let origin = Origin::new(1, OriginKind::ActivityPub, "dev", host);
    let ctx = CoreContext::open(&db_path, vec![origin], CoreConfig::default())?;

    let author = std::sync::Arc::new(Actor::from_origin_and_oid(ctx.origins.from_id(1), ""));
    let nobody = std::sync::Arc::new(Actor::empty());
    let mentions = ctx
        .mention_extractor()
        .extract(&author, &text, reply_only, &nobody);

    println!("mentions={}", mentions.len());
    for actor in mentions {
        println!(
            "{} local_id={} partially_defined={}",
            actor.name_preferably_webfinger_id(),
            actor.local_id,
            actor.is_partially_defined()
        );
    }
    Ok(())
}
