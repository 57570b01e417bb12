/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::actor::{Actor, SOME_TIME_AGO};
use crate::config::DedupConfig;
use crate::origin::Origin;
use crate::text::to_search_text;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Sync state of the note behind a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    Unknown,
    NeedsUpdate,
    Loaded,
    Draft,
    Sending,
    Deleted,
}

/// Verdict over a pair of entries. `Duplicates` hides this entry in favor of
/// the other; `IsDuplicated` keeps this entry and hides the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicationLink {
    None,
    Duplicates,
    IsDuplicated,
}

/// The local account an entry was downloaded through. Ordered by name so the
/// duplicate tie-break on accounts is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub actor_id: i64,
    pub name: String,
}

impl Account {
    pub fn new(actor_id: i64, name: impl Into<String>) -> Account {
        Account {
            actor_id,
            name: name.into(),
        }
    }

    pub fn empty() -> Account {
        Account::default()
    }

    pub fn is_empty(&self) -> bool {
        self.actor_id == 0 && self.name.is_empty()
    }
}

impl PartialOrd for Account {
    fn partial_cmp(&self, other: &Account) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Account {
    fn cmp(&self, other: &Account) -> Ordering {
        self.name
            .cmp(&other.name)
            .then(self.actor_id.cmp(&other.actor_id))
    }
}

/// Per-timeline settings the linker consults: which origin to prefer when the
/// same note arrived through several, and the content-dedup thresholds.
#[derive(Debug, Clone, Default)]
pub struct TimelineContext {
    pub preferred_origin: Option<Arc<Origin>>,
    pub dedup: DedupConfig,
}

impl TimelineContext {
    pub fn new() -> TimelineContext {
        TimelineContext::default()
    }

    pub fn with_preferred_origin(mut self, origin: Arc<Origin>) -> TimelineContext {
        self.preferred_origin = Some(origin);
        self
    }
}

/// One rendered row of a merged timeline: the note plus the interaction
/// state recorded by whichever account downloaded it. Entries are replaced
/// wholesale on re-render; duplicate linking only ever marks `hidden_by`.
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub note_id: i64,
    pub origin: Arc<Origin>,
    pub author: Arc<Actor>,
    pub in_reply_to_note_id: i64,
    pub in_reply_to_actor: Arc<Actor>,
    pub note_status: DownloadStatus,
    pub favorited: bool,
    pub reblogged: bool,
    /// Actors that boosted this note, id to display name.
    pub rebloggers: HashMap<i64, String>,
    pub linked_account: Account,
    pub updated_date: i64,
    pub activity_updated_date: i64,
    pub content: String,
    pub content_to_search: String,
    /// Note id of the entry this one is hidden behind, when linked away.
    pub hidden_by: Option<i64>,
}

impl TimelineEntry {
    pub fn new(note_id: i64, origin: Arc<Origin>, author: Arc<Actor>) -> TimelineEntry {
        TimelineEntry {
            note_id,
            origin,
            in_reply_to_note_id: 0,
            in_reply_to_actor: Arc::new(Actor::empty()),
            note_status: DownloadStatus::Unknown,
            favorited: false,
            reblogged: false,
            rebloggers: HashMap::new(),
            linked_account: Account::empty(),
            updated_date: 0,
            activity_updated_date: 0,
            content: String::new(),
            content_to_search: String::new(),
            hidden_by: None,
            author,
        }
    }

    pub fn empty() -> TimelineEntry {
        TimelineEntry::new(0, Arc::new(Origin::empty()), Arc::new(Actor::empty()))
    }

    pub fn is_empty(&self) -> bool {
        self.note_id == 0
    }

    pub fn with_content(mut self, name: &str, content: &str) -> TimelineEntry {
        self.content = content.to_string();
        self.content_to_search = to_search_text(name, content);
        self
    }

    pub fn is_reblogged_by_anyone(&self) -> bool {
        !self.rebloggers.is_empty()
    }

    pub fn hide_reblogger(&mut self, actor_id: i64) {
        self.rebloggers.remove(&actor_id);
    }

    fn updated_known(&self) -> bool {
        self.updated_date > SOME_TIME_AGO
    }

    fn too_short_to_compare(&self, cfg: &DedupConfig) -> bool {
        self.content_to_search.chars().count() < cfg.min_chars()
    }

    /// Duplicate verdict against `other`. Verdicts are complementary:
    /// swapping the operands swaps `Duplicates` and `IsDuplicated`, and a
    /// pair tied on every criterion is `None`.
    pub fn duplicates(&self, ctx: &TimelineContext, other: &TimelineEntry) -> DuplicationLink {
        if self.is_empty() || other.is_empty() {
            return DuplicationLink::None;
        }
        if self.note_id == other.note_id {
            self.duplicates_by_favorited_and_reblogged(ctx, other)
        } else {
            self.duplicates_by_content(ctx, other)
        }
    }

    /// Same note, different per-account interaction state: keep the favorited
    /// rendering, then the boosted one, then the preferred origin's, then the
    /// smaller account's, then the one with more boosters behind it.
    fn duplicates_by_favorited_and_reblogged(
        &self,
        ctx: &TimelineContext,
        other: &TimelineEntry,
    ) -> DuplicationLink {
        if self.favorited != other.favorited {
            return if self.favorited {
                DuplicationLink::IsDuplicated
            } else {
                DuplicationLink::Duplicates
            };
        }
        if self.reblogged != other.reblogged {
            return if self.reblogged {
                DuplicationLink::IsDuplicated
            } else {
                DuplicationLink::Duplicates
            };
        }
        if let Some(preferred) = &ctx.preferred_origin {
            if preferred.is_valid() && self.author.origin != other.author.origin {
                if *preferred == self.author.origin {
                    return DuplicationLink::IsDuplicated;
                }
                if *preferred == other.author.origin {
                    return DuplicationLink::Duplicates;
                }
            }
        }
        if self.linked_account != other.linked_account {
            return if self.linked_account <= other.linked_account {
                DuplicationLink::IsDuplicated
            } else {
                DuplicationLink::Duplicates
            };
        }
        match self.rebloggers.len().cmp(&other.rebloggers.len()) {
            Ordering::Greater => DuplicationLink::IsDuplicated,
            Ordering::Less => DuplicationLink::Duplicates,
            Ordering::Equal => DuplicationLink::None,
        }
    }

    /// Different note ids: the same content may have reached the timeline
    /// through two origins or accounts. Guarded by a length floor and an
    /// update-time window so unrelated short posts don't collapse.
    fn duplicates_by_content(&self, ctx: &TimelineContext, other: &TimelineEntry) -> DuplicationLink {
        let cfg = &ctx.dedup;
        if self.too_short_to_compare(cfg) || other.too_short_to_compare(cfg) {
            return DuplicationLink::None;
        }
        if self.updated_known()
            && other.updated_known()
            && (self.updated_date - other.updated_date).abs() >= cfg.window_ms()
        {
            return DuplicationLink::None;
        }
        if self.content_to_search == other.content_to_search {
            if self.updated_date == other.updated_date {
                return self.duplicates_by_favorited_and_reblogged(ctx, other);
            }
            // The earlier rendering is canonical.
            return if self.updated_date < other.updated_date {
                DuplicationLink::IsDuplicated
            } else {
                DuplicationLink::Duplicates
            };
        }
        if self.content_to_search.contains(&other.content_to_search) {
            return DuplicationLink::IsDuplicated;
        }
        if other.content_to_search.contains(&self.content_to_search) {
            return DuplicationLink::Duplicates;
        }
        DuplicationLink::None
    }
}

/// Hide pass over a freshly merged page: links every still-visible pair and
/// records the loser's `hidden_by`. Nothing is removed.
pub fn mark_duplicates(entries: &mut [TimelineEntry], ctx: &TimelineContext) {
    for i in 0..entries.len() {
        if entries[i].hidden_by.is_some() {
            continue;
        }
        for j in (i + 1)..entries.len() {
            if entries[j].hidden_by.is_some() {
                continue;
            }
            let link = entries[i].duplicates(ctx, &entries[j]);
            match link {
                DuplicationLink::Duplicates => {
                    let keeper = entries[j].note_id;
                    entries[i].hidden_by = Some(keeper);
                    break;
                }
                DuplicationLink::IsDuplicated => {
                    let keeper = entries[i].note_id;
                    entries[j].hidden_by = Some(keeper);
                }
                DuplicationLink::None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::OriginKind;

    fn origin(id: i64) -> Arc<Origin> {
        Arc::new(Origin::new(
            id,
            OriginKind::ActivityPub,
            format!("origin{id}"),
            format!("o{id}.example.org"),
        ))
    }

    fn author(origin: &Arc<Origin>, local_id: i64) -> Arc<Actor> {
        Arc::new(
            Actor::from_origin_and_id(
                origin.clone(),
                local_id,
                &format!("https://{}/users/u{local_id}", origin.host),
            )
            .with_username(&format!("u{local_id}")),
        )
    }

    fn entry(note_id: i64, content: &str) -> TimelineEntry {
        let o = origin(1);
        let a = author(&o, 10);
        TimelineEntry::new(note_id, o, a)
            .with_content("", content)
    }

    fn ctx() -> TimelineContext {
        TimelineContext::new()
    }

    #[test]
    fn empty_entries_never_link() {
        let a = entry(1, "some note text");
        assert_eq!(a.duplicates(&ctx(), &TimelineEntry::empty()), DuplicationLink::None);
        assert_eq!(TimelineEntry::empty().duplicates(&ctx(), &a), DuplicationLink::None);
    }

    #[test]
    fn link_with_itself_is_none() {
        let a = entry(1, "some note text");
        assert_eq!(a.duplicates(&ctx(), &a.clone()), DuplicationLink::None);
    }

    #[test]
    fn favorited_rendering_is_kept() {
        let plain = entry(5, "same note everywhere");
        let mut faved = entry(5, "same note everywhere");
        faved.favorited = true;
        assert_eq!(plain.duplicates(&ctx(), &faved), DuplicationLink::Duplicates);
        assert_eq!(faved.duplicates(&ctx(), &plain), DuplicationLink::IsDuplicated);
    }

    #[test]
    fn reblogged_rendering_is_kept_after_favorited() {
        let mut boosted = entry(5, "same note everywhere");
        boosted.reblogged = true;
        let plain = entry(5, "same note everywhere");
        assert_eq!(boosted.duplicates(&ctx(), &plain), DuplicationLink::IsDuplicated);

        // favorited is checked first
        let mut faved = entry(5, "same note everywhere");
        faved.favorited = true;
        assert_eq!(boosted.duplicates(&ctx(), &faved), DuplicationLink::Duplicates);
    }

    #[test]
    fn preferred_origin_wins_for_same_note() {
        let o1 = origin(1);
        let o2 = origin(2);
        let a = TimelineEntry::new(5, o1.clone(), author(&o1, 10)).with_content("", "same note everywhere");
        let b = TimelineEntry::new(5, o2.clone(), author(&o2, 20)).with_content("", "same note everywhere");
        let ctx = TimelineContext::new().with_preferred_origin(o2);
        assert_eq!(a.duplicates(&ctx, &b), DuplicationLink::Duplicates);
        assert_eq!(b.duplicates(&ctx, &a), DuplicationLink::IsDuplicated);
    }

    #[test]
    fn smaller_account_is_kept() {
        let mut a = entry(5, "same note everywhere");
        a.linked_account = Account::new(1, "acct-a");
        let mut b = entry(5, "same note everywhere");
        b.linked_account = Account::new(2, "acct-b");
        assert_eq!(a.duplicates(&ctx(), &b), DuplicationLink::IsDuplicated);
        assert_eq!(b.duplicates(&ctx(), &a), DuplicationLink::Duplicates);
    }

    #[test]
    fn more_boosters_is_kept() {
        let mut a = entry(5, "same note everywhere");
        a.rebloggers.insert(31, "u31".into());
        a.rebloggers.insert(32, "u32".into());
        let mut b = entry(5, "same note everywhere");
        b.rebloggers.insert(31, "u31".into());
        assert_eq!(a.duplicates(&ctx(), &b), DuplicationLink::IsDuplicated);
        assert_eq!(b.duplicates(&ctx(), &a), DuplicationLink::Duplicates);
    }

    #[test]
    fn identical_content_keeps_the_earlier_entry() {
        let mut a = entry(5, "the very same words in both");
        a.updated_date = 1_000_000;
        let mut b = entry(6, "the very same words in both");
        b.updated_date = 1_000_000 + 10 * 60 * 1000;
        assert_eq!(a.duplicates(&ctx(), &b), DuplicationLink::IsDuplicated);
        assert_eq!(b.duplicates(&ctx(), &a), DuplicationLink::Duplicates);
    }

    #[test]
    fn short_content_never_links() {
        let mut a = entry(5, "hey");
        a.updated_date = 1_000_000;
        let mut b = entry(6, "hey");
        b.updated_date = 1_000_000;
        assert_eq!(a.duplicates(&ctx(), &b), DuplicationLink::None);
    }

    #[test]
    fn day_apart_content_never_links() {
        let mut a = entry(5, "the very same words in both");
        a.updated_date = 1_000_000;
        let mut b = entry(6, "the very same words in both");
        b.updated_date = 1_000_000 + 24 * 3600 * 1000;
        assert_eq!(a.duplicates(&ctx(), &b), DuplicationLink::None);
        assert_eq!(b.duplicates(&ctx(), &a), DuplicationLink::None);
    }

    #[test]
    fn superstring_is_kept() {
        let mut long = entry(5, "a reposted note with an added comment");
        long.updated_date = 1_000;
        let mut short = entry(6, "reposted note");
        short.updated_date = 1_000;
        assert_eq!(long.duplicates(&ctx(), &short), DuplicationLink::IsDuplicated);
        assert_eq!(short.duplicates(&ctx(), &long), DuplicationLink::Duplicates);
    }

    #[test]
    fn unrelated_content_never_links() {
        let mut a = entry(5, "completely different words");
        a.updated_date = 1_000;
        let mut b = entry(6, "another unrelated message");
        b.updated_date = 1_000;
        assert_eq!(a.duplicates(&ctx(), &b), DuplicationLink::None);
    }

    #[test]
    fn unknown_timestamps_skip_the_window_check() {
        let a = entry(5, "the very same words in both");
        let mut b = entry(6, "the very same words in both");
        b.updated_date = 30 * 24 * 3600 * 1000;
        // a's date was never set: no window rejection, content still compares
        assert_eq!(a.duplicates(&ctx(), &b), DuplicationLink::IsDuplicated);
        assert_eq!(b.duplicates(&ctx(), &a), DuplicationLink::Duplicates);
    }

    #[test]
    fn hide_pass_marks_but_keeps_entries() {
        let mut faved = entry(5, "same note everywhere");
        faved.favorited = true;
        let plain = entry(5, "same note everywhere");
        let mut later = entry(7, "independent other note text");
        later.updated_date = 2_000;
        let mut earlier = entry(8, "independent other note text");
        earlier.updated_date = 1_000;

        let mut entries = vec![plain, faved, later, earlier];
        mark_duplicates(&mut entries, &ctx());

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].hidden_by, Some(5));
        assert_eq!(entries[1].hidden_by, None);
        assert_eq!(entries[2].hidden_by, Some(8));
        assert_eq!(entries[3].hidden_by, None);
    }
}
