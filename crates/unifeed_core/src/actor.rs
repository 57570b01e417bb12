/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - UNIFEED Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::origin::Origin;
use crate::store::ActorStore;
use regex::Regex;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Minimum timestamp once a date has been set: "some time ago". Dates never
/// go back below this, and 0 keeps meaning "never set".
pub const SOME_TIME_AGO: i64 = 1;

/// Prefix of locally synthesized placeholder oids. Two independently built
/// records for the same unresolved mention synthesize the same placeholder
/// and collapse to one local row.
pub const TEMP_OID_PREFIX: &str = "unifeedtemp:";

static WEBFINGER_ID_RE: OnceLock<Regex> = OnceLock::new();

pub fn is_webfinger_id_valid(webfinger_id: &str) -> bool {
    if webfinger_id.is_empty() {
        return false;
    }
    let re = WEBFINGER_ID_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_+-]+(\.[A-Za-z0-9_-]+)*@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("valid webfinger pattern")
    });
    re.is_match(webfinger_id)
}

pub fn is_real_oid(oid: &str) -> bool {
    !oid.is_empty() && !oid.starts_with(TEMP_OID_PREFIX)
}

fn url_host(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let uri = url.parse::<http::Uri>().ok()?;
    uri.host().map(|h| h.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvatarFile {
    pub url: String,
    pub downloaded_date: i64,
}

impl AvatarFile {
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

/// An author record as assembled from one source. Values are immutable:
/// every field change is a `with_*` transition returning the changed record,
/// so "is this record better" is always a judgment over two plain values.
#[derive(Debug, Clone)]
pub struct Actor {
    pub origin: Arc<Origin>,
    /// Locally issued numeric id; 0 until resolved against the store.
    pub local_id: i64,
    /// Origin-scoped opaque id; may be a synthesized placeholder.
    pub oid: String,
    username: String,
    webfinger_id: String,
    webfinger_valid: bool,
    real_name: String,
    profile_url: String,
    pub homepage: String,
    pub avatar_url: String,
    pub notes_count: i64,
    pub favorites_count: i64,
    pub following_count: i64,
    pub followers_count: i64,
    created_date: i64,
    updated_date: i64,
    pub avatar_file: AvatarFile,
    /// Back-reference to the latest known activity, by id (0 = none).
    pub latest_activity_id: i64,
}

impl Actor {
    pub fn from_origin_and_oid(origin: Arc<Origin>, oid: &str) -> Actor {
        Actor {
            origin,
            local_id: 0,
            oid: oid.to_string(),
            username: String::new(),
            webfinger_id: String::new(),
            webfinger_valid: false,
            real_name: String::new(),
            profile_url: String::new(),
            homepage: String::new(),
            avatar_url: String::new(),
            notes_count: 0,
            favorites_count: 0,
            following_count: 0,
            followers_count: 0,
            created_date: 0,
            updated_date: 0,
            avatar_file: AvatarFile::default(),
            latest_activity_id: 0,
        }
    }

    pub fn from_origin_and_id(origin: Arc<Origin>, local_id: i64, oid: &str) -> Actor {
        let mut actor = Actor::from_origin_and_oid(origin, oid);
        actor.local_id = local_id;
        actor
    }

    pub fn empty() -> Actor {
        Actor::from_origin_and_oid(Arc::new(Origin::empty()), "")
    }

    pub fn is_empty(&self) -> bool {
        !self.origin.is_valid()
            || (self.local_id == 0
                && !self.is_oid_real()
                && self.webfinger_id.is_empty()
                && !self.origin.is_username_valid(&self.username))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn webfinger_id(&self) -> &str {
        &self.webfinger_id
    }

    pub fn is_webfinger_id_valid(&self) -> bool {
        self.webfinger_valid
    }

    pub fn real_name(&self) -> &str {
        &self.real_name
    }

    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }

    pub fn created_date(&self) -> i64 {
        self.created_date
    }

    pub fn updated_date(&self) -> i64 {
        self.updated_date
    }

    pub fn with_local_id(mut self, local_id: i64) -> Actor {
        self.local_id = local_id;
        self
    }

    pub fn with_username(mut self, username: &str) -> Actor {
        self.username = username.trim().to_string();
        self.fix_webfinger_id();
        self
    }

    /// Accepts only addresses matching the `user@host` pattern; anything else
    /// leaves the record unchanged. Valid addresses are stored lower-cased.
    pub fn with_webfinger_id(mut self, webfinger_id: &str) -> Actor {
        self.set_webfinger_if_valid(webfinger_id);
        self
    }

    pub fn with_real_name(mut self, real_name: &str) -> Actor {
        let real_name = real_name.trim();
        if !real_name.is_empty() {
            self.real_name = real_name.to_string();
        }
        self
    }

    pub fn with_profile_url(mut self, url: &str) -> Actor {
        self.profile_url = url.trim().to_string();
        self.fix_webfinger_id();
        self
    }

    pub fn with_avatar_file(mut self, avatar_file: AvatarFile) -> Actor {
        self.avatar_file = avatar_file;
        self
    }

    pub fn with_created(mut self, created: i64) -> Actor {
        self.created_date = created.max(SOME_TIME_AGO);
        self
    }

    /// Monotonic: an older value never replaces a newer one.
    pub fn with_updated(mut self, updated: i64) -> Actor {
        if self.updated_date < updated {
            self.updated_date = updated.max(SOME_TIME_AGO);
        }
        self
    }

    fn set_webfinger_if_valid(&mut self, webfinger_id: &str) {
        if is_webfinger_id_valid(webfinger_id) {
            self.webfinger_id = webfinger_id.to_lowercase();
            self.webfinger_valid = true;
        }
    }

    fn fix_webfinger_id(&mut self) {
        if self.username.is_empty() {
            return;
        }
        if self.username.contains('@') {
            let candidate = self.username.clone();
            self.set_webfinger_if_valid(&candidate);
        } else if let Some(host) = url_host(&self.profile_url) {
            let candidate = format!("{}@{}", self.username, host);
            self.set_webfinger_if_valid(&candidate);
        }
    }

    pub fn is_oid_real(&self) -> bool {
        is_real_oid(&self.oid)
    }

    /// Identified: carries both a local id and a real (non-placeholder) oid.
    pub fn is_identified(&self) -> bool {
        self.local_id != 0 && self.is_oid_real()
    }

    pub fn is_partially_defined(&self) -> bool {
        !self.is_identified()
    }

    pub fn temp_oid(&self) -> String {
        let key = if self.webfinger_valid {
            &self.webfinger_id
        } else {
            &self.username
        };
        format!("{TEMP_OID_PREFIX}{key}")
    }

    /// Placeholder synthesized from the username alone, ignoring WebFinger.
    pub fn alt_temp_oid(&self) -> String {
        format!("{TEMP_OID_PREFIX}{}", self.username)
    }

    pub fn has_alt_temp_oid(&self) -> bool {
        !self.username.is_empty() && self.temp_oid() != self.alt_temp_oid()
    }

    /// Host this actor lives on: the WebFinger host when known, else the
    /// profile URL's host.
    pub fn host(&self) -> String {
        if let Some((_, host)) = self.webfinger_id.split_once('@') {
            return host.to_string();
        }
        url_host(&self.profile_url).unwrap_or_default()
    }

    pub fn name_preferably_webfinger_id(&self) -> String {
        if self.webfinger_valid {
            return self.webfinger_id.clone();
        }
        if !self.username.is_empty() {
            return self.username.clone();
        }
        if !self.real_name.is_empty() {
            return self.real_name.clone();
        }
        if !self.oid.is_empty() {
            return format!("oid:{}", self.oid);
        }
        format!("id:{}", self.local_id)
    }

    pub fn to_actor_title(&self, show_webfinger_id: bool) -> String {
        let mut title = String::new();
        if show_webfinger_id && !self.webfinger_id.is_empty() {
            title.push_str(&self.webfinger_id);
        } else if !self.username.is_empty() {
            title.push('@');
            title.push_str(&self.username);
        }
        if !self.real_name.is_empty() {
            if !title.is_empty() {
                title.push(' ');
            }
            title.push_str(&format!("({})", self.real_name));
        }
        title
    }

    /// Merge priority for the actor cache. First decisive criterion wins:
    /// completeness (in both directions, regardless of timestamps), then
    /// `updated`, then avatar download time, then note count.
    pub fn is_better_to_cache_than(&self, other: &Actor) -> bool {
        if other.is_empty() {
            return !self.is_empty();
        }
        if self.is_empty() {
            return false;
        }
        match (self.is_partially_defined(), other.is_partially_defined()) {
            (false, true) => return true,
            (true, false) => return false,
            _ => {}
        }
        if self.updated_date != other.updated_date {
            return self.updated_date > other.updated_date;
        }
        if self.avatar_file.downloaded_date != other.avatar_file.downloaded_date {
            return self.avatar_file.downloaded_date > other.avatar_file.downloaded_date;
        }
        self.notes_count > other.notes_count
    }

    /// Priority-ordered resolution of the local id from whatever identity
    /// evidence this record carries. Queries short-circuit on the first
    /// non-zero answer; every miss or failure is 0. The by-username lookup is
    /// skipped when a validated WebFinger id is present, since the address
    /// pins a host and a bare-username row could belong to another host.
    pub fn lookup_local_id(&self, store: &dyn ActorStore) -> i64 {
        if self.local_id != 0 {
            return self.local_id;
        }
        let origin_id = self.origin.id;
        let mut id = 0;
        if self.is_oid_real() {
            id = store.find_local_id(origin_id, &self.oid);
        }
        if id == 0 && self.webfinger_valid {
            id = store.find_local_id_by_webfinger(origin_id, &self.webfinger_id);
        }
        if id == 0 && !self.webfinger_valid && !self.username.is_empty() {
            id = store.find_local_id_by_username(origin_id, &self.username);
        }
        if id == 0 {
            id = store.find_local_id(origin_id, &self.temp_oid());
        }
        if id == 0 && self.has_alt_temp_oid() {
            id = store.find_local_id(origin_id, &self.alt_temp_oid());
        }
        id
    }
}

/// Identity equality: same origin, then the strictest available evidence
/// decides — local ids, real oid, validated WebFinger, username. A weaker
/// tier is never consulted when a stronger one is present on either side.
impl PartialEq for Actor {
    fn eq(&self, other: &Actor) -> bool {
        if self.origin != other.origin {
            return false;
        }
        if self.local_id != 0 || other.local_id != 0 {
            return self.local_id == other.local_id;
        }
        if self.is_oid_real() || other.is_oid_real() {
            return self.oid == other.oid;
        }
        if !self.webfinger_id.is_empty() || !other.webfinger_id.is_empty() {
            return self.webfinger_id == other.webfinger_id;
        }
        self.username == other.username
    }
}

impl Eq for Actor {}

impl Hash for Actor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.origin.id.hash(state);
        if self.local_id != 0 {
            self.local_id.hash(state);
        } else if self.is_oid_real() {
            self.oid.hash(state);
        } else if !self.webfinger_id.is_empty() {
            self.webfinger_id.hash(state);
        } else {
            self.username.hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::OriginKind;

    fn origin() -> Arc<Origin> {
        Arc::new(Origin::new(1, OriginKind::ActivityPub, "example", "example.org"))
    }

    #[test]
    fn webfinger_validation() {
        assert!(is_webfinger_id_valid("bob@example.org"));
        assert!(is_webfinger_id_valid("b.ob-1@sub.example.org"));
        assert!(!is_webfinger_id_valid("bob"));
        assert!(!is_webfinger_id_valid("bob@localhost"));
        assert!(!is_webfinger_id_valid("@example.org"));
        assert!(!is_webfinger_id_valid(""));
    }

    #[test]
    fn webfinger_is_stored_lowercase() {
        let actor = Actor::from_origin_and_oid(origin(), "").with_webfinger_id("Bob@Example.ORG");
        assert!(actor.is_webfinger_id_valid());
        assert_eq!(actor.webfinger_id(), "bob@example.org");
    }

    #[test]
    fn invalid_webfinger_is_ignored() {
        let actor = Actor::from_origin_and_oid(origin(), "").with_webfinger_id("not an address");
        assert!(!actor.is_webfinger_id_valid());
        assert_eq!(actor.webfinger_id(), "");
    }

    #[test]
    fn username_with_at_fixes_webfinger() {
        let actor = Actor::from_origin_and_oid(origin(), "").with_username("alice@example.org");
        assert_eq!(actor.webfinger_id(), "alice@example.org");
        assert!(actor.is_webfinger_id_valid());
    }

    #[test]
    fn profile_url_host_fixes_webfinger() {
        let actor = Actor::from_origin_and_oid(origin(), "")
            .with_profile_url("https://example.org/users/alice")
            .with_username("alice");
        assert_eq!(actor.webfinger_id(), "alice@example.org");
        assert_eq!(actor.host(), "example.org");
    }

    #[test]
    fn created_is_clamped_updated_is_monotonic() {
        let actor = Actor::from_origin_and_oid(origin(), "oid1").with_created(0);
        assert_eq!(actor.created_date(), SOME_TIME_AGO);

        let actor = actor.with_updated(1000).with_updated(500);
        assert_eq!(actor.updated_date(), 1000);
        let actor = actor.with_updated(2000);
        assert_eq!(actor.updated_date(), 2000);
    }

    #[test]
    fn temp_oids() {
        let actor = Actor::from_origin_and_oid(origin(), "")
            .with_webfinger_id("bob@example.org")
            .with_username("bob");
        assert_eq!(actor.temp_oid(), "unifeedtemp:bob@example.org");
        assert_eq!(actor.alt_temp_oid(), "unifeedtemp:bob");
        assert!(actor.has_alt_temp_oid());
        assert!(!is_real_oid(&actor.temp_oid()));
        assert!(is_real_oid("https://example.org/users/bob"));

        let bare = Actor::from_origin_and_oid(origin(), "").with_username("bob");
        assert_eq!(bare.temp_oid(), bare.alt_temp_oid());
        assert!(!bare.has_alt_temp_oid());
    }

    #[test]
    fn identity_priority_order() {
        let by_id_a = Actor::from_origin_and_id(origin(), 7, "oid-a");
        let by_id_b = Actor::from_origin_and_id(origin(), 7, "oid-b");
        assert_eq!(by_id_a, by_id_b);

        let by_id_c = Actor::from_origin_and_id(origin(), 8, "oid-a");
        assert_ne!(by_id_a, by_id_c);

        let by_oid_a = Actor::from_origin_and_oid(origin(), "oid-a").with_username("x");
        let by_oid_b = Actor::from_origin_and_oid(origin(), "oid-a").with_username("y");
        assert_eq!(by_oid_a, by_oid_b);

        let by_wf_a = Actor::from_origin_and_oid(origin(), "")
            .with_webfinger_id("bob@example.org")
            .with_username("u1");
        let by_wf_b = Actor::from_origin_and_oid(origin(), "")
            .with_webfinger_id("BOB@example.org")
            .with_username("u2");
        assert_eq!(by_wf_a, by_wf_b);

        let by_name_a = Actor::from_origin_and_oid(origin(), "").with_username("carol");
        let by_name_b = Actor::from_origin_and_oid(origin(), "").with_username("carol");
        assert_eq!(by_name_a, by_name_b);

        let other_origin = Arc::new(Origin::new(2, OriginKind::StatusNet, "sn", "sn.example.org"));
        let elsewhere = Actor::from_origin_and_id(other_origin, 7, "oid-a");
        assert_ne!(by_id_a, elsewhere);
    }

    #[test]
    fn identity_is_an_equivalence_relation() {
        let a = Actor::from_origin_and_oid(origin(), "oid-x").with_username("ann");
        let b = Actor::from_origin_and_oid(origin(), "oid-x").with_username("ann");
        let c = Actor::from_origin_and_oid(origin(), "oid-x");
        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert!(a == b && b == c && a == c);
    }

    #[test]
    fn partially_defined() {
        let full = Actor::from_origin_and_id(origin(), 3, "https://example.org/users/dan");
        assert!(!full.is_partially_defined());

        let no_id = Actor::from_origin_and_oid(origin(), "https://example.org/users/dan");
        assert!(no_id.is_partially_defined());

        let temp = Actor::from_origin_and_id(origin(), 3, "unifeedtemp:dan");
        assert!(temp.is_partially_defined());
    }

    #[test]
    fn fuller_record_beats_fresher_stub() {
        let stub = Actor::from_origin_and_id(origin(), 3, "")
            .with_username("dan")
            .with_updated(100);
        let full = Actor::from_origin_and_id(origin(), 3, "https://example.org/users/dan")
            .with_username("dan")
            .with_updated(50);
        assert!(full.is_better_to_cache_than(&stub));
        assert!(!stub.is_better_to_cache_than(&full));
    }

    #[test]
    fn freshness_and_tie_breaks() {
        let older = Actor::from_origin_and_id(origin(), 3, "oid").with_updated(100);
        let newer = Actor::from_origin_and_id(origin(), 3, "oid").with_updated(200);
        assert!(newer.is_better_to_cache_than(&older));
        assert!(!older.is_better_to_cache_than(&newer));

        let avatar_old = older.clone().with_avatar_file(AvatarFile {
            url: "a.png".into(),
            downloaded_date: 10,
        });
        let avatar_new = older.clone().with_avatar_file(AvatarFile {
            url: "a.png".into(),
            downloaded_date: 20,
        });
        assert!(avatar_new.is_better_to_cache_than(&avatar_old));

        let mut busy = older.clone();
        busy.notes_count = 9;
        assert!(busy.is_better_to_cache_than(&older));
        assert!(!older.clone().is_better_to_cache_than(&older.clone()));
    }

    #[test]
    fn display_names() {
        let actor = Actor::from_origin_and_oid(origin(), "")
            .with_webfinger_id("bob@example.org")
            .with_username("bob")
            .with_real_name("Bob B.");
        assert_eq!(actor.name_preferably_webfinger_id(), "bob@example.org");
        assert_eq!(actor.to_actor_title(true), "bob@example.org (Bob B.)");
        assert_eq!(actor.to_actor_title(false), "@bob (Bob B.)");
    }
}
