//! Keeps an embedded preview on the same route across reloads.
//!
//! Every navigation inside the frame is stored in session storage and
//! reported to the parent. On load the stored route is put back, and if the
//! page then renders next to nothing the frame is sent home instead.

use log::{debug, trace};

use crate::config::RouteRestoreConfig;
use crate::messages::{InboundMessage, RouteChanged};
use crate::origin::OriginPolicy;

/// Browsing context the restorer runs in.
pub trait RouteHost {
    /// Whether the page is embedded in another frame.
    fn is_framed(&self) -> bool;
    /// Path, query and fragment of the current location.
    fn current_route(&self) -> String;
    fn session_get(&self, key: &str) -> Option<String>;
    fn session_set(&mut self, key: &str, value: &str);
    fn session_remove(&mut self, key: &str);
    /// Replace the current history entry and notify the router. `false` if the
    /// browser rejected the URL.
    fn replace_route(&mut self, url: &str) -> bool;
    fn ancestor_origins(&self) -> Vec<String>;
    fn referrer(&self) -> Option<String>;
    fn post_to_parent(&mut self, message: serde_json::Value, target_origin: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    NotFramed,
    NothingSaved,
    /// The saved value was not a path and has been deleted.
    Discarded,
    AlreadyCurrent,
    /// The saved route was applied; call [`RouteRestorer::verify_restored`] once it renders.
    Restored(String),
    /// The saved route was rejected by the browser and `/` was used instead.
    FellBackHome,
}

impl RestoreOutcome {
    pub fn needs_verification(&self) -> bool {
        matches!(self, RestoreOutcome::Restored(_) | RestoreOutcome::FellBackHome)
    }
}

pub struct RouteRestorer {
    config: RouteRestoreConfig,
    policy: OriginPolicy,
}

impl RouteRestorer {
    pub fn new(config: RouteRestoreConfig) -> Self {
        let policy = OriginPolicy::new(config.allowed_parent_origins.iter().cloned());
        Self { config, policy }
    }

    fn saved_route<H: RouteHost>(&self, host: &H) -> Option<String> {
        host.session_get(&self.config.storage_key).filter(|s| !s.is_empty())
    }

    /// Record the current route. Called after every push, replace, popstate and hashchange.
    pub fn save<H: RouteHost>(&self, host: &mut H) {
        if !host.is_framed() {
            return;
        }
        let route = host.current_route();
        host.session_set(&self.config.storage_key, &route);

        let referrer = host.referrer();
        match self.policy.trusted_parent(&host.ancestor_origins(), referrer.as_deref()) {
            Some(origin) => match serde_json::to_value(RouteChanged::new(route)) {
                Ok(message) => host.post_to_parent(message, &origin),
                Err(e) => debug!("could not encode route message: {}", e),
            },
            None => trace!("parent origin not allow-listed, route change not reported"),
        }
    }

    /// Replace the current route and record the result.
    pub fn navigate<H: RouteHost>(&self, host: &mut H, url: &str) -> bool {
        if !host.replace_route(url) {
            return false;
        }
        self.save(host);
        true
    }

    pub fn restore<H: RouteHost>(&self, host: &mut H) -> RestoreOutcome {
        if !host.is_framed() {
            return RestoreOutcome::NotFramed;
        }
        let Some(saved) = self.saved_route(host) else {
            return RestoreOutcome::NothingSaved;
        };
        if !saved.starts_with('/') {
            debug!("discarding saved route {:?}", saved);
            host.session_remove(&self.config.storage_key);
            return RestoreOutcome::Discarded;
        }
        if host.current_route() == saved {
            return RestoreOutcome::AlreadyCurrent;
        }

        if self.navigate(host, &saved) {
            debug!("restored route {}", saved);
            RestoreOutcome::Restored(saved)
        } else {
            debug!("could not restore {}, going home", saved);
            self.navigate(host, "/");
            RestoreOutcome::FellBackHome
        }
    }

    /// Send the frame home if the restored route rendered too little text.
    /// Returns whether it did.
    pub fn verify_restored<H: RouteHost>(&self, host: &mut H, body_text: &str) -> bool {
        if body_text.trim().encode_utf16().count() >= self.config.min_body_text_len {
            return false;
        }
        debug!("restored route rendered almost nothing, going home");
        self.navigate(host, "/");
        true
    }

    /// React to a cross-frame message. Only `redirect-home` from an allow-listed parent is honoured.
    pub fn handle_message<H: RouteHost>(&self, host: &mut H, data: &serde_json::Value) -> bool {
        if !host.is_framed() || InboundMessage::from_data(data) != Some(InboundMessage::RedirectHome) {
            return false;
        }
        let referrer = host.referrer();
        if self
            .policy
            .trusted_parent(&host.ancestor_origins(), referrer.as_deref())
            .is_none()
        {
            return false;
        }
        match self.saved_route(host) {
            Some(saved) if saved != "/" => self.navigate(host, "/"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    const KEY: &str = "horizons-iframe-saved-route";

    struct FakeHost {
        framed: bool,
        route: String,
        session: HashMap<String, String>,
        reject: Vec<String>,
        ancestors: Vec<String>,
        referrer: Option<String>,
        posted: Vec<(serde_json::Value, String)>,
    }

    impl FakeHost {
        fn framed(route: &str) -> Self {
            Self {
                framed: true,
                route: route.to_string(),
                session: HashMap::new(),
                reject: Vec::new(),
                ancestors: vec!["https://horizons.hostinger.com".to_string()],
                referrer: None,
                posted: Vec::new(),
            }
        }

        fn with_saved(mut self, saved: &str) -> Self {
            self.session.insert(KEY.to_string(), saved.to_string());
            self
        }
    }

    impl RouteHost for FakeHost {
        fn is_framed(&self) -> bool {
            self.framed
        }
        fn current_route(&self) -> String {
            self.route.clone()
        }
        fn session_get(&self, key: &str) -> Option<String> {
            self.session.get(key).cloned()
        }
        fn session_set(&mut self, key: &str, value: &str) {
            self.session.insert(key.to_string(), value.to_string());
        }
        fn session_remove(&mut self, key: &str) {
            self.session.remove(key);
        }
        fn replace_route(&mut self, url: &str) -> bool {
            if self.reject.iter().any(|r| r == url) {
                return false;
            }
            self.route = url.to_string();
            true
        }
        fn ancestor_origins(&self) -> Vec<String> {
            self.ancestors.clone()
        }
        fn referrer(&self) -> Option<String> {
            self.referrer.clone()
        }
        fn post_to_parent(&mut self, message: serde_json::Value, target_origin: &str) {
            self.posted.push((message, target_origin.to_string()));
        }
    }

    fn restorer() -> RouteRestorer {
        RouteRestorer::new(RouteRestoreConfig::default())
    }

    #[test]
    fn test_save_stores_and_reports() {
        let mut host = FakeHost::framed("/shop?page=2#top");
        restorer().save(&mut host);
        assert_eq!(host.session.get(KEY).map(String::as_str), Some("/shop?page=2#top"));
        assert_eq!(
            host.posted,
            vec![(
                json!({ "message": "route-changed", "route": "/shop?page=2#top" }),
                "https://horizons.hostinger.com".to_string()
            )]
        );
    }

    #[test]
    fn test_save_never_posts_to_unlisted_parent() {
        let mut host = FakeHost::framed("/a");
        host.ancestors = vec!["http://localhost:4000".to_string()];
        restorer().save(&mut host);
        assert_eq!(host.session.get(KEY).map(String::as_str), Some("/a"));
        assert!(host.posted.is_empty());
    }

    #[test]
    fn test_inactive_when_not_framed() {
        let mut host = FakeHost::framed("/a").with_saved("/b");
        host.framed = false;
        let r = restorer();
        r.save(&mut host);
        assert_eq!(r.restore(&mut host), RestoreOutcome::NotFramed);
        assert_eq!(host.route, "/a");
        assert_eq!(host.session.get(KEY).map(String::as_str), Some("/b"));
    }

    #[test]
    fn test_restore_applies_saved_route() {
        let mut host = FakeHost::framed("/").with_saved("/about");
        let outcome = restorer().restore(&mut host);
        assert_eq!(outcome, RestoreOutcome::Restored("/about".to_string()));
        assert!(outcome.needs_verification());
        assert_eq!(host.route, "/about");
        assert_eq!(host.posted.len(), 1);
    }

    #[test]
    fn test_restore_edge_cases() {
        let r = restorer();

        let mut host = FakeHost::framed("/");
        assert_eq!(r.restore(&mut host), RestoreOutcome::NothingSaved);

        let mut host = FakeHost::framed("/").with_saved("https://evil.example/");
        assert_eq!(r.restore(&mut host), RestoreOutcome::Discarded);
        assert!(host.session.get(KEY).is_none());

        let mut host = FakeHost::framed("/same").with_saved("/same");
        let outcome = r.restore(&mut host);
        assert_eq!(outcome, RestoreOutcome::AlreadyCurrent);
        assert!(!outcome.needs_verification());
    }

    #[test]
    fn test_restore_falls_back_home_when_rejected() {
        let mut host = FakeHost::framed("/x").with_saved("/broken");
        host.reject.push("/broken".to_string());
        assert_eq!(restorer().restore(&mut host), RestoreOutcome::FellBackHome);
        assert_eq!(host.route, "/");
        assert_eq!(host.session.get(KEY).map(String::as_str), Some("/"));
    }

    #[test]
    fn test_verify_restored_uses_trimmed_text() {
        let r = restorer();
        let mut host = FakeHost::framed("/about");
        assert!(r.verify_restored(&mut host, "   Not found   "));
        assert_eq!(host.route, "/");

        let mut host = FakeHost::framed("/about");
        let long = "x".repeat(50);
        assert!(!r.verify_restored(&mut host, &format!("  {}  ", long)));
        assert_eq!(host.route, "/about");
    }

    #[test]
    fn test_redirect_home() {
        let r = restorer();
        let msg = json!({ "type": "redirect-home" });

        let mut host = FakeHost::framed("/deep").with_saved("/deep");
        assert!(r.handle_message(&mut host, &msg));
        assert_eq!(host.route, "/");

        let mut host = FakeHost::framed("/").with_saved("/");
        assert!(!r.handle_message(&mut host, &msg));

        let mut host = FakeHost::framed("/deep").with_saved("/deep");
        host.ancestors.clear();
        host.referrer = Some("https://evil.example/".to_string());
        assert!(!r.handle_message(&mut host, &msg));
        assert_eq!(host.route, "/deep");

        let mut host = FakeHost::framed("/deep").with_saved("/deep");
        assert!(!r.handle_message(&mut host, &json!({ "type": "enableSelectionMode" })));
    }
}
