//! Which frame embeds us, and whether it may receive page content.

use log::warn;
use url::Url;

/// Origin of the embedding parent: the nearest ancestor origin when the
/// browser reports the chain, otherwise the origin of the referrer.
pub fn resolve_parent_origin(ancestor_origins: &[String], referrer: Option<&str>) -> Option<String> {
    if let Some(first) = ancestor_origins.first() {
        return Some(first.clone());
    }

    let referrer = referrer.filter(|r| !r.is_empty())?;
    match Url::parse(referrer) {
        Ok(url) => Some(url.origin().ascii_serialization()),
        Err(e) => {
            warn!("invalid referrer URL {:?}: {}", referrer, e);
            None
        }
    }
}

/// Exact-match allow-list of parent origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.allowed.iter().any(|a| a == origin)
    }

    /// The resolved parent origin, if it is allowed to receive messages.
    pub fn trusted_parent(&self, ancestor_origins: &[String], referrer: Option<&str>) -> Option<String> {
        resolve_parent_origin(ancestor_origins, referrer).filter(|origin| self.allows(origin))
    }
}
