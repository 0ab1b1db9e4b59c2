use std::collections::BTreeSet;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::fill::credential_model::{LoginData, LoginUri};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UriMatchStrategy {
    /// Same registrable domain, or one declared equivalent
    #[default]
    Domain,
    /// Same host and port
    Host,
    StartsWith,
    Exact,
    RegularExpression,
    Never,
}

// ============================================================================
// Collaborator traits
// ============================================================================

/// Maps a URL to the set of domains the user declared equivalent to its own.
/// The set includes the URL's own domain.
pub trait DomainResolver {
    fn equivalent_domains(&self, url: &str) -> BTreeSet<String>;
}

/// Decides whether a login's saved URIs match a page address.
pub trait UriMatcher {
    fn matches(
        &self,
        login: &LoginData,
        url: &str,
        equivalent_domains: &BTreeSet<String>,
        default_strategy: UriMatchStrategy,
    ) -> bool;
}

// ============================================================================
// Defaults
// ============================================================================

/// Equivalence groups held in memory, e.g. `[["google.com", "youtube.com"]]`.
#[derive(Debug, Clone, Default)]
pub struct StaticDomainResolver {
    groups: Vec<BTreeSet<String>>,
}

impl StaticDomainResolver {
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        Self {
            groups: groups.into_iter().map(|g| g.into_iter().collect()).collect(),
        }
    }
}

impl DomainResolver for StaticDomainResolver {
    fn equivalent_domains(&self, url: &str) -> BTreeSet<String> {
        let Some(domain) = domain_of(url) else {
            return BTreeSet::new();
        };
        let mut domains: BTreeSet<String> = self
            .groups
            .iter()
            .filter(|group| group.contains(&domain))
            .flat_map(|group| group.iter().cloned())
            .collect();
        domains.insert(domain);
        domains
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoginUriMatcher;

impl UriMatcher for LoginUriMatcher {
    fn matches(
        &self,
        login: &LoginData,
        url: &str,
        equivalent_domains: &BTreeSet<String>,
        default_strategy: UriMatchStrategy,
    ) -> bool {
        login
            .uris
            .iter()
            .any(|saved| uri_matches(saved, url, equivalent_domains, default_strategy))
    }
}

fn uri_matches(
    saved: &LoginUri,
    url: &str,
    equivalent_domains: &BTreeSet<String>,
    default_strategy: UriMatchStrategy,
) -> bool {
    match saved.match_strategy.unwrap_or(default_strategy) {
        UriMatchStrategy::Domain => domain_of(&saved.uri)
            .map(|d| equivalent_domains.contains(&d))
            .unwrap_or(false),
        UriMatchStrategy::Host => match (host_of(&saved.uri), host_of(url)) {
            (Some(saved_host), Some(host)) => saved_host == host,
            _ => false,
        },
        UriMatchStrategy::StartsWith => url.starts_with(&saved.uri),
        UriMatchStrategy::Exact => url == saved.uri,
        UriMatchStrategy::RegularExpression => {
            match RegexBuilder::new(&saved.uri).case_insensitive(true).build() {
                Ok(regex) => regex.is_match(url),
                Err(e) => {
                    warn!(uri = %saved.uri, error = %e, "invalid saved URI pattern");
                    false
                }
            }
        }
        UriMatchStrategy::Never => false,
    }
}

// ============================================================================
// URL helpers
// ============================================================================

fn parse_lenient(raw: &str) -> Option<Url> {
    Url::parse(raw)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("http://{}", raw)).ok())
}

/// `host[:port]` of a URL.
pub fn host_of(raw: &str) -> Option<String> {
    let url = parse_lenient(raw)?;
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Registrable domain of a URL per the public suffix list, so
/// `shop.example.co.uk` resolves to `example.co.uk` and sibling
/// `*.github.io` sites stay apart. IP addresses and hosts with no
/// registrable part are returned whole.
pub fn domain_of(raw: &str) -> Option<String> {
    let url = parse_lenient(raw)?;
    let host = match url.host()? {
        url::Host::Domain(domain) => domain.trim_end_matches('.').to_lowercase(),
        other => return Some(other.to_string()),
    };
    let domain = psl::domain_str(&host).map(str::to_string);
    Some(domain.unwrap_or(host))
}

// ============================================================================
// Untrusted iframe
// ============================================================================

/// A frame whose address differs from the tab's is trusted only when the
/// login's saved URIs match it.
pub fn in_untrusted_iframe(
    page_url: &str,
    tab_url: &str,
    login: &LoginData,
    default_strategy: UriMatchStrategy,
    resolver: &dyn DomainResolver,
    matcher: &dyn UriMatcher,
) -> bool {
    if page_url == tab_url {
        return false;
    }
    let equivalent = resolver.equivalent_domains(page_url);
    let trusted = matcher.matches(login, page_url, &equivalent, default_strategy);
    debug!(page_url, tab_url, trusted, "frame trust evaluated");
    !trusted
}
