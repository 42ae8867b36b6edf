//! Static feed defaults and expansion of the shorthand navigation links.
//!
//! Relation and media type pairs follow the INSPIRE Download Services
//! Technical Guidance v3.1 (Requirements 6, 7, 8 and Recommendation 9).

use super::types::{Feed, Link};

/// Atom namespace, mandatory on every feed.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
/// GeoRSS namespace, mandatory on every feed.
pub const GEORSS_NAMESPACE: &str = "http://www.georss.org/georss";
/// Declared only when an entry carries `inspire_dls` identifier elements.
pub const INSPIRE_DLS_NAMESPACE: &str = "http://inspire.ec.europa.eu/schemas/inspire_dls/1.0";
/// Language of a feed whose configuration does not name one.
pub const DEFAULT_LANG: &str = "en";

/// Returns the template every processed feed is merged onto.
pub fn default_feed() -> Feed {
    Feed {
        xmlns: Some(ATOM_NAMESPACE.to_string()),
        georss: Some(GEORSS_NAMESPACE.to_string()),
        lang: Some(DEFAULT_LANG.to_string()),
        ..Feed::default()
    }
}

/// Fills unset namespace and language fields from [`default_feed`].
///
/// Fields that are already set, including ones set to an empty string, are
/// left untouched.
pub fn apply_defaults(feed: &mut Feed) {
    let template = default_feed();

    if feed.xmlns.is_none() {
        feed.xmlns = template.xmlns;
    }
    if feed.georss.is_none() {
        feed.georss = template.georss;
    }
    if feed.lang.is_none() {
        feed.lang = template.lang;
    }
    if feed.inspire_dls.is_none() && feed.uses_inspire_dls() {
        feed.inspire_dls = Some(INSPIRE_DLS_NAMESPACE.to_string());
    }
}

/// The navigation links a feed can configure through a shorthand field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownLink {
    /// TG Requirement 7: the feed document itself.
    SelfRef,
    /// TG Requirement 6: the metadata record of the service or dataset.
    DescribedBy,
    /// TG Requirement 8: the OpenSearch description (service feeds).
    Search,
    /// TG Recommendation 9: the parent service feed.
    Up,
}

impl WellKnownLink {
    /// Order in which synthesized links are appended.
    pub const ORDER: [WellKnownLink; 4] = [
        WellKnownLink::SelfRef,
        WellKnownLink::DescribedBy,
        WellKnownLink::Search,
        WellKnownLink::Up,
    ];

    pub fn rel(self) -> &'static str {
        match self {
            WellKnownLink::SelfRef => "self",
            WellKnownLink::DescribedBy => "describedby",
            WellKnownLink::Search => "search",
            WellKnownLink::Up => "up",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            WellKnownLink::SelfRef | WellKnownLink::Up => "application/atom+xml",
            WellKnownLink::DescribedBy => "application/xml",
            WellKnownLink::Search => "application/opensearchdescription+xml",
        }
    }

    /// Stamps the canonical relation and media type onto `link`.
    pub fn apply(self, mut link: Link) -> Link {
        link.rel = Some(self.rel().to_string());
        link.media_type = Some(self.media_type().to_string());
        link
    }

    fn take_from(self, feed: &mut Feed) -> Option<Link> {
        match self {
            WellKnownLink::SelfRef => feed.self_link.take(),
            WellKnownLink::DescribedBy => feed.describedby.take(),
            WellKnownLink::Search => feed.search.take(),
            WellKnownLink::Up => feed.up.take(),
        }
    }
}

/// Moves the shorthand links into `feed.links` and stamps language tags.
///
/// Synthesized links are appended after the explicit ones in
/// [`WellKnownLink::ORDER`]. The shorthand slots are left empty, so running
/// this twice never duplicates a link. Every feed and entry link without an
/// `hreflang` receives the feed language afterwards.
pub fn synthesize_links(feed: &mut Feed) {
    for kind in WellKnownLink::ORDER {
        if let Some(link) = kind.take_from(feed) {
            feed.links.push(kind.apply(link));
        }
    }

    let lang = feed
        .lang
        .clone()
        .unwrap_or_else(|| DEFAULT_LANG.to_string());

    let entry_links = feed.entries.iter_mut().flat_map(|e| e.links.iter_mut());
    for link in feed.links.iter_mut().chain(entry_links) {
        if link.hreflang.is_none() {
            link.hreflang = Some(lang.clone());
        }
    }
}
