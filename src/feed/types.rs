use serde::{de, Deserialize, Deserializer};

// ============================================================================
// Batch
// ============================================================================

/// An ordered set of feeds submitted together.
///
/// The batch is the lookup scope for nested feed references: an entry whose
/// `id` equals the `id` of another feed in the same batch inherits that feed's
/// most recent timestamp during processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub feeds: Vec<Feed>,
}

// ============================================================================
// Feed
// ============================================================================

/// One Atom document, either a service feed or a dataset feed.
///
/// Optional values are modelled as `Option` so that "not configured" and
/// "configured as empty" stay distinguishable through defaulting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Feed {
    /// Stylesheet reference emitted as an `xml-stylesheet` instruction.
    /// Never part of the `<feed>` element itself.
    pub stylesheet: Option<String>,
    pub xmlns: Option<String>,
    pub georss: Option<String>,
    pub inspire_dls: Option<String>,
    pub lang: Option<String>,

    /// HTTP URI of the feed. Also the source of the output file name.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub subtitle: Option<String>,

    // Shorthand links, merged into `links` and cleared during processing.
    #[serde(rename = "self")]
    pub self_link: Option<Link>,
    pub describedby: Option<Link>,
    pub search: Option<Link>,
    pub up: Option<Link>,

    #[serde(default, rename = "link")]
    pub links: Vec<Link>,

    #[serde(default)]
    pub rights: String,
    /// `YYYY-MM-DDTHH:MM:SSZ`. Resolved from the entries when absent.
    pub updated: Option<String>,
    #[serde(default)]
    pub author: Author,
    #[serde(default, rename = "entry")]
    pub entries: Vec<Entry>,
}

impl Feed {
    /// True while any of the four shorthand link slots is still populated.
    pub fn has_shorthand_links(&self) -> bool {
        self.self_link.is_some()
            || self.describedby.is_some()
            || self.search.is_some()
            || self.up.is_some()
    }

    /// True when an entry uses the `inspire_dls` identifier elements.
    pub fn uses_inspire_dls(&self) -> bool {
        self.entries.iter().any(|e| {
            e.spatial_dataset_identifier_code.is_some()
                || e.spatial_dataset_identifier_namespace.is_some()
        })
    }

    /// Every link of the document: feed links first, then entry links in
    /// entry order.
    pub fn all_links(&self) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .chain(self.entries.iter().flat_map(|e| e.links.iter()))
    }
}

/// Contact information for the party responsible for a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

// ============================================================================
// Entry
// ============================================================================

/// A dataset or download unit within a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    #[serde(default, rename = "link")]
    pub links: Vec<Link>,
    pub rights: Option<String>,
    pub updated: Option<String>,
    /// `georss:polygon` footprint, a whitespace separated coordinate list.
    pub polygon: Option<String>,
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,
    pub spatial_dataset_identifier_code: Option<String>,
    pub spatial_dataset_identifier_namespace: Option<String>,
}

// ============================================================================
// Link / Category
// ============================================================================

/// A navigation or download reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub href: String,
    /// URL probed with a HEAD request to fill in `length` and `media_type`.
    /// Consumed during processing and never serialized.
    #[serde(rename = "data")]
    pub probe: Option<String>,
    pub rel: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub hreflang: Option<String>,
    /// Size in bytes. Configurations may give it as a number or a string.
    #[serde(default, deserialize_with = "deserialize_length")]
    pub length: Option<u64>,
    pub title: Option<String>,
    pub version: Option<String>,
    /// Temporal extent, `YYYY-MM-DDTHH:MM:SSZ`.
    pub time: Option<String>,
    /// Spatial extent, four whitespace separated numbers.
    pub bbox: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }
}

/// Reads `length: 1024` as well as `length: "1024"`. An empty string is the
/// same as leaving the key out.
fn deserialize_length<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLength {
        Number(u64),
        Text(String),
    }

    match Option::<RawLength>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawLength::Number(n)) => Ok(Some(n)),
        Some(RawLength::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse().map(Some).map_err(|_| {
                de::Error::custom(format!("invalid length `{text}`, expected a byte count"))
            })
        }
    }
}

/// Classification of an entry, typically a CRS or format URI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub term: String,
    pub label: Option<String>,
}
