//! Validation of processed feeds against the INSPIRE Download Services
//! Technical Guidance v3.1.
//!
//! Rules are checked in a fixed order and the first violation is returned.
//! A missing subtitle is only a warning. Validation must run after
//! processing: timestamps and link language tags are filled in there.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::types::Feed;
use crate::util::{is_absolute_uri, parse_utc_timestamp};

/// Four whitespace separated signed decimals, as in `georss:box`. ASCII
/// digits only; `\d` would also match other scripts.
static BBOX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?([0-9]+(\.[0-9]*)?|\.[0-9]+)(\s+[-+]?([0-9]+(\.[0-9]*)?|\.[0-9]+)){3}$")
        .expect("bounding box pattern is a valid regex")
});

/// A rule violation that blocks emission of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The 'title' element of a feed shall contain a title for the feed")]
    MissingTitle,

    /// TG Requirement 9
    #[error("TG Requirement 9: the 'id' element of a feed shall contain an HTTP URI which dereferences to the feed")]
    InvalidId,

    /// TG Requirement 10
    #[error("TG Requirement 10: the 'rights' element of a feed shall contain information about rights or restrictions for that feed")]
    MissingRights,

    /// TG Requirement 11, entry level
    #[error("TG Requirement 11: entry `{entry_id}` has no 'updated' element")]
    MissingEntryUpdated { entry_id: String },

    /// TG Requirement 11, entry level
    #[error("TG Requirement 11: entry `{entry_id}` has 'updated' value `{value}`, expected YYYY-MM-DDTHH:MM:SSZ")]
    InvalidEntryUpdated { entry_id: String, value: String },

    /// TG Requirement 11
    #[error("TG Requirement 11: the 'updated' element of a feed shall contain the date, time and timezone at which the feed was last updated")]
    MissingUpdated,

    /// TG Requirement 11
    #[error("TG Requirement 11: feed 'updated' value `{value}` is not a date, time and timezone (YYYY-MM-DDTHH:MM:SSZ)")]
    InvalidUpdated { value: String },

    #[error("Link `{href}` has 'time' value `{value}`, expected YYYY-MM-DDTHH:MM:SSZ")]
    InvalidLinkTime { href: String, value: String },

    #[error("Link `{href}` has 'bbox' value `{value}`, expected four space separated numbers")]
    InvalidLinkBbox { href: String, value: String },

    /// TG Requirement 12
    #[error("TG Requirement 12: the 'author' element of a feed shall contain at the minimum a name and email address")]
    InvalidAuthor,
}

/// A finding that is reported but does not block emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    MissingSubtitle,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::MissingSubtitle => {
                write!(f, "The 'subtitle' element of a feed should be present")
            }
        }
    }
}

/// Checks `feed` and returns its warnings, or the first rule it violates.
pub fn validate(feed: &Feed) -> Result<Vec<ValidationWarning>, ValidationError> {
    let mut warnings = Vec::new();

    if feed.title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    if feed.subtitle.as_deref().unwrap_or_default().is_empty() {
        warnings.push(ValidationWarning::MissingSubtitle);
    }

    if !is_absolute_uri(&feed.id) {
        return Err(ValidationError::InvalidId);
    }

    if feed.rights.is_empty() {
        return Err(ValidationError::MissingRights);
    }

    for entry in &feed.entries {
        match entry.updated.as_deref() {
            None => {
                return Err(ValidationError::MissingEntryUpdated {
                    entry_id: entry.id.clone(),
                })
            }
            Some(value) if parse_utc_timestamp(value).is_none() => {
                return Err(ValidationError::InvalidEntryUpdated {
                    entry_id: entry.id.clone(),
                    value: value.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    match feed.updated.as_deref() {
        None => return Err(ValidationError::MissingUpdated),
        Some(value) if parse_utc_timestamp(value).is_none() => {
            return Err(ValidationError::InvalidUpdated {
                value: value.to_string(),
            })
        }
        Some(_) => {}
    }

    for link in feed.all_links() {
        if let Some(time) = link.time.as_deref() {
            if parse_utc_timestamp(time).is_none() {
                return Err(ValidationError::InvalidLinkTime {
                    href: link.href.clone(),
                    value: time.to_string(),
                });
            }
        }
    }

    for link in feed.all_links() {
        if let Some(bbox) = link.bbox.as_deref() {
            if !BBOX_PATTERN.is_match(bbox) {
                return Err(ValidationError::InvalidLinkBbox {
                    href: link.href.clone(),
                    value: bbox.to_string(),
                });
            }
        }
    }

    if feed.author.name.is_empty() || feed.author.email.is_empty() {
        return Err(ValidationError::InvalidAuthor);
    }

    Ok(warnings)
}
