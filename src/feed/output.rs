use thiserror::Error;

use super::atom::{file_name, render, AtomError, FileNameError};
use super::types::Feed;
use super::validate::{validate, ValidationError, ValidationWarning};

/// Why a processed feed cannot be emitted.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("ATOM feed with id `{feed_id}` is not valid: {source}")]
    Invalid {
        feed_id: String,
        source: ValidationError,
    },

    #[error("ATOM feed with id `{feed_id}` was not generated: {source}")]
    FileName {
        feed_id: String,
        source: FileNameError,
    },

    #[error("ATOM feed with id `{feed_id}` could not be rendered: {source}")]
    Render { feed_id: String, source: AtomError },
}

/// A validated feed rendered to bytes, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFeed {
    pub id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub warnings: Vec<ValidationWarning>,
}

/// Validates, names and renders a single processed feed.
pub fn render_feed(feed: &Feed) -> Result<RenderedFeed, OutputError> {
    let warnings = validate(feed).map_err(|source| OutputError::Invalid {
        feed_id: feed.id.clone(),
        source,
    })?;
    let file_name = file_name(feed).map_err(|source| OutputError::FileName {
        feed_id: feed.id.clone(),
        source,
    })?;
    let bytes = render(feed).map_err(|source| OutputError::Render {
        feed_id: feed.id.clone(),
        source,
    })?;

    Ok(RenderedFeed {
        id: feed.id.clone(),
        file_name,
        bytes,
        warnings,
    })
}

/// Renders every feed, or returns the first failure in input order.
///
/// Nothing is written here: callers only get output once the whole batch
/// passed, which keeps a run all-or-nothing.
pub fn render_batch(feeds: &[Feed]) -> Result<Vec<RenderedFeed>, OutputError> {
    feeds.iter().map(render_feed).collect()
}
