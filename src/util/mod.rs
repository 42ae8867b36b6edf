//! Utility functions shared by processing and validation.
//!
//! - **URL validation**: probe source checks and absolute URI detection
//! - **Timestamps**: strict parsing of the `YYYY-MM-DDTHH:MM:SSZ` layout

mod timestamp;
mod url_validator;

pub use timestamp::{parse_utc_timestamp, UTC_TIMESTAMP_FORMAT};
pub use url_validator::{is_absolute_uri, validate_probe_url, UrlValidationError};
