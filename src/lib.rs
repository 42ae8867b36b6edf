//! Generation of INSPIRE Download Service Atom feeds.
//!
//! A batch of service and dataset feeds is loaded from a configuration file
//! ([`config`]), normalized and validated ([`feed`]), then rendered as Atom
//! XML, one document per feed.

pub mod config;
pub mod feed;
pub mod util;
