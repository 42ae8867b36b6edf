//! INSPIRE Download Service Atom feed processing.
//!
//! A configured [`Batch`] goes through these stages:
//!
//! - **Defaults**: namespaces and language are filled in where unset
//! - **Link synthesis**: the `self`/`describedby`/`search`/`up` shorthands
//!   become regular links and every link gets a language tag
//! - **Timestamps**: missing `updated` values are resolved, following entries
//!   that reference other feeds of the batch
//! - **Enrichment**: links with a probe source get their length and type
//!   from a HEAD request
//! - **Validation**: the TG ruleset gates emission
//! - **Rendering**: the feed is written as Atom XML
//!
//! # Architecture
//!
//! - [`types`] - The configuration data model
//! - [`defaults`] - Default values and shorthand link expansion
//! - [`timestamps`] - Cross-feed `updated` resolution
//! - [`enrich`] - HEAD probes for link metadata
//! - [`processor`] - Orchestration of the steps above over a batch
//! - [`validate`] - TG rule checks
//! - [`atom`] - XML rendering, file naming and atomic writes
//! - [`output`] - Validate, name and render a whole batch before writing
//!
//! # Example
//!
//! ```ignore
//! use inspire_atom::feed::{process_batch, render_batch, write_to_file, ProcessOptions};
//!
//! let feeds = process_batch(&client, &batch, &ProcessOptions::default()).await?;
//! for rendered in render_batch(&feeds)? {
//!     write_to_file(&rendered.bytes, output_dir, &rendered.file_name)?;
//! }
//! ```

pub mod atom;
pub mod defaults;
pub mod enrich;
pub mod output;
pub mod processor;
pub mod timestamps;
pub mod types;
pub mod validate;

pub use atom::{file_name, render, write_to_file, AtomError, FileNameError};
pub use defaults::{apply_defaults, default_feed, synthesize_links, WellKnownLink};
pub use enrich::{enrich_entries, enrich_link, probe, ProbeError, ProbeMetadata};
pub use output::{render_batch, render_feed, OutputError, RenderedFeed};
pub use processor::{prepare_feed, process_batch, process_feed, ProcessError, ProcessOptions};
pub use timestamps::{most_recent_entry_update, resolve_updated, FeedIndex};
pub use types::{Author, Batch, Category, Entry, Feed, Link};
pub use validate::{validate, ValidationError, ValidationWarning};
