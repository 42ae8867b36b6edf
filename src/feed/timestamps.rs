//! Resolution of missing `updated` timestamps across a batch of feeds.
//!
//! Timestamps are kept in the canonical `YYYY-MM-DDTHH:MM:SSZ` form, which is
//! zero padded and always UTC, so lexicographic order is chronological order.
//! No date parsing happens here; malformed values are left for the validator.

use std::collections::HashMap;

use super::types::Feed;

/// Identifier → feed lookup over a batch, built once per batch.
///
/// When identifiers repeat, the first feed with that identifier wins.
#[derive(Debug, Default)]
pub struct FeedIndex<'a> {
    by_id: HashMap<&'a str, &'a Feed>,
}

impl<'a> FeedIndex<'a> {
    pub fn new(feeds: &'a [Feed]) -> Self {
        let mut by_id = HashMap::with_capacity(feeds.len());
        for feed in feeds {
            by_id.entry(feed.id.as_str()).or_insert(feed);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a Feed> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// The newest entry timestamp of `feed`, or `None` when no entry has one.
pub fn most_recent_entry_update(feed: &Feed) -> Option<String> {
    // Same result as sorting in reverse and taking the first element.
    feed.entries
        .iter()
        .filter_map(|e| e.updated.as_deref())
        .max()
        .map(str::to_string)
}

/// Fills in missing entry and feed timestamps.
///
/// An entry without a timestamp whose `id` names a feed in `index` takes that
/// feed's newest entry timestamp. Afterwards a feed without a timestamp takes
/// the newest of its own entry timestamps. Unmatched entries stay `None`.
///
/// `index` should be built over the unprocessed batch so the outcome does not
/// depend on the order in which feeds are processed.
pub fn resolve_updated(feed: &mut Feed, index: &FeedIndex<'_>) {
    for entry in feed.entries.iter_mut().filter(|e| e.updated.is_none()) {
        if let Some(nested) = index.get(&entry.id) {
            entry.updated = most_recent_entry_update(nested);
            if entry.updated.is_some() {
                tracing::debug!(
                    entry = %entry.id,
                    updated = ?entry.updated,
                    "Propagated timestamp from nested feed"
                );
            }
        }
    }

    if feed.updated.is_none() {
        feed.updated = most_recent_entry_update(feed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::Entry;
    use proptest::prelude::*;

    fn entry(id: &str, updated: Option<&str>) -> Entry {
        Entry {
            id: id.to_string(),
            updated: updated.map(str::to_string),
            ..Entry::default()
        }
    }

    fn feed(id: &str, entries: Vec<Entry>) -> Feed {
        Feed {
            id: id.to_string(),
            entries,
            ..Feed::default()
        }
    }

    #[test]
    fn test_most_recent_picks_newest() {
        let f = feed(
            "https://xyz.org/a.xml",
            vec![
                entry("1", Some("2020-01-01T00:00:00Z")),
                entry("2", Some("2021-10-01T00:00:00Z")),
                entry("3", None),
            ],
        );
        assert_eq!(
            most_recent_entry_update(&f).as_deref(),
            Some("2021-10-01T00:00:00Z")
        );
    }

    #[test]
    fn test_most_recent_without_timestamps() {
        let f = feed("https://xyz.org/a.xml", vec![entry("1", None)]);
        assert_eq!(most_recent_entry_update(&f), None);
        assert_eq!(most_recent_entry_update(&Feed::default()), None);
    }

    #[test]
    fn test_resolve_propagates_from_nested_feed() {
        let child_id = "https://xyz.org/data/child.xml";
        let batch = vec![
            feed("https://xyz.org/service.xml", vec![entry(child_id, None)]),
            feed(child_id, vec![entry("c1", Some("2021-06-15T11:12:34Z"))]),
        ];
        let index = FeedIndex::new(&batch);

        let mut parent = batch[0].clone();
        resolve_updated(&mut parent, &index);
        let mut child = batch[1].clone();
        resolve_updated(&mut child, &index);

        assert_eq!(
            parent.entries[0].updated.as_deref(),
            Some("2021-06-15T11:12:34Z")
        );
        assert_eq!(parent.updated.as_deref(), Some("2021-06-15T11:12:34Z"));
        assert_eq!(child.updated.as_deref(), Some("2021-06-15T11:12:34Z"));
    }

    #[test]
    fn test_resolve_keeps_explicit_values() {
        let batch = vec![feed(
            "https://xyz.org/child.xml",
            vec![entry("c1", Some("2021-06-15T11:12:34Z"))],
        )];
        let index = FeedIndex::new(&batch);

        let mut f = feed(
            "https://xyz.org/service.xml",
            vec![entry("https://xyz.org/child.xml", Some("2019-01-01T00:00:00Z"))],
        );
        f.updated = Some("2018-01-01T00:00:00Z".to_string());
        resolve_updated(&mut f, &index);

        assert_eq!(f.entries[0].updated.as_deref(), Some("2019-01-01T00:00:00Z"));
        assert_eq!(f.updated.as_deref(), Some("2018-01-01T00:00:00Z"));
    }

    #[test]
    fn test_resolve_tolerates_missing_target() {
        let index = FeedIndex::new(&[]);
        let mut f = feed(
            "https://xyz.org/service.xml",
            vec![entry("https://xyz.org/unknown.xml", None)],
        );
        resolve_updated(&mut f, &index);

        assert_eq!(f.entries[0].updated, None);
        assert_eq!(f.updated, None);
    }

    #[test]
    fn test_index_first_duplicate_wins() {
        let batch = vec![
            feed("https://xyz.org/a.xml", vec![entry("1", Some("2020-01-01T00:00:00Z"))]),
            feed("https://xyz.org/a.xml", vec![entry("1", Some("2022-01-01T00:00:00Z"))]),
        ];
        let index = FeedIndex::new(&batch);
        assert_eq!(index.len(), 1);

        let found = index.get("https://xyz.org/a.xml").unwrap();
        assert_eq!(
            most_recent_entry_update(found).as_deref(),
            Some("2020-01-01T00:00:00Z")
        );
    }

    fn timestamp() -> impl Strategy<Value = String> {
        (1990u32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
            |(y, mo, d, h, mi, s)| format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}Z"),
        )
    }

    proptest! {
        #[test]
        fn prop_feed_update_is_newest_entry(stamps in proptest::collection::vec(timestamp(), 1..20)) {
            let entries = stamps
                .iter()
                .enumerate()
                .map(|(i, s)| entry(&i.to_string(), Some(s)))
                .collect();
            let mut f = feed("https://xyz.org/a.xml", entries);
            resolve_updated(&mut f, &FeedIndex::default());

            let mut sorted = stamps.clone();
            sorted.sort();
            sorted.reverse();
            prop_assert_eq!(f.updated, Some(sorted[0].clone()));
        }
    }
}
