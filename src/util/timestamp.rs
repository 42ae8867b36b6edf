use chrono::NaiveDateTime;

/// The only timestamp layout accepted in feeds: second precision, UTC, `Z`.
pub const UTC_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses a strict `YYYY-MM-DDTHH:MM:SSZ` timestamp.
///
/// chrono accepts space padded fields and leap seconds, so the layout is
/// checked byte by byte first: ASCII digits everywhere except the `-`, `-`,
/// `T`, `:`, `:` and `Z` separators, and seconds below 60. Lexicographic
/// ordering elsewhere relies on the zero padding.
///
/// # Examples
///
/// ```
/// use inspire_atom::util::parse_utc_timestamp;
///
/// assert!(parse_utc_timestamp("2012-03-31T13:45:03Z").is_some());
/// assert!(parse_utc_timestamp("2012-03-31T13:45:03+02:00").is_none());
/// assert!(parse_utc_timestamp("2012-3-31T13:45:03Z").is_none());
/// assert!(parse_utc_timestamp("2012-03-31T 3:45:03Z").is_none());
/// ```
pub fn parse_utc_timestamp(s: &str) -> Option<NaiveDateTime> {
    if !has_canonical_layout(s.as_bytes()) {
        return None;
    }
    NaiveDateTime::parse_from_str(s, UTC_TIMESTAMP_FORMAT).ok()
}

/// Separator positions of `YYYY-MM-DDTHH:MM:SSZ`; every other byte is a digit.
const SEPARATORS: [(usize, u8); 6] = [
    (4, b'-'),
    (7, b'-'),
    (10, b'T'),
    (13, b':'),
    (16, b':'),
    (19, b'Z'),
];

fn has_canonical_layout(bytes: &[u8]) -> bool {
    if bytes.len() != 20 {
        return false;
    }

    let layout_ok = bytes.iter().enumerate().all(|(i, b)| {
        match SEPARATORS.iter().find(|(pos, _)| *pos == i) {
            Some((_, sep)) => b == sep,
            None => b.is_ascii_digit(),
        }
    });

    // No leap seconds
    layout_ok && bytes[17] < b'6'
}
