use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use super::types::{Author, Category, Entry, Feed, Link};

/// Errors produced while rendering a feed.
#[derive(Debug, Error)]
pub enum AtomError {
    #[error("Failed to write Atom XML: {0}")]
    Xml(String),
}

/// The feed identifier cannot be turned into an output file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid ID was provided, got: `{0}`")]
pub struct FileNameError(pub String);

/// Derives the output file name from the feed identifier.
///
/// TG Requirement 9: the `id` of a feed is an HTTP URI that dereferences to
/// the feed, so its last path segment names the file. Identifiers without
/// `http`, or ending in `/`, are rejected.
///
/// # Examples
///
/// ```
/// use inspire_atom::feed::{file_name, Feed};
///
/// let feed = Feed { id: "http://xyz.org/download/en.xml".to_string(), ..Feed::default() };
/// assert_eq!(file_name(&feed).unwrap(), "en.xml");
/// ```
pub fn file_name(feed: &Feed) -> Result<String, FileNameError> {
    if !feed.id.contains("http") {
        return Err(FileNameError(feed.id.clone()));
    }

    match feed.id.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(FileNameError(feed.id.clone())),
    }
}

/// Renders a validated feed as an Atom document.
///
/// Output starts with the XML declaration, followed by an `xml-stylesheet`
/// instruction when the feed names a stylesheet. Elements appear in a fixed
/// order with one space of indentation; unset optional values are left out.
/// Equal feeds always render to identical bytes.
pub fn render(feed: &Feed) -> Result<Vec<u8>, AtomError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 1);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    if let Some(href) = feed.stylesheet.as_deref() {
        let instruction = format!(
            r#"xml-stylesheet href="{}" type="text/xsl" media="screen""#,
            escape(href)
        );
        emit(&mut writer, Event::PI(BytesPI::new(instruction)))?;
    }

    let mut root = BytesStart::new("feed");
    push_optional_attribute(&mut root, "xmlns", feed.xmlns.as_deref());
    push_optional_attribute(&mut root, "xmlns:georss", feed.georss.as_deref());
    push_optional_attribute(&mut root, "xmlns:inspire_dls", feed.inspire_dls.as_deref());
    push_optional_attribute(&mut root, "xml:lang", feed.lang.as_deref());
    emit(&mut writer, Event::Start(root))?;

    write_text_element(&mut writer, "id", &feed.id)?;
    write_text_element(&mut writer, "title", &feed.title)?;
    write_optional_element(&mut writer, "subtitle", feed.subtitle.as_deref())?;
    for link in &feed.links {
        write_link(&mut writer, link)?;
    }
    write_text_element(&mut writer, "rights", &feed.rights)?;
    write_optional_element(&mut writer, "updated", feed.updated.as_deref())?;
    write_author(&mut writer, &feed.author)?;
    for entry in &feed.entries {
        write_entry(&mut writer, entry)?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("feed")))?;

    Ok(writer.into_inner().into_inner())
}

fn write_entry(writer: &mut Writer<Cursor<Vec<u8>>>, entry: &Entry) -> Result<(), AtomError> {
    emit(writer, Event::Start(BytesStart::new("entry")))?;

    write_text_element(writer, "id", &entry.id)?;
    write_optional_element(writer, "title", entry.title.as_deref())?;
    write_optional_element(writer, "content", entry.content.as_deref())?;
    write_optional_element(writer, "summary", entry.summary.as_deref())?;
    for link in &entry.links {
        write_link(writer, link)?;
    }
    write_optional_element(writer, "rights", entry.rights.as_deref())?;
    write_optional_element(writer, "updated", entry.updated.as_deref())?;
    write_optional_element(writer, "georss:polygon", entry.polygon.as_deref())?;
    for category in &entry.categories {
        write_category(writer, category)?;
    }
    write_optional_element(
        writer,
        "inspire_dls:spatial_dataset_identifier_code",
        entry.spatial_dataset_identifier_code.as_deref(),
    )?;
    write_optional_element(
        writer,
        "inspire_dls:spatial_dataset_identifier_namespace",
        entry.spatial_dataset_identifier_namespace.as_deref(),
    )?;

    emit(writer, Event::End(BytesEnd::new("entry")))
}

fn write_link(writer: &mut Writer<Cursor<Vec<u8>>>, link: &Link) -> Result<(), AtomError> {
    let length = link.length.map(|l| l.to_string());

    let mut element = BytesStart::new("link");
    element.push_attribute(("href", link.href.as_str()));
    push_optional_attribute(&mut element, "rel", link.rel.as_deref());
    push_optional_attribute(&mut element, "type", link.media_type.as_deref());
    push_optional_attribute(&mut element, "hreflang", link.hreflang.as_deref());
    push_optional_attribute(&mut element, "length", length.as_deref());
    push_optional_attribute(&mut element, "title", link.title.as_deref());
    push_optional_attribute(&mut element, "version", link.version.as_deref());
    push_optional_attribute(&mut element, "time", link.time.as_deref());
    push_optional_attribute(&mut element, "bbox", link.bbox.as_deref());

    emit(writer, Event::Empty(element))
}

fn write_category(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    category: &Category,
) -> Result<(), AtomError> {
    let mut element = BytesStart::new("category");
    element.push_attribute(("term", category.term.as_str()));
    push_optional_attribute(&mut element, "label", category.label.as_deref());
    emit(writer, Event::Empty(element))
}

fn write_author(writer: &mut Writer<Cursor<Vec<u8>>>, author: &Author) -> Result<(), AtomError> {
    emit(writer, Event::Start(BytesStart::new("author")))?;
    write_text_element(writer, "name", &author.name)?;
    write_text_element(writer, "email", &author.email)?;
    emit(writer, Event::End(BytesEnd::new("author")))
}

/// Writes `<name>value</name>`, or `<name/>` when `value` is empty.
fn write_text_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    value: &str,
) -> Result<(), AtomError> {
    if value.is_empty() {
        return emit(writer, Event::Empty(BytesStart::new(name)));
    }
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(value)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn write_optional_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    value: Option<&str>,
) -> Result<(), AtomError> {
    match value {
        Some(v) if !v.is_empty() => write_text_element(writer, name, v),
        _ => Ok(()),
    }
}

fn push_optional_attribute(element: &mut BytesStart<'_>, key: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        element.push_attribute((key, v));
    }
}

fn emit(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), AtomError> {
    writer
        .write_event(event)
        .map_err(|e| AtomError::Xml(e.to_string()))
}

/// Writes rendered feed bytes to `dir/name` atomically.
///
/// Content goes to a temporary file in the same directory, is synced, then
/// renamed over the destination, so a reader never sees a partial feed.
pub fn write_to_file(bytes: &[u8], dir: &Path, name: &str) -> Result<PathBuf> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let path = dir.join(name);

    // Nanosecond timestamp suffix; `create_new` refuses to reuse a leftover file
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dir.join(format!(".{}.tmp.{:016x}", name, random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions",
                temp_path.display()
            )
        })?;

    std::io::Write::write_all(&mut file, bytes).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write feed to temporary file '{}'",
            temp_path.display()
        )
    })?;

    file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk",
            temp_path.display()
        )
    })?;

    drop(file);

    std::fs::rename(&temp_path, &path).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::defaults::{ATOM_NAMESPACE, GEORSS_NAMESPACE};
    use pretty_assertions::assert_eq;

    fn render_string(feed: &Feed) -> String {
        String::from_utf8(render(feed).expect("Failed to render feed")).unwrap()
    }

    fn minimal_feed() -> Feed {
        Feed {
            xmlns: Some(ATOM_NAMESPACE.to_string()),
            georss: Some(GEORSS_NAMESPACE.to_string()),
            lang: Some("en".to_string()),
            id: "http://xyz.org/download/en.xml".to_string(),
            title: "XYZ Example INSPIRE Download Service".to_string(),
            rights: "Copyright (c) 2012, XYZ; all rights reserved".to_string(),
            updated: Some("2012-03-31T13:45:03Z".to_string()),
            author: Author {
                name: "John Doe".to_string(),
                email: "doe@xyz.org".to_string(),
            },
            ..Feed::default()
        }
    }

    #[test]
    fn test_file_name_from_id() {
        let feed = Feed {
            id: "http://xyz.org/download/en.xml".to_string(),
            ..Feed::default()
        };
        assert_eq!(file_name(&feed), Ok("en.xml".to_string()));
    }

    #[test]
    fn test_file_name_rejects_non_http_id() {
        let feed = Feed {
            id: "not a URL.xml".to_string(),
            ..Feed::default()
        };
        let err = file_name(&feed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "not a valid ID was provided, got: `not a URL.xml`"
        );
    }

    #[test]
    fn test_file_name_rejects_trailing_slash() {
        let feed = Feed {
            id: "https://xyz.org/download/".to_string(),
            ..Feed::default()
        };
        assert!(file_name(&feed).is_err());
    }

    #[test]
    fn test_render_minimal_feed() {
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:georss="http://www.georss.org/georss" xml:lang="en">
 <id>http://xyz.org/download/en.xml</id>
 <title>XYZ Example INSPIRE Download Service</title>
 <rights>Copyright (c) 2012, XYZ; all rights reserved</rights>
 <updated>2012-03-31T13:45:03Z</updated>
 <author>
  <name>John Doe</name>
  <email>doe@xyz.org</email>
 </author>
</feed>"#;

        assert_eq!(render_string(&minimal_feed()), expected);
    }

    #[test]
    fn test_render_stylesheet_instruction() {
        let mut feed = minimal_feed();
        feed.stylesheet = Some("https://xyz.org/style/atom.xsl".to_string());

        let output = render_string(&feed);
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert_eq!(
            lines.next(),
            Some(r#"<?xml-stylesheet href="https://xyz.org/style/atom.xsl" type="text/xsl" media="screen"?>"#)
        );
        assert!(lines.next().unwrap().starts_with("<feed "));
        assert!(!output.contains("stylesheet>"));
    }

    #[test]
    fn test_render_escapes_attribute_values() {
        let mut feed = minimal_feed();
        feed.links.push(Link {
            rel: Some("related".to_string()),
            title: Some("WFS <direct access>".to_string()),
            ..Link::new("http://xyz.org/wfs?request=GetCapabilities&service=WFS")
        });

        let output = render_string(&feed);
        assert!(output.contains(
            r#"href="http://xyz.org/wfs?request=GetCapabilities&amp;service=WFS""#
        ));
        assert!(output.contains(r#"title="WFS &lt;direct access&gt;""#));
    }

    #[test]
    fn test_render_entry_in_schema_order() {
        let mut feed = minimal_feed();
        feed.entries.push(Entry {
            id: "http://xyz.org/data/waternetwork_feed.xml".to_string(),
            title: Some("Water network ABC Dataset Feed".to_string()),
            summary: Some("This is the entry for water network ABC Dataset".to_string()),
            links: vec![Link {
                rel: Some("alternate".to_string()),
                media_type: Some("application/zip".to_string()),
                hreflang: Some("en".to_string()),
                length: Some(1234),
                time: Some("2012-03-31T13:45:03Z".to_string()),
                bbox: Some("47.202 5.755 55.183 15.253".to_string()),
                ..Link::new("http://xyz.org/data/wn.zip")
            }],
            updated: Some("2012-03-31T13:45:03Z".to_string()),
            polygon: Some("47.202 5.755 55.183 5.755 55.183 15.253 47.202 5.755".to_string()),
            categories: vec![Category {
                term: "http://www.opengis.net/def/crs/EPSG/0/4258".to_string(),
                label: Some("ETRS89".to_string()),
            }],
            spatial_dataset_identifier_code: Some("wn_id1".to_string()),
            ..Entry::default()
        });

        let output = render_string(&feed);
        let expected_entry = r#" <entry>
  <id>http://xyz.org/data/waternetwork_feed.xml</id>
  <title>Water network ABC Dataset Feed</title>
  <summary>This is the entry for water network ABC Dataset</summary>
  <link href="http://xyz.org/data/wn.zip" rel="alternate" type="application/zip" hreflang="en" length="1234" time="2012-03-31T13:45:03Z" bbox="47.202 5.755 55.183 15.253"/>
  <updated>2012-03-31T13:45:03Z</updated>
  <georss:polygon>47.202 5.755 55.183 5.755 55.183 15.253 47.202 5.755</georss:polygon>
  <category term="http://www.opengis.net/def/crs/EPSG/0/4258" label="ETRS89"/>
  <inspire_dls:spatial_dataset_identifier_code>wn_id1</inspire_dls:spatial_dataset_identifier_code>
 </entry>
</feed>"#;
        assert!(
            output.ends_with(expected_entry),
            "unexpected entry rendering:\n{output}"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut feed = minimal_feed();
        feed.links.push(Link::new("http://xyz.org/a?x=1&y=2"));
        assert_eq!(render(&feed).unwrap(), render(&feed).unwrap());
    }

    #[test]
    fn test_write_to_file() {
        let dir = std::env::temp_dir().join("inspire_atom_write_test");
        std::fs::create_dir_all(&dir).unwrap();

        let bytes = render(&minimal_feed()).unwrap();
        let path = write_to_file(&bytes, &dir, "en.xml").expect("Failed to write feed");

        assert_eq!(path, dir.join("en.xml"));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);

        std::fs::remove_dir_all(&dir).ok();
    }
}
