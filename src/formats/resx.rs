//! Support for the `.resx` XML string-resource format.
//!
//! Only string resources are read: `<data>` elements carrying a `type` or
//! `mimetype` attribute (embedded files, images, serialized objects) are
//! skipped. Schema, `resheader`, `metadata` and `assembly` elements are
//! ignored on load and the standard headers are regenerated on save.

use std::{
    collections::HashSet,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use quick_xml::{
    Reader, Writer,
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use tracing::debug;

use crate::{
    cancel::{CancellationToken, Cancellable},
    error::Error,
    fs::{FileSystem, StdFileSystem},
    traits::{EntrySink, EntryStream, ResourceCodec, release, save_entries},
    transcoder::start_element,
    types::{ResourceEntry, SaveSummary},
};

const RESHEADERS: [(&str, &str); 4] = [
    ("resmimetype", "text/microsoft-resx"),
    ("version", "2.0"),
    (
        "reader",
        "System.Resources.ResXResourceReader, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
    ),
    (
        "writer",
        "System.Resources.ResXResourceWriter, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
    ),
];

/// Codec for `.resx` files.
#[derive(Clone)]
pub struct ResxCodec {
    fs: Arc<dyn FileSystem>,
}

impl ResxCodec {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl Default for ResxCodec {
    fn default() -> Self {
        Self::new(Arc::new(StdFileSystem))
    }
}

impl ResourceCodec for ResxCodec {
    fn format_tag(&self) -> &'static str {
        "resx"
    }

    fn load(&self, path: &Path, cancel: &CancellationToken) -> Result<EntryStream, Error> {
        if !self.fs.exists(path) {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let file = self.fs.open_read(path)?;
        // Auto-detect BOM, decode UTF-16 to UTF-8; passthrough UTF-8
        let decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .strip_bom(true)
            .build(file);
        let entries = ResxEntries::new(BufReader::new(decoder), path);
        Ok(Box::new(Cancellable::new(entries, cancel.clone())))
    }

    fn save(
        &self,
        path: &Path,
        entries: &mut dyn Iterator<Item = ResourceEntry>,
        cancel: &CancellationToken,
    ) -> Result<SaveSummary, Error> {
        let file = self.fs.create(path)?;
        let sink = ResxSink {
            writer: Writer::new(BufWriter::new(file)),
        };
        save_entries(sink, path, entries, cancel)
    }
}

/// Pull parser yielding one entry per `<data>` element.
pub struct ResxEntries<R: BufRead> {
    reader: Reader<R>,
    path: PathBuf,
    buf: Vec<u8>,
    seen: HashSet<String>,
    root_open: bool,
    root_seen: bool,
    finished: bool,
}

impl<R: BufRead> ResxEntries<R> {
    pub fn new(reader: R, path: &Path) -> Self {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            path: path.to_path_buf(),
            buf: Vec::new(),
            seen: HashSet::new(),
            root_open: false,
            root_seen: false,
            finished: false,
        }
    }

    fn format_error(&self, message: impl std::fmt::Display) -> Error {
        Error::format_error(
            &self.path,
            format!("{} (at byte {})", message, self.reader.buffer_position()),
        )
    }

    fn read_event(&mut self) -> Result<Event<'static>, Error> {
        self.buf.clear();
        let event = self
            .reader
            .read_event_into(&mut self.buf)
            .map(Event::into_owned);
        event.map_err(|e| self.format_error(e))
    }

    fn skip_element(&mut self, start: &BytesStart) -> Result<(), Error> {
        let mut skip = Vec::new();
        self.reader
            .read_to_end_into(start.name(), &mut skip)
            .map(|_| ())
            .map_err(|e| self.format_error(e))
    }

    fn next_entry(&mut self) -> Result<Option<ResourceEntry>, Error> {
        loop {
            match self.read_event()? {
                Event::Start(e) if !self.root_open => {
                    self.open_root(&e)?;
                }
                Event::Empty(e) if !self.root_open => {
                    self.open_root(&e)?;
                    self.root_open = false;
                }
                Event::Start(e) if e.local_name().as_ref() == b"data" => {
                    if let Some(entry) = self.read_data(&e, false)? {
                        return Ok(Some(entry));
                    }
                }
                Event::Empty(e) if e.local_name().as_ref() == b"data" => {
                    if let Some(entry) = self.read_data(&e, true)? {
                        return Ok(Some(entry));
                    }
                }
                Event::Start(e) => self.skip_element(&e)?,
                Event::End(_) => self.root_open = false,
                Event::Text(t) if !self.root_open => {
                    if !is_whitespace(&t) {
                        return Err(self.format_error("text outside of the <root> element"));
                    }
                }
                Event::Eof => {
                    if !self.root_seen {
                        return Err(self.format_error("missing <root> element"));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    fn open_root(&mut self, e: &BytesStart) -> Result<(), Error> {
        if self.root_seen {
            return Err(self.format_error("more than one top-level element"));
        }
        if e.local_name().as_ref() != b"root" {
            let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
            return Err(self.format_error(format!(
                "expected <root> as document element, found <{name}>"
            )));
        }
        self.root_seen = true;
        self.root_open = true;
        Ok(())
    }

    /// Reads one `<data>` element. Returns `None` for non-string resources.
    fn read_data(&mut self, e: &BytesStart, empty: bool) -> Result<Option<ResourceEntry>, Error> {
        let mut key = None;
        let mut typed = false;
        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(|err| self.format_error(err))?;
            match attr.key.local_name().as_ref() {
                b"name" => {
                    let value = attr
                        .unescape_value()
                        .map_err(|err| self.format_error(err))?;
                    key = Some(value.into_owned());
                }
                b"type" | b"mimetype" => typed = true,
                _ => {}
            }
        }
        let key = key.ok_or_else(|| self.format_error("<data> element missing 'name'"))?;

        let mut value = String::new();
        let mut comment = String::new();
        if !empty {
            loop {
                match self.read_event()? {
                    Event::Start(child) => match child.local_name().as_ref() {
                        b"value" => value = self.read_text(&child)?,
                        b"comment" => comment = self.read_text(&child)?,
                        _ => self.skip_element(&child)?,
                    },
                    Event::End(_) => break,
                    Event::Eof => {
                        return Err(self.format_error("unexpected end of file inside <data>"));
                    }
                    _ => {}
                }
            }
        }

        if typed {
            debug!(path = %self.path.display(), key, "skipping non-string resource");
            return Ok(None);
        }
        if !self.seen.insert(key.clone()) {
            return Err(self.format_error(format!("duplicate resource name `{key}`")));
        }
        Ok(Some(ResourceEntry {
            key,
            value,
            comment,
        }))
    }

    fn read_text(&mut self, start: &BytesStart) -> Result<String, Error> {
        let mut text = String::new();
        loop {
            match self.read_event()? {
                Event::Text(t) => {
                    let unescaped = t.unescape().map_err(|err| self.format_error(err))?;
                    text.push_str(&unescaped);
                }
                Event::CData(c) => {
                    let raw = String::from_utf8(c.into_inner().into_owned())
                        .map_err(|err| self.format_error(err))?;
                    text.push_str(&raw);
                }
                Event::End(_) => return Ok(text),
                Event::Start(child) => {
                    let name = String::from_utf8_lossy(child.name().as_ref()).into_owned();
                    let parent = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    return Err(self.format_error(format!(
                        "unexpected element <{name}> inside <{parent}>"
                    )));
                }
                Event::Eof => {
                    return Err(self.format_error("unexpected end of file inside text element"));
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for ResxEntries<R> {
    type Item = Result<ResourceEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn is_whitespace(text: &BytesText) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

/// Escapes element text, keeping carriage returns as character references so
/// that XML line-end normalization in other readers cannot drop them.
fn escape_text(text: &str) -> String {
    escape(text).replace('\r', "&#xD;")
}

struct ResxSink<W: Write> {
    writer: Writer<BufWriter<W>>,
}

impl<W: Write> ResxSink<W> {
    fn newline(&mut self, indent: &str) -> Result<(), Error> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(format!("\n{indent}"))))?;
        Ok(())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), Error> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn value_element(
        &mut self,
        element: &str,
        attributes: &[(&str, &str)],
        value: &str,
        comment: &str,
    ) -> Result<(), Error> {
        self.newline("  ")?;
        self.writer
            .write_event(Event::Start(start_element(element, attributes)))?;
        self.newline("    ")?;
        self.text_element("value", value)?;
        if !comment.is_empty() {
            self.newline("    ")?;
            self.text_element("comment", comment)?;
        }
        self.newline("  ")?;
        self.writer.write_event(Event::End(BytesEnd::new(element)))?;
        Ok(())
    }

    fn close_root(&mut self) -> Result<(), Error> {
        self.newline("")?;
        self.writer.write_event(Event::End(BytesEnd::new("root")))?;
        self.newline("")
    }
}

impl<W: Write> EntrySink for ResxSink<W> {
    fn begin(&mut self) -> Result<(), Error> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.newline("")?;
        self.writer
            .write_event(Event::Start(BytesStart::new("root")))?;
        for (name, value) in RESHEADERS {
            self.value_element("resheader", &[("name", name)], value, "")?;
        }
        Ok(())
    }

    fn write_entry(&mut self, entry: &ResourceEntry) -> Result<(), Error> {
        self.value_element(
            "data",
            &[("name", entry.key.as_str()), ("xml:space", "preserve")],
            &entry.value,
            &entry.comment,
        )
    }

    fn finish(mut self) -> Result<(), Error> {
        let closing = self.close_root();
        release(self.writer.into_inner(), closing)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Cursor;

    fn parse(xml: &str) -> Vec<Result<ResourceEntry, Error>> {
        ResxEntries::new(Cursor::new(xml.as_bytes()), Path::new("test.resx")).collect()
    }

    fn parse_ok(xml: &str) -> Vec<ResourceEntry> {
        parse(xml)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn write(entries: &[ResourceEntry]) -> String {
        let mut out = Vec::new();
        let sink = ResxSink {
            writer: Writer::new(BufWriter::new(&mut out)),
        };
        save_entries(
            sink,
            Path::new("test.resx"),
            &mut entries.iter().cloned(),
            &CancellationToken::new(),
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_basic_resx() {
        let xml = indoc! {r#"
            <?xml version="1.0" encoding="utf-8"?>
            <root>
              <xsd:schema id="root" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
                <xsd:element name="root" />
              </xsd:schema>
              <resheader name="resmimetype">
                <value>text/microsoft-resx</value>
              </resheader>
              <data name="Hello" xml:space="preserve">
                <value>Hello, world</value>
                <comment>Greeting on the start page</comment>
              </data>
              <data name="Bye" xml:space="preserve">
                <value>Goodbye</value>
              </data>
            </root>
        "#};
        let entries = parse_ok(xml);
        assert_eq!(
            entries,
            vec![
                ResourceEntry::new("Hello", "Hello, world", "Greeting on the start page"),
                ResourceEntry::new("Bye", "Goodbye", ""),
            ]
        );
    }

    #[test]
    fn test_non_string_resources_are_skipped() {
        let xml = indoc! {r#"
            <root>
              <data name="Icon" type="System.Drawing.Icon, System.Drawing" mimetype="application/x-microsoft.net.object.bytearray.base64">
                <value>AAABAAEAEBAAAAAAAABoBQAAFgAAACgAAAAQAAAAIAAAAAEACAAAAAAAAAEAAAAAAAA=</value>
              </data>
              <data name="Title">
                <value>Main window</value>
              </data>
            </root>
        "#};
        let entries = parse_ok(xml);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "Title");
    }

    #[test]
    fn test_whitespace_and_entities_preserved() {
        let xml = r#"<root><data name="pad"><value>  two  spaces &amp; &lt;tag&gt;
line</value></data><data name="cdata"><value><![CDATA[<b>bold</b>]]></value></data></root>"#;
        let entries = parse_ok(xml);
        assert_eq!(entries[0].value, "  two  spaces & <tag>\nline");
        assert_eq!(entries[1].value, "<b>bold</b>");
    }

    #[test]
    fn test_empty_value_forms() {
        let xml = r#"<root><data name="a" /><data name="b"><value /></data><data name="c"><value></value></data></root>"#;
        let entries = parse_ok(xml);
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.value.is_empty() && e.comment.is_empty()));
    }

    #[test]
    fn test_wrong_root_is_format_error() {
        let results = parse("<resources><string name=\"a\">A</string></resources>");
        assert_eq!(results.len(), 1);
        let err = results.into_iter().next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
        assert!(err.to_string().contains("expected <root>"));
    }

    #[test]
    fn test_missing_name_is_format_error() {
        let results = parse("<root><data><value>x</value></data></root>");
        let err = results.into_iter().next().unwrap().unwrap_err();
        assert!(err.to_string().contains("missing 'name'"));
    }

    #[test]
    fn test_duplicate_key_is_format_error() {
        let results = parse(
            r#"<root><data name="a"><value>1</value></data><data name="a"><value>2</value></data></root>"#,
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_malformed_xml_is_format_error() {
        let results = parse(r#"<root><data name="a"><value>1</value></oops></root>"#);
        let last = results.last().unwrap();
        assert!(matches!(last, Err(Error::Format { .. })));
    }

    #[test]
    fn test_empty_document_is_format_error() {
        let results = parse("");
        assert!(matches!(results.as_slice(), [Err(Error::Format { .. })]));
    }

    #[test]
    fn test_written_document_layout() {
        let out = write(&[
            ResourceEntry::new("Hello", "Hi & bye", "greeting"),
            ResourceEntry::new("Empty", "", ""),
        ]);
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>"));
        assert!(out.contains("<value>text/microsoft-resx</value>"));
        assert!(out.contains(concat!(
            "  <data name=\"Hello\" xml:space=\"preserve\">\n",
            "    <value>Hi &amp; bye</value>\n",
            "    <comment>greeting</comment>\n",
            "  </data>"
        )));
        assert!(out.contains("<data name=\"Empty\" xml:space=\"preserve\">\n    <value></value>\n  </data>"));
        assert!(out.ends_with("</root>\n"));
    }

    #[test]
    fn test_key_whitespace_written_as_character_references() {
        let entries = vec![ResourceEntry::new("a\r\nb\tc", "v", "")];
        let out = write(&entries);
        assert!(out.contains("<data name=\"a&#xD;&#xA;b&#x9;c\" xml:space=\"preserve\">"));
        assert_eq!(parse_ok(&out), entries);
    }

    #[test]
    fn test_write_then_read_preserves_content() {
        let entries = vec![
            ResourceEntry::new("multi", "line one\r\nline two\n", "  indented comment"),
            ResourceEntry::new("quotes", "\"quoted\" 'single'", ""),
            ResourceEntry::new("unicode", "Grüße, 世界", "ü"),
        ];
        let out = write(&entries);
        assert!(out.contains("line one&#xD;\nline two"));
        assert_eq!(parse_ok(&out), entries);
    }
}
