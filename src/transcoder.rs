//! XML persistence of a [`Solution`].
//!
//! Serialization and parsing are two visitors over one schema:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <Solution Version="1" Name="Demo" Comment="">
//!   <Project Name="App">
//!     <SourceFile Path="/res/Strings.resx" Type="resx" Comment=""/>
//!     <TargetFile Path="/res/Strings.de.resx" Type="resx" Comment=""/>
//!   </Project>
//! </Solution>
//! ```
//!
//! Attribute order is fixed and children follow collection order, so an
//! unchanged tree always serializes to the same bytes.

use std::{borrow::Cow, fs, io, path::Path};

use quick_xml::{
    Reader, Writer,
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event, attributes::Attribute},
    name::QName,
};
use tracing::debug;

use crate::{
    error::Error,
    model::{FileReference, Project, Solution},
    visitor::{Acceptor, AcceptorMut, Visitor, VisitorMut},
};

/// Highest document version this crate reads and the one it writes.
pub const SCHEMA_VERSION: u32 = 1;

const SOLUTION: &str = "Solution";
const PROJECT: &str = "Project";
const SOURCE_FILE: &str = "SourceFile";
const TARGET_FILE: &str = "TargetFile";

/// Serializes `solution` to an XML document.
pub fn model_to_xml(solution: &Solution) -> Result<String, Error> {
    let mut serializer = XmlSerializer {
        writer: Writer::new(Vec::new()),
    };
    serializer
        .writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    solution.accept(&mut serializer, WriteCursor::root())?;
    serializer.newline(0)?;

    String::from_utf8(serializer.writer.into_inner())
        .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Parses `xml` into `target`, which should be freshly created.
///
/// Every failure is reported as [`Error::Parse`]. On failure `target` is left
/// partially populated and must be discarded.
pub fn xml_to_model(xml: &str, target: &mut Solution) -> Result<(), Error> {
    let root = Element::parse_document(xml)?;
    target.accept_mut(&mut XmlParser, &root)?;
    target.mark_saved();
    debug!(
        name = target.name(),
        projects = target.projects().len(),
        "parsed solution"
    );
    Ok(())
}

/// Writes `solution` to `path` and clears its modified flag.
pub fn save_solution(path: impl AsRef<Path>, solution: &mut Solution) -> Result<(), Error> {
    let xml = model_to_xml(solution)?;
    fs::write(path.as_ref(), xml)?;
    solution.mark_saved();
    Ok(())
}

/// Reads the solution document at `path`.
pub fn load_solution(path: impl AsRef<Path>) -> Result<Solution, Error> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    let mut solution = Solution::default();
    xml_to_model(&xml, &mut solution)?;
    Ok(solution)
}

/// Which slot of its project a file reference occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileRole {
    Source,
    Target,
}

#[derive(Debug, Clone, Copy)]
struct WriteCursor {
    depth: usize,
    role: FileRole,
}

impl WriteCursor {
    fn root() -> Self {
        Self {
            depth: 0,
            role: FileRole::Target,
        }
    }

    fn child(self, role: FileRole) -> Self {
        Self {
            depth: self.depth + 1,
            role,
        }
    }
}

/// Escapes an attribute value. Line breaks and tabs become character
/// references since XML attribute normalization would turn them into spaces.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#xA;")
        .replace('\r', "&#xD;")
        .replace('\t', "&#x9;")
}

/// Opens `name` with `attributes` escaped by [`escape_attribute`].
pub(crate) fn start_element<'a>(name: &'a str, attributes: &[(&'a str, &str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(value).into_bytes()),
        });
    }
    start
}

struct XmlSerializer {
    writer: Writer<Vec<u8>>,
}

impl XmlSerializer {
    fn newline(&mut self, depth: usize) -> Result<(), Error> {
        let indent = format!("\n{}", "  ".repeat(depth));
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(indent)))?;
        Ok(())
    }
}

impl Visitor<WriteCursor> for XmlSerializer {
    type Value = ();
    type Error = Error;

    fn visit_solution(&mut self, node: &Solution, cursor: WriteCursor) -> Result<(), Error> {
        let version = SCHEMA_VERSION.to_string();
        self.newline(cursor.depth)?;
        self.writer.write_event(Event::Start(start_element(
            SOLUTION,
            &[
                ("Version", version.as_str()),
                ("Name", node.name()),
                ("Comment", node.comment()),
            ],
        )))?;
        for project in node.projects() {
            project.accept(self, cursor.child(FileRole::Target))?;
        }
        self.newline(cursor.depth)?;
        self.writer.write_event(Event::End(BytesEnd::new(SOLUTION)))?;
        Ok(())
    }

    fn visit_project(&mut self, node: &Project, cursor: WriteCursor) -> Result<(), Error> {
        self.newline(cursor.depth)?;
        self.writer.write_event(Event::Start(start_element(
            PROJECT,
            &[("Name", node.name())],
        )))?;
        if let Some(source) = node.source() {
            source.accept(self, cursor.child(FileRole::Source))?;
        }
        for target in node.targets() {
            target.accept(self, cursor.child(FileRole::Target))?;
        }
        self.newline(cursor.depth)?;
        self.writer.write_event(Event::End(BytesEnd::new(PROJECT)))?;
        Ok(())
    }

    fn visit_file_reference(
        &mut self,
        node: &FileReference,
        cursor: WriteCursor,
    ) -> Result<(), Error> {
        let name = match cursor.role {
            FileRole::Source => SOURCE_FILE,
            FileRole::Target => TARGET_FILE,
        };
        self.newline(cursor.depth)?;
        self.writer.write_event(Event::Empty(start_element(
            name,
            &[
                ("Path", node.path.as_str()),
                ("Type", node.format.as_str()),
                ("Comment", node.comment.as_str()),
            ],
        )))?;
        Ok(())
    }
}

/// Minimal element tree used as the parse cursor.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

fn parse_failure(reader: &Reader<&[u8]>, error: impl std::fmt::Display) -> Error {
    Error::parse_error(format!("{} (at byte {})", error, reader.buffer_position()))
}

impl Element {
    fn from_start(reader: &Reader<&[u8]>, start: &BytesStart) -> Result<Self, Error> {
        let name = String::from_utf8(start.name().as_ref().to_vec())
            .map_err(|e| parse_failure(reader, e))?;
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| parse_failure(reader, e))?;
            let key = String::from_utf8(attr.key.as_ref().to_vec())
                .map_err(|e| parse_failure(reader, e))?;
            let value = attr
                .unescape_value()
                .map_err(|e| parse_failure(reader, e))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn parse_document(xml: &str) -> Result<Self, Error> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| parse_failure(&reader, e))?;
            match event {
                Event::Start(start) => {
                    let element = Element::from_start(&reader, &start)?;
                    if stack.is_empty() && root.is_some() {
                        return Err(parse_failure(&reader, "more than one root element"));
                    }
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = Element::from_start(&reader, &start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_none() => root = Some(element),
                        None => return Err(parse_failure(&reader, "more than one root element")),
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| parse_failure(&reader, "unbalanced end tag"))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(parse_failure(&reader, "unexpected text content"));
                    }
                }
                Event::CData(_) => {
                    return Err(parse_failure(&reader, "unexpected CDATA section"));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(parse_failure(&reader, "unexpected end of document"));
        }
        root.ok_or_else(|| Error::parse_error("document has no root element"))
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, name: &str) -> Result<&str, Error> {
        self.attribute(name).ok_or_else(|| {
            Error::parse_error(format!("<{}> is missing attribute `{name}`", self.name))
        })
    }

    fn expect_name(&self, name: &str) -> Result<(), Error> {
        if self.name == name {
            Ok(())
        } else {
            Err(Error::parse_error(format!(
                "expected <{name}>, found <{}>",
                self.name
            )))
        }
    }
}

/// Builds the tree in place from an [`Element`] cursor.
struct XmlParser;

impl<'e> VisitorMut<&'e Element> for XmlParser {
    type Value = ();
    type Error = Error;

    fn visit_solution(&mut self, node: &mut Solution, element: &'e Element) -> Result<(), Error> {
        element.expect_name(SOLUTION)?;
        if let Some(version) = element.attribute("Version") {
            let version: u32 = version.trim().parse().map_err(|_| {
                Error::parse_error(format!("invalid document version `{version}`"))
            })?;
            if version > SCHEMA_VERSION {
                return Err(Error::parse_error(format!(
                    "document version {version} is newer than supported version {SCHEMA_VERSION}"
                )));
            }
        }
        node.set_name(element.required("Name")?);
        node.set_comment(element.attribute("Comment").unwrap_or_default());

        for child in &element.children {
            child.expect_name(PROJECT)?;
            let mut project = Project::default();
            project.accept_mut(self, child)?;
            node.add_project(project);
        }
        Ok(())
    }

    fn visit_project(&mut self, node: &mut Project, element: &'e Element) -> Result<(), Error> {
        node.set_name(element.attribute("Name").unwrap_or_default());

        for child in &element.children {
            let mut file = FileReference::default();
            match child.name.as_str() {
                SOURCE_FILE => {
                    if node.source().is_some() {
                        return Err(Error::parse_error(format!(
                            "project `{}` has more than one <{SOURCE_FILE}>",
                            node.name()
                        )));
                    }
                    file.accept_mut(self, child)?;
                    node.set_source(file).map_err(|e| Error::parse_error(e.to_string()))?;
                }
                TARGET_FILE => {
                    file.accept_mut(self, child)?;
                    node.add_target(file).map_err(|e| Error::parse_error(e.to_string()))?;
                }
                other => {
                    return Err(Error::parse_error(format!(
                        "unexpected element <{other}> in <{PROJECT}>"
                    )));
                }
            }
        }
        Ok(())
    }

    fn visit_file_reference(
        &mut self,
        node: &mut FileReference,
        element: &'e Element,
    ) -> Result<(), Error> {
        node.path = element.required("Path")?.to_string();
        node.format = element.required("Type")?.to_string();
        node.comment = element.attribute("Comment").unwrap_or_default().to_string();
        Ok(())
    }
}
