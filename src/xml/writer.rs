use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::core::{RetencionError, escape_xml_text};

/// Event writer for SENIAT documents: UTF-8 declaration, 2-space indent,
/// text escaped with [`escape_xml_text`].
pub struct XmlWriter {
    inner: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, RetencionError> {
        let mut w = Self {
            inner: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        };
        w.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(w)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), RetencionError> {
        self.inner
            .write_event(event)
            .map_err(|e| RetencionError::Xml(format!("XML write error: {e}")))
    }

    /// Open `name` with the given attributes (values are escaped by quick-xml).
    pub fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RetencionError> {
        let mut start = BytesStart::new(name);
        start.extend_attributes(attrs.iter().copied());
        self.emit(Event::Start(start))
    }

    pub fn close(&mut self, name: &str) -> Result<(), RetencionError> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    /// `<name>text</name>` on one line.
    pub fn leaf(&mut self, name: &str, text: &str) -> Result<(), RetencionError> {
        self.open(name, &[])?;
        self.emit(Event::Text(BytesText::from_escaped(escape_xml_text(text))))?;
        self.close(name)
    }

    /// Write `name` around whatever `body` writes.
    pub fn block<F>(&mut self, name: &str, body: F) -> Result<(), RetencionError>
    where
        F: FnOnce(&mut Self) -> Result<(), RetencionError>,
    {
        self.open(name, &[])?;
        body(self)?;
        self.close(name)
    }

    pub fn finish(self) -> Result<String, RetencionError> {
        String::from_utf8(self.inner.into_inner().into_inner())
            .map_err(|e| RetencionError::Xml(format!("document is not UTF-8: {e}")))
    }
}
