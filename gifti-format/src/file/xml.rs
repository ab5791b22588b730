use std::io::{self, Write};

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{GiftiError, Result};

const INDENT: &[u8] = b"   ";

#[inline(always)]
fn write_error(e: quick_xml::Error) -> GiftiError {
    match e {
        quick_xml::Error::Io(e) => GiftiError::Write(io::Error::new(e.kind(), e.to_string())),
        e => GiftiError::Write(io::Error::new(io::ErrorKind::Other, e.to_string())),
    }
}

/// Indenting XML element writer.
///
/// Elements holding only text or CDATA are written on one line so their
/// content is not padded with whitespace.
pub(crate) struct XmlWriter<W: Write> {
    writer: Writer<W>,
    /// Open elements and whether each has child elements yet.
    open: Vec<(&'static str, bool)>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(inner: W) -> XmlWriter<W> {
        XmlWriter {
            writer: Writer::new(inner),
            open: Vec::new(),
        }
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.get_mut().write_all(bytes).map_err(GiftiError::Write)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(write_error)
    }

    fn new_line(&mut self) -> Result<()> {
        self.raw(b"\n")?;
        for _ in 0..self.open.len() {
            self.raw(INDENT)?;
        }
        Ok(())
    }

    pub fn write_declaration(&mut self, version: &str, encoding: &str) -> Result<()> {
        self.event(Event::Decl(BytesDecl::new(version, Some(encoding), None)))
    }

    pub fn write_doctype(&mut self, doctype: &str) -> Result<()> {
        self.raw(b"\n<!DOCTYPE ")?;
        self.raw(doctype.as_bytes())?;
        self.raw(b">")
    }

    pub fn start_element(&mut self, name: &'static str, attributes: &[(&str, String)]) -> Result<()> {
        if let Some(parent) = self.open.last_mut() {
            parent.1 = true;
        }
        self.new_line()?;

        let mut start = BytesStart::new(name);
        for (key, value) in attributes {
            start.push_attribute((*key, value.as_str()));
        }
        self.event(Event::Start(start))?;
        self.open.push((name, false));
        Ok(())
    }

    pub fn end_element(&mut self) -> Result<()> {
        let (name, has_children) = match self.open.pop() {
            Some(element) => element,
            None => return Ok(()),
        };
        if has_children {
            self.new_line()?;
        }
        self.event(Event::End(BytesEnd::new(name)))
    }

    pub fn write_characters(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    pub fn write_cdata(&mut self, text: &str) -> Result<()> {
        self.event(Event::CData(BytesCData::new(text)))
    }

    /// `<name><![CDATA[text]]></name>`
    pub fn write_element_cdata(&mut self, name: &'static str, text: &str) -> Result<()> {
        self.start_element(name, &[])?;
        self.write_cdata(text)?;
        self.end_element()
    }

    /// `<name>text</name>`
    pub fn write_element_characters(&mut self, name: &'static str, text: &str) -> Result<()> {
        self.start_element(name, &[])?;
        self.write_characters(text)?;
        self.end_element()
    }

    pub fn finish(mut self) -> Result<W> {
        while !self.open.is_empty() {
            self.end_element()?;
        }
        self.raw(b"\n")?;
        Ok(self.writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_layout() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.start_element("GIFTI", &[("Version", "1.0".to_string())]).unwrap();
        xml.start_element("MD", &[]).unwrap();
        xml.write_element_cdata("Name", "a<b").unwrap();
        xml.end_element().unwrap();
        xml.write_element_characters("Data", "1 2").unwrap();
        let out = String::from_utf8(xml.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            "\n<GIFTI Version=\"1.0\">\n   <MD>\n      <Name><![CDATA[a<b]]></Name>\n   </MD>\n   <Data>1 2</Data>\n</GIFTI>\n"
        );
    }
}
