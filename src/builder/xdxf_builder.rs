//! XDXF encoder.
//!
//! The document is produced in two passes. The first pass streams the
//! `<xdxf>` skeleton through a quick-xml [`Writer`], injecting the already
//! escaped article markup as raw text. The second pass parses that buffer
//! back into a small element tree, which rejects anything that is not
//! well-formed, and writes it out again with two-space indentation.
//!
//! Elements holding only child elements are written one child per line;
//! elements holding text are written on a single line so that no whitespace
//! is added inside definitions.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::builder::dict_builder::BuildContext;
use crate::storage::Dictionary;
use crate::utils::io_utils::create_output_file;
use crate::{Result, DictError};

pub const XDXF_FORMAT: &str = "logical";
pub const XDXF_REVISION: &str = "33";
const INDENT: &str = "  ";

/// Encodes one [`Dictionary`] as an XDXF document.
pub struct XdxfBuilder<'a> {
    dict: &'a Dictionary,
}

impl<'a> XdxfBuilder<'a> {
    pub fn new(dict: &'a Dictionary) -> Self {
        Self { dict }
    }

    /// First pass: the unindented document, without XML declaration.
    pub fn build_document(&self) -> Result<Vec<u8>> {
        let dict = self.dict;
        let meta = dict.meta();
        let mut writer = Writer::new(Vec::new());

        let mut root = BytesStart::new("xdxf");
        root.push_attribute(("format", XDXF_FORMAT));
        root.push_attribute(("revision", XDXF_REVISION));
        root.push_attribute(("lang_from", dict.lang_from()));
        root.push_attribute(("lang_to", dict.lang_to()));
        writer.write_event(Event::Start(root))?;

        writer.write_event(Event::Start(BytesStart::new("meta_info")))?;
        write_text_element(&mut writer, "title", &meta.title)?;
        if !meta.full_title.trim().is_empty() {
            write_text_element(&mut writer, "full_title", &meta.full_title)?;
        }
        if !meta.authors.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("authors")))?;
            for author in &meta.authors {
                write_text_element(&mut writer, "author", author)?;
            }
            writer.write_event(Event::End(BytesEnd::new("authors")))?;
        }
        write_text_element(&mut writer, "description", &meta.description)?;

        if !dict.abbreviations().is_empty() {
            writer.write_event(Event::Start(BytesStart::new("abbreviations")))?;
            for abbreviation in dict.abbreviations() {
                let mut abbr_def = BytesStart::new("abbr_def");
                if let Some(code) = abbreviation.category().xdxf_code() {
                    abbr_def.push_attribute(("type", code));
                }
                writer.write_event(Event::Start(abbr_def))?;
                let markup = format!("{}{}", abbreviation.xdxf_key(), abbreviation.xdxf_value());
                writer.write_event(Event::Text(BytesText::from_escaped(markup)))?;
                writer.write_event(Event::End(BytesEnd::new("abbr_def")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("abbreviations")))?;
        }

        write_text_element(&mut writer, "file_ver", &dict.file_version())?;
        write_text_element(&mut writer, "creation_date", &dict.creation_date().format("%d-%m-%Y").to_string())?;
        if !meta.source_url.trim().is_empty() {
            write_text_element(&mut writer, "dict_src_url", &meta.source_url)?;
        }
        writer.write_event(Event::End(BytesEnd::new("meta_info")))?;

        writer.write_event(Event::Start(BytesStart::new("lexicon")))?;
        for article in dict.articles() {
            let markup = format!("{}{}", article.xdxf_key(), article.xdxf_value(dict.abbreviations()));
            writer.write_event(Event::Start(BytesStart::new("ar")))?;
            writer.write_event(Event::Text(BytesText::from_escaped(markup)))?;
            writer.write_event(Event::End(BytesEnd::new("ar")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("lexicon")))?;

        writer.write_event(Event::End(BytesEnd::new("xdxf")))?;
        Ok(writer.into_inner())
    }

    /// Both passes: the indented document with its XML declaration.
    pub fn build(&self) -> Result<Vec<u8>> {
        let document = self.build_document()?;
        pretty_print(&document)
    }

    /// Writes `{id}.{direction}.dict.xdxf` into `output_dir`.
    pub fn save(&self, output_dir: &Path, ctx: &BuildContext) -> Result<PathBuf> {
        use std::io::Write;

        let file_name = format!("{}.dict.xdxf", self.dict.base_name());
        ctx.info(format_args!("Writing {} articles to {}", self.dict.articles().len(), file_name));
        let xml = self.build()?;
        let mut writer = create_output_file(output_dir, &file_name)?;
        writer.write_all(&xml)?;
        writer.flush()?;
        ctx.debug(format_args!("Wrote {} bytes", xml.len()));
        Ok(output_dir.join(file_name))
    }
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text.trim())))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Parsed node of the intermediate tree. Text is kept in its escaped form.
#[derive(Debug)]
enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug)]
struct XmlElement {
    name: String,
    /// Tag content between `<` and `>`: name and attributes
    raw_start: String,
    children: Vec<XmlNode>,
}

impl XmlElement {
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    fn is_block(&self) -> bool {
        !self.children.is_empty() && self.children.iter().all(|c| matches!(c, XmlNode::Element(_)))
    }
}

/// Second pass: parses `xml` and writes it back indented, prefixed with an
/// XML declaration.
///
/// # Errors
///
/// Returns a parser error when `xml` is not well-formed, and
/// `InvalidDataFormat` when it has no single root element.
pub fn pretty_print(xml: &[u8]) -> Result<Vec<u8>> {
    let root = parse_tree(std::str::from_utf8(xml)?)?;

    let mut writer = Writer::new(Vec::with_capacity(xml.len() + xml.len() / 4));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    write_element(&mut writer, &root, 0)?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    Ok(writer.into_inner())
}

fn parse_tree(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                stack.push(XmlElement {
                    name: std::str::from_utf8(e.name().as_ref())?.to_string(),
                    raw_start: std::str::from_utf8(&e)?.to_string(),
                    children: Vec::new(),
                });
            }
            Event::Empty(e) => {
                let element = XmlElement {
                    name: std::str::from_utf8(e.name().as_ref())?.to_string(),
                    raw_start: std::str::from_utf8(&e)?.to_string(),
                    children: Vec::new(),
                };
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(e) => {
                let qname = e.name();
                let name = std::str::from_utf8(qname.as_ref())?;
                let element = stack
                    .pop()
                    .ok_or_else(|| DictError::invalid_data_format(format!("unexpected </{}>", name)))?;
                if element.name != name {
                    return Err(DictError::invalid_data_format(format!(
                        "expected </{}>, found </{}>",
                        element.name, name
                    )));
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                let text = std::str::from_utf8(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.push_text(text),
                    None if text.trim().is_empty() => {}
                    None => return Err(DictError::invalid_data_format("text outside the root element")),
                }
            }
            Event::GeneralRef(e) => {
                let entity = format!("&{};", std::str::from_utf8(&e)?);
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| DictError::invalid_data_format("entity outside the root element"))?;
                parent.push_text(&entity);
            }
            Event::CData(e) => {
                let cdata = format!("<![CDATA[{}]]>", std::str::from_utf8(&e)?);
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| DictError::invalid_data_format("CDATA outside the root element"))?;
                parent.children.push(XmlNode::Text(cdata));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DictError::invalid_data_format(format!("unclosed <{}>", open.name)));
    }
    root.ok_or_else(|| DictError::invalid_data_format("no root element"))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(DictError::invalid_data_format("more than one root element")),
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement, depth: usize) -> Result<()> {
    let start = BytesStart::from_content(element.raw_start.as_str(), element.name.len());
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if element.is_block() {
        let child_indent = format!("\n{}", INDENT.repeat(depth + 1));
        for child in &element.children {
            writer.write_event(Event::Text(BytesText::from_escaped(child_indent.as_str())))?;
            write_node(writer, child, depth + 1)?;
        }
        let end_indent = format!("\n{}", INDENT.repeat(depth));
        writer.write_event(Event::Text(BytesText::from_escaped(end_indent)))?;
    } else {
        for child in &element.children {
            write_inline(writer, child)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode, depth: usize) -> Result<()> {
    match node {
        XmlNode::Element(element) => write_element(writer, element, depth),
        XmlNode::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?;
            Ok(())
        }
    }
}

// Mixed content is written back exactly as parsed.
fn write_inline(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(element) => {
            let start = BytesStart::from_content(element.raw_start.as_str(), element.name.len());
            if element.children.is_empty() {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }
            writer.write_event(Event::Start(start))?;
            for child in &element.children {
                write_inline(writer, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
        }
        XmlNode::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?;
        }
    }
    Ok(())
}
