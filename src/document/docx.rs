//! DOCX to HTML conversion
//!
//! Opens the zip container, walks `word/document.xml` and emits simple
//! semantic HTML: paragraphs, headings, bullet lists, tables and
//! bold/italic/underline runs. Raw text is collected alongside, one entry
//! per paragraph.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::{DocumentError, Result};
use super::types::ConvertedDocument;

const DOCUMENT_PART: &str = "word/document.xml";

/// Default cap on the decompressed size of `word/document.xml`
pub const DEFAULT_MAX_EXPANDED_BYTES: usize = 64 * 1024 * 1024;

/// Convert DOCX bytes into HTML and raw text
pub fn convert(bytes: &[u8]) -> Result<ConvertedDocument> {
    convert_with_limit(bytes, DEFAULT_MAX_EXPANDED_BYTES)
}

/// Convert DOCX bytes, refusing a document part that inflates past
/// `max_expanded` bytes
///
/// An empty upload yields an empty rendering.
pub fn convert_with_limit(bytes: &[u8], max_expanded: usize) -> Result<ConvertedDocument> {
    if bytes.is_empty() {
        return Ok(ConvertedDocument::default());
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| DocumentError::ParseError(format!("missing {}", DOCUMENT_PART)))?;

    // The declared size comes from the archive and may lie; the read is capped too
    let declared = usize::try_from(part.size()).unwrap_or(usize::MAX);
    if declared > max_expanded {
        return Err(DocumentError::TooLarge {
            size: declared,
            max: max_expanded,
        });
    }

    let mut document_xml = String::with_capacity(declared);
    part.take(max_expanded as u64 + 1)
        .read_to_string(&mut document_xml)?;
    if document_xml.len() > max_expanded {
        return Err(DocumentError::TooLarge {
            size: document_xml.len(),
            max: max_expanded,
        });
    }

    convert_document_xml(&document_xml)
}

/// Convert the contents of `word/document.xml`
pub fn convert_document_xml(xml: &str) -> Result<ConvertedDocument> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut writer = HtmlWriter::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => writer.start(&e),
            Event::Empty(e) => writer.empty(&e),
            Event::End(e) => writer.end(e.local_name().as_ref()),
            Event::Text(t) => {
                if writer.in_text {
                    writer.text(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(writer.finish())
}

/// Character formatting of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunFormat {
    bold: bool,
    italic: bool,
    underline: bool,
}

impl RunFormat {
    fn open_tags(&self, out: &mut String) {
        if self.bold {
            out.push_str("<strong>");
        }
        if self.italic {
            out.push_str("<em>");
        }
        if self.underline {
            out.push_str("<u>");
        }
    }

    fn close_tags(&self, out: &mut String) {
        if self.underline {
            out.push_str("</u>");
        }
        if self.italic {
            out.push_str("</em>");
        }
        if self.bold {
            out.push_str("</strong>");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem,
}

#[derive(Debug)]
struct ParagraphBuilder {
    kind: BlockKind,
    html: String,
    text: String,
    /// Formatting currently open in `html`
    open: RunFormat,
    has_break: bool,
}

impl ParagraphBuilder {
    fn new() -> Self {
        Self {
            kind: BlockKind::Paragraph,
            html: String::new(),
            text: String::new(),
            open: RunFormat::default(),
            has_break: false,
        }
    }

    fn switch_format(&mut self, format: RunFormat) {
        if self.open != format {
            self.open.close_tags(&mut self.html);
            format.open_tags(&mut self.html);
            self.open = format;
        }
    }

    fn push_text(&mut self, format: RunFormat, text: &str) {
        self.switch_format(format);
        self.html.push_str(&html_escape::encode_text(text));
        self.text.push_str(text);
    }

    fn push_break(&mut self) {
        self.html.push_str("<br />");
        self.text.push('\n');
        self.has_break = true;
    }

    fn finish_html(mut self) -> (BlockKind, String, String) {
        self.switch_format(RunFormat::default());
        (self.kind, self.html, self.text)
    }
}

#[derive(Debug, Default)]
struct HtmlWriter {
    html: String,
    paragraphs: Vec<String>,
    paragraph: Option<ParagraphBuilder>,
    /// Paragraphs nested inside a paragraph (text boxes) flow into the outer one
    nested_paragraphs: usize,
    in_paragraph_props: bool,
    in_run_props: bool,
    run: Option<RunFormat>,
    in_text: bool,
    list_open: bool,
}

impl HtmlWriter {
    fn start(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            b"p" => {
                if self.paragraph.is_some() {
                    self.nested_paragraphs += 1;
                } else {
                    self.paragraph = Some(ParagraphBuilder::new());
                }
            }
            b"pPr" => self.in_paragraph_props = true,
            b"r" => self.run = Some(RunFormat::default()),
            b"rPr" => self.in_run_props = true,
            b"t" => self.in_text = self.run.is_some(),
            b"tbl" => {
                self.close_list();
                self.html.push_str("<table>\n");
            }
            b"tr" => self.html.push_str("<tr>"),
            b"tc" => self.html.push_str("<td>"),
            _ => self.property(e),
        }
    }

    fn empty(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            b"br" | b"cr" if self.in_run() => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.push_break();
                }
            }
            b"tab" if self.in_run() => {
                let format = self.run.unwrap_or_default();
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.push_text(format, "\t");
                }
            }
            _ => self.property(e),
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"p" => {
                if self.nested_paragraphs > 0 {
                    self.nested_paragraphs -= 1;
                    let format = self.run.unwrap_or_default();
                    if let Some(paragraph) = self.paragraph.as_mut() {
                        paragraph.push_text(format, " ");
                    }
                } else if let Some(paragraph) = self.paragraph.take() {
                    self.emit_paragraph(paragraph);
                }
            }
            b"pPr" => self.in_paragraph_props = false,
            b"r" => {
                self.run = None;
                self.in_text = false;
            }
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            b"tbl" => {
                self.close_list();
                self.html.push_str("</table>\n");
            }
            b"tr" => self.html.push_str("</tr>\n"),
            b"tc" => {
                self.close_list();
                self.html.push_str("</td>");
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let format = self.run.unwrap_or_default();
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push_text(format, text);
        }
    }

    fn in_run(&self) -> bool {
        self.run.is_some() && !self.in_paragraph_props
    }

    /// Paragraph style, numbering and run formatting properties
    fn property(&mut self, e: &BytesStart<'_>) {
        let name = e.local_name();
        let name = name.as_ref();

        if self.in_paragraph_props && self.nested_paragraphs == 0 {
            let Some(paragraph) = self.paragraph.as_mut() else {
                return;
            };
            match name {
                b"pStyle" => {
                    if let Some(kind) = attr_val(e, b"val").and_then(|v| style_kind(&v)) {
                        paragraph.kind = kind;
                    }
                }
                b"outlineLvl" => {
                    if let Some(level) = attr_val(e, b"val").and_then(|v| v.parse::<u8>().ok()) {
                        if level < 9 {
                            paragraph.kind = BlockKind::Heading((level + 1).min(6));
                        }
                    }
                }
                b"numPr" => {
                    if !matches!(paragraph.kind, BlockKind::Heading(_)) {
                        paragraph.kind = BlockKind::ListItem;
                    }
                }
                _ => {}
            }
            return;
        }

        if self.in_run_props {
            let enabled = toggle_enabled(e);
            if let Some(run) = self.run.as_mut() {
                match name {
                    b"b" => run.bold = enabled,
                    b"i" => run.italic = enabled,
                    b"u" => run.underline = enabled,
                    _ => {}
                }
            }
        }
    }

    fn emit_paragraph(&mut self, paragraph: ParagraphBuilder) {
        let has_content = !paragraph.text.trim().is_empty() || paragraph.has_break;
        let (kind, html, text) = paragraph.finish_html();

        if !has_content {
            return;
        }

        match kind {
            BlockKind::ListItem => {
                if !self.list_open {
                    self.html.push_str("<ul>\n");
                    self.list_open = true;
                }
                self.html.push_str("<li>");
                self.html.push_str(&html);
                self.html.push_str("</li>\n");
            }
            BlockKind::Heading(level) => {
                self.close_list();
                self.html
                    .push_str(&format!("<h{level}>{html}</h{level}>\n", level = level));
            }
            BlockKind::Paragraph => {
                self.close_list();
                self.html.push_str("<p>");
                self.html.push_str(&html);
                self.html.push_str("</p>\n");
            }
        }

        self.paragraphs.push(text);
    }

    fn close_list(&mut self) {
        if self.list_open {
            self.html.push_str("</ul>\n");
            self.list_open = false;
        }
    }

    fn finish(mut self) -> ConvertedDocument {
        if let Some(paragraph) = self.paragraph.take() {
            self.emit_paragraph(paragraph);
        }
        self.close_list();

        ConvertedDocument {
            html: self.html,
            plain_text: self.paragraphs.join("\n\n"),
        }
    }
}

fn attr_val(e: &BytesStart<'_>, key_local: &[u8]) -> Option<String> {
    e.attributes()
        .with_checks(false)
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key_local)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` and friends are off
fn toggle_enabled(e: &BytesStart<'_>) -> bool {
    match attr_val(e, b"val") {
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "none"),
        None => true,
    }
}

/// Map a paragraph style id to a block kind, tolerant of "Heading1",
/// "heading 1" and similar variants
fn style_kind(style: &str) -> Option<BlockKind> {
    let lower = style.to_ascii_lowercase();

    if lower == "title" {
        return Some(BlockKind::Heading(1));
    }
    if let Some(rest) = lower.strip_prefix("heading") {
        let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
        let level = digits.parse::<u8>().ok()?;
        return Some(BlockKind::Heading(level.clamp(1, 6)));
    }
    if lower.starts_with("listparagraph") || lower.starts_with("listbullet") {
        return Some(BlockKind::ListItem);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            inner
        )
    }

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_and_raw_text() {
        let xml = body(
            r#"<w:p><w:r><w:t>Sam was born on 11-05-2005</w:t></w:r></w:p>
               <w:p><w:r><w:t xml:space="preserve">his friend </w:t></w:r><w:r><w:t>Shiva</w:t></w:r></w:p>"#,
        );
        let converted = convert_document_xml(&xml).unwrap();

        assert_eq!(
            converted.html,
            "<p>Sam was born on 11-05-2005</p>\n<p>his friend Shiva</p>\n"
        );
        assert_eq!(
            converted.plain_text,
            "Sam was born on 11-05-2005\n\nhis friend Shiva"
        );
    }

    #[test]
    fn test_headings_and_formatting() {
        let xml = body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>
               <w:p><w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t> still</w:t></w:r><w:r><w:t> plain</w:t></w:r><w:r><w:rPr><w:i/><w:b w:val="0"/></w:rPr><w:t> it</w:t></w:r></w:p>"#,
        );
        let converted = convert_document_xml(&xml).unwrap();

        assert!(converted.html.contains("<h2>Intro</h2>"));
        assert!(converted
            .html
            .contains("<p><strong>bold still</strong> plain<em> it</em></p>"));
    }

    #[test]
    fn test_lists_are_grouped() {
        let xml = body(
            r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>one</w:t></w:r></w:p>
               <w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>two</w:t></w:r></w:p>
               <w:p><w:r><w:t>after</w:t></w:r></w:p>"#,
        );
        let converted = convert_document_xml(&xml).unwrap();

        assert_eq!(
            converted.html,
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<p>after</p>\n"
        );
    }

    #[test]
    fn test_tables_breaks_and_escaping() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>A &amp; B</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>x</w:t><w:br/><w:t>&lt;y&gt;</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let converted = convert_document_xml(&xml).unwrap();

        assert!(converted.html.starts_with("<table>\n<tr><td><p>A &amp; B</p>\n</td>"));
        assert!(converted.html.contains("<p>x<br />&lt;y&gt;</p>"));
        assert!(converted.plain_text.contains("A & B"));
        assert!(converted.plain_text.contains("x\n<y>"));
    }

    #[test]
    fn test_paragraph_props_tabs_are_ignored() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs><w:rPr><w:b/></w:rPr></w:pPr><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r></w:p>"#,
        );
        let converted = convert_document_xml(&xml).unwrap();

        assert_eq!(converted.html, "<p>a\tb</p>\n");
    }

    #[test]
    fn test_empty_paragraphs_dropped() {
        let xml = body(r#"<w:p/><w:p><w:r><w:t>   </w:t></w:r></w:p><w:p><w:r><w:t>kept</w:t></w:r></w:p>"#);
        let converted = convert_document_xml(&xml).unwrap();

        assert_eq!(converted.html, "<p>kept</p>\n");
        assert_eq!(converted.plain_text, "kept");
    }

    #[test]
    fn test_convert_from_zip() {
        let bytes = docx_bytes(&body(r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#));
        let converted = convert(&bytes).unwrap();
        assert_eq!(converted.html, "<p>Hello</p>\n");
    }

    #[test]
    fn test_not_a_zip() {
        let result = convert(b"\xd0\xcf\x11\xe0 legacy binary doc");
        assert!(matches!(result, Err(DocumentError::ParseError(_))));
    }

    #[test]
    fn test_zip_without_document_part() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        match convert(&bytes) {
            Err(DocumentError::ParseError(msg)) => assert!(msg.contains("word/document.xml")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_style_kind_variants() {
        assert_eq!(style_kind("Heading1"), Some(BlockKind::Heading(1)));
        assert_eq!(style_kind("heading 3"), Some(BlockKind::Heading(3)));
        assert_eq!(style_kind("Heading9"), Some(BlockKind::Heading(6)));
        assert_eq!(style_kind("Title"), Some(BlockKind::Heading(1)));
        assert_eq!(style_kind("ListParagraph"), Some(BlockKind::ListItem));
        assert_eq!(style_kind("Normal"), None);
    }

    #[test]
    fn test_expanded_size_is_capped() {
        let paragraph = format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", "a".repeat(10_000));
        let bytes = docx_bytes(&body(&paragraph.repeat(20)));
        assert!(bytes.len() < 4096);

        let result = convert_with_limit(&bytes, 64 * 1024);
        assert!(matches!(
            result,
            Err(DocumentError::TooLarge { max, .. }) if max == 64 * 1024
        ));

        let converted = convert_with_limit(&bytes, 1024 * 1024).unwrap();
        assert_eq!(converted.plain_text.len(), 20 * 10_000 + 19 * 2);
    }

    #[test]
    fn test_empty_upload_is_empty_rendering() {
        let converted = convert(&[]).unwrap();
        assert!(converted.html.is_empty());
        assert!(converted.plain_text.is_empty());
    }
}
