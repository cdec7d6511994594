//! Word document reader.
//!
//! A `.docx` is a ZIP archive; the body lives in `word/document.xml` and the
//! optional core properties (title, subject) in `docProps/core.xml`. Legacy
//! binary `.doc` files are not archives and fail with `Error::Archive`.

use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::traits::DocumentReader;
use crate::types::{Document, FILE_NAME_KEY, FILE_PATH_KEY, TOPIC_KEY};

const DOCUMENT_PART: &str = "word/document.xml";
const CORE_PROPS_PART: &str = "docProps/core.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxReader;

impl DocxReader {
    pub fn new() -> Self { Self }
}

impl DocumentReader for DocxReader {
    fn load_data(&self, path: &Path) -> Result<Vec<Document>> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        let body = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| Error::NotFound(format!("{} in {}", DOCUMENT_PART, path.display())))?;
        let text = extract_plaintext_from_docx_xml(&body);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let mut doc = Document::new(file_name.clone(), text);
        doc.metadata.insert(FILE_NAME_KEY.into(), Value::String(file_name));
        doc.metadata.insert(FILE_PATH_KEY.into(), Value::String(path.to_string_lossy().to_string()));

        if let Some(core) = read_part(&mut archive, CORE_PROPS_PART)? {
            if let Some(subject) = extract_core_property(&core, "dc:subject") {
                doc.metadata.insert(TOPIC_KEY.into(), Value::String(subject));
            }
            if let Some(title) = extract_core_property(&core, "dc:title") {
                doc.metadata.insert("title".into(), Value::String(title));
            }
        }
        Ok(vec![doc])
    }
}

fn read_part(archive: &mut zip::ZipArchive<File>, name: &str) -> Result<Option<String>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| Error::Parse { part: name.to_string(), reason: e.to_string() })?;
    Ok(Some(xml))
}

/// Extract text content from DOCX XML (word/document.xml).
///
/// Paragraphs are separated by a blank line so the splitter sees them as
/// paragraph boundaries.
pub fn extract_plaintext_from_docx_xml(xml: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // `w:tab` inside `w:tabs` declares a tab stop, not a tab character
    let mut tab_stops_depth = 0usize;
    let mut chars = xml.chars();

    while let Some(c) = chars.next() {
        if c == '<' {
            let mut tag = String::new();
            for tc in chars.by_ref() {
                if tc == '>' { break; }
                tag.push(tc);
            }
            let self_closing = tag.ends_with('/');
            let closing = tag.starts_with('/');
            let name = tag
                .trim_start_matches('/')
                .split(|ch: char| ch.is_whitespace() || ch == '/')
                .next()
                .unwrap_or("");
            match (name, closing) {
                ("w:t", false) => in_text = !self_closing,
                ("w:t", true) => in_text = false,
                ("w:tabs", false) if !self_closing => tab_stops_depth += 1,
                ("w:tabs", true) => tab_stops_depth = tab_stops_depth.saturating_sub(1),
                ("w:tab", false) if tab_stops_depth == 0 => current.push('\t'),
                ("w:br" | "w:cr", false) => current.push('\n'),
                ("w:p", true) => {
                    paragraphs.push(std::mem::take(&mut current));
                }
                ("w:p", false) if self_closing => paragraphs.push(String::new()),
                _ => {}
            }
        } else if in_text {
            current.push(c);
        }
    }
    if !current.is_empty() { paragraphs.push(current); }

    let joined = paragraphs
        .iter()
        .map(|p| p.trim_end())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    decode_entities(&joined)
}

/// Text of the first `<tag>...</tag>` element in `xml`, if non-empty.
fn extract_core_property(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let start = xml.find(&open)?;
    let after_open = &xml[start + open.len()..];
    // skip attributes, reject self-closing elements
    let gt = after_open.find('>')?;
    if after_open[..gt].ends_with('/') { return None; }
    let body = &after_open[gt + 1..];
    let end = body.find(&close)?;
    let value = decode_entities(body[..end].trim());
    if value.is_empty() { None } else { Some(value) }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') { return s.to_string(); }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_runs_and_tabs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
            <w:p><w:r><w:t>Col A</w:t><w:tab/><w:t>Col B</w:t></w:r></w:p>
            <w:p/>
            <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
        </w:body></w:document>"#;
        assert_eq!(extract_plaintext_from_docx_xml(xml), "Hello world\n\nCol A\tCol B\n\nCell");
    }

    #[test]
    fn tab_stop_definitions_are_not_text() {
        let xml = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/><w:tab w:val="right" w:pos="9000"/></w:tabs></w:pPr><w:r><w:t>Body</w:t><w:tab/><w:t>end</w:t></w:r></w:p>"#;
        assert_eq!(extract_plaintext_from_docx_xml(xml), "Body\tend");
    }

    #[test]
    fn entities_are_decoded() {
        let xml = "<w:p><w:r><w:t>Salt &amp; pepper &lt;3 &#233;t&#xE9; &bogus</w:t></w:r></w:p>";
        assert_eq!(extract_plaintext_from_docx_xml(xml), "Salt & pepper <3 été &bogus");
    }

    #[test]
    fn core_subject_and_empty_title() {
        let core = r#"<cp:coreProperties><dc:title/><dc:subject>Water &amp; wells</dc:subject></cp:coreProperties>"#;
        assert_eq!(extract_core_property(core, "dc:subject").as_deref(), Some("Water & wells"));
        assert_eq!(extract_core_property(core, "dc:title"), None);
        assert_eq!(extract_core_property(core, "dc:creator"), None);
    }
}
