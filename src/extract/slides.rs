//! Slide text extraction for OOXML presentations.
//!
//! Each `ppt/slides/slideN.xml` part is walked with xml-rs and every DrawingML
//! paragraph (`a:p`) becomes one output line. Slides are emitted in slide
//! number order, since archive entry order is not guaranteed.

use std::io::{Cursor, Read};
use xml::reader::{EventReader, XmlEvent};
use zip::ZipArchive;

const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Extract slide text from a `.pptx` payload
pub fn extract_pptx_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("Failed to open PPTX: {}", e))?;

    let mut slides: Vec<(u32, String)> = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| format!("Failed to read PPTX entry {}: {}", i, e))?;
        let name = file.name().to_string();

        let Some(number) = slide_number(&name) else {
            continue;
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| format!("Failed to read {}: {}", name, e))?;

        slides.push((number, slide_paragraphs(&content)?.join("\n")));
    }

    slides.sort_by_key(|(number, _)| *number);

    tracing::debug!("[SlideExtractor] Read {} slides", slides.len());

    Ok(slides
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// `ppt/slides/slide12.xml` -> 12; layouts, masters and rels parts -> None
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Collect the text of every `a:p` paragraph in a slide part
fn slide_paragraphs(xml: &str) -> Result<Vec<String>, String> {
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut inside_text = false;

    for event in EventReader::from_str(xml) {
        match event.map_err(|e| format!("Malformed slide XML: {}", e))? {
            XmlEvent::StartElement { name, .. } => match name.local_name.as_str() {
                "p" if name.prefix.as_deref() == Some("a") => current = Some(String::new()),
                "t" => inside_text = true,
                "br" => {
                    if let Some(p) = current.as_mut() {
                        p.push('\n');
                    }
                }
                _ => {}
            },
            XmlEvent::Characters(s) | XmlEvent::Whitespace(s) if inside_text => {
                if let Some(p) = current.as_mut() {
                    p.push_str(&s);
                }
            }
            XmlEvent::EndElement { name } => match name.local_name.as_str() {
                "t" => inside_text = false,
                "p" if name.prefix.as_deref() == Some("a") => {
                    if let Some(p) = current.take() {
                        paragraphs.push(p);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn slide_xml(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            body
        )
    }

    fn package(parts: &[(&str, String)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_slide_number() {
        assert_eq!(slide_number("ppt/slides/slide3.xml"), Some(3));
        assert_eq!(slide_number("ppt/slides/_rels/slide3.xml.rels"), None);
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
    }

    #[test]
    fn test_slides_in_numeric_order() {
        let bytes = package(&[
            ("ppt/slides/slide10.xml", slide_xml(&["Tenth"])),
            ("ppt/slides/slide2.xml", slide_xml(&["Second", "More"])),
            ("ppt/slides/slide1.xml", slide_xml(&["First"])),
        ]);
        let text = extract_pptx_text(&bytes).unwrap();
        assert_eq!(text, "First\nSecond\nMore\nTenth");
    }

    #[test]
    fn test_runs_within_paragraph_concatenate() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><a:p><a:r><a:t>Krebs </a:t></a:r><a:r><a:t>cycle</a:t></a:r></a:p></p:sld>"#;
        assert_eq!(slide_paragraphs(xml).unwrap(), vec!["Krebs cycle".to_string()]);
    }

    #[test]
    fn test_table_cells_are_collected() {
        let xml = r#"<p:sld xmlns:a="a" xmlns:p="p"><p:sp><p:txBody><a:p><a:r><a:t>Enzymes</a:t></a:r></a:p></p:txBody></p:sp><p:graphicFrame><a:graphic><a:graphicData><a:tbl><a:tr><a:tc><a:txBody><a:p><a:r><a:t>Amylase</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>Starch</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame></p:sld>"#;
        assert_eq!(
            slide_paragraphs(xml).unwrap(),
            vec!["Enzymes".to_string(), "Amylase".to_string(), "Starch".to_string()]
        );
    }

    #[test]
    fn test_not_a_zip_is_an_error() {
        assert!(extract_pptx_text(b"plain bytes").is_err());
    }
}
