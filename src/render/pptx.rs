//! OOXML presentation writer
//!
//! Packages a [`SlideDeck`] as a `.pptx`: one master, one blank layout, a
//! minimal theme and one part per slide. Every text box is a plain
//! word-wrapped shape; no placeholders are used.

use super::slides::{
    Slide, SlideDeck, SlideParagraph, TextAlign, TextBox, SLIDE_HEIGHT, SLIDE_WIDTH,
};
use crate::error::RenderError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Serialize a deck into `.pptx` bytes
pub fn write_pptx(deck: &SlideDeck) -> Result<Vec<u8>, RenderError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut part = |name: &str, body: String| -> Result<(), RenderError> {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    part("[Content_Types].xml", content_types(deck.len()))?;
    part("_rels/.rels", root_rels())?;
    part("docProps/core.xml", core_props(&deck.title))?;
    part("docProps/app.xml", app_props(deck.len()))?;
    part("ppt/presentation.xml", presentation(deck.len()))?;
    part("ppt/_rels/presentation.xml.rels", presentation_rels(deck.len()))?;
    part("ppt/slideMasters/slideMaster1.xml", slide_master())?;
    part(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        relationships(&[
            ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
            ("rId2", "theme", "../theme/theme1.xml"),
        ]),
    )?;
    part("ppt/slideLayouts/slideLayout1.xml", slide_layout())?;
    part(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        relationships(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
    )?;
    part("ppt/theme/theme1.xml", theme())?;

    for (index, slide) in deck.slides.iter().enumerate() {
        let number = index + 1;
        part(&format!("ppt/slides/slide{}.xml", number), slide_xml(slide))?;
        part(
            &format!("ppt/slides/_rels/slide{}.xml.rels", number),
            relationships(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        )?;
    }

    let bytes = zip.finish()?.into_inner();

    tracing::info!(
        "[PptxWriter] Packaged {:?}: {} slides, {} bytes",
        deck.title,
        deck.len(),
        bytes.len()
    );

    Ok(bytes)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

fn content_types(slide_count: usize) -> String {
    let mut overrides = String::new();
    let mut add = |part: &str, content_type: &str| {
        overrides.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            part, content_type
        ));
    };
    add(
        "/ppt/presentation.xml",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
    );
    add(
        "/ppt/slideMasters/slideMaster1.xml",
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml",
    );
    add(
        "/ppt/slideLayouts/slideLayout1.xml",
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
    );
    add(
        "/ppt/theme/theme1.xml",
        "application/vnd.openxmlformats-officedocument.theme+xml",
    );
    add(
        "/docProps/core.xml",
        "application/vnd.openxmlformats-package.core-properties+xml",
    );
    add(
        "/docProps/app.xml",
        "application/vnd.openxmlformats-officedocument.extended-properties+xml",
    );
    for number in 1..=slide_count {
        add(
            &format!("/ppt/slides/slide{}.xml", number),
            "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
        );
    }

    format!(
        r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{}</Types>"#,
        XML_DECL, overrides
    )
}

fn root_rels() -> String {
    format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{}/extended-properties" Target="docProps/app.xml"/></Relationships>"#,
        XML_DECL, NS_RELS, REL_BASE, REL_BASE
    )
}

/// Relationships part from `(id, type suffix, target)` triples
fn relationships(entries: &[(&str, &str, &str)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, kind, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                id, REL_BASE, kind, target
            )
        })
        .collect();
    format!(r#"{}<Relationships xmlns="{}">{}</Relationships>"#, XML_DECL, NS_RELS, body)
}

fn core_props(title: &str) -> String {
    format!(
        r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>studymate</dc:creator></cp:coreProperties>"#,
        XML_DECL,
        escape_xml(title)
    )
}

fn app_props(slide_count: usize) -> String {
    format!(
        r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>studymate</Application><Slides>{}</Slides></Properties>"#,
        XML_DECL, slide_count
    )
}

fn presentation(slide_count: usize) -> String {
    let slide_ids = if slide_count == 0 {
        String::new()
    } else {
        let ids: String = (0..slide_count)
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 3 + i))
            .collect();
        format!("<p:sldIdLst>{}</p:sldIdLst>", ids)
    };
    format!(
        r#"{}<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}<p:sldSz cx="{}" cy="{}" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        XML_DECL, NS_A, NS_R, NS_P, slide_ids, SLIDE_WIDTH, SLIDE_HEIGHT
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let slide_targets: Vec<(String, String)> = (0..slide_count)
        .map(|i| (format!("rId{}", 3 + i), format!("slides/slide{}.xml", i + 1)))
        .collect();
    let mut entries: Vec<(&str, &str, &str)> = vec![
        ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        ("rId2", "theme", "theme/theme1.xml"),
    ];
    entries.extend(
        slide_targets
            .iter()
            .map(|(id, target)| (id.as_str(), "slide", target.as_str())),
    );
    relationships(&entries)
}

/// Empty shape tree header shared by master, layout and slides
const GROUP_HEADER: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

fn slide_master() -> String {
    format!(
        r#"{}<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles></p:sldMaster>"#,
        XML_DECL, NS_A, NS_R, NS_P, GROUP_HEADER
    )
}

fn slide_layout() -> String {
    format!(
        r#"{}<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        XML_DECL, NS_A, NS_R, NS_P, GROUP_HEADER
    )
}

fn theme() -> String {
    let colors = [
        ("dk1", r#"<a:sysClr val="windowText" lastClr="000000"/>"#.to_string()),
        ("lt1", r#"<a:sysClr val="window" lastClr="FFFFFF"/>"#.to_string()),
        ("dk2", srgb("1F497D")),
        ("lt2", srgb("EEECE1")),
        ("accent1", srgb("4F46E5")),
        ("accent2", srgb("6366F1")),
        ("accent3", srgb("9BBB59")),
        ("accent4", srgb("8064A2")),
        ("accent5", srgb("4BACC6")),
        ("accent6", srgb("F79646")),
        ("hlink", srgb("0000FF")),
        ("folHlink", srgb("800080")),
    ];
    let color_scheme: String = colors
        .iter()
        .map(|(name, value)| format!("<a:{0}>{1}</a:{0}>", name, value))
        .collect();

    let fonts = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = format!(r#"<a:ln w="9525">{}</a:ln>"#, fill);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        r#"{decl}<a:theme xmlns:a="{ns}" name="Studymate"><a:themeElements><a:clrScheme name="Studymate">{colors}</a:clrScheme><a:fontScheme name="Studymate"><a:majorFont>{fonts}</a:majorFont><a:minorFont>{fonts}</a:minorFont></a:fontScheme><a:fmtScheme name="Studymate"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#,
        decl = XML_DECL,
        ns = NS_A,
        colors = color_scheme,
        fonts = fonts,
        fill = fill,
        line = line,
        effect = effect,
    )
}

fn srgb(hex: &str) -> String {
    format!(r#"<a:srgbClr val="{}"/>"#, hex)
}

fn slide_xml(slide: &Slide) -> String {
    let shapes = format!(
        "{}{}",
        text_box_xml(&slide.body, 2, "Content"),
        text_box_xml(&slide.footer, 3, "Footer")
    );
    format!(
        r#"{}<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        XML_DECL, NS_A, NS_R, NS_P, GROUP_HEADER, shapes
    )
}

fn text_box_xml(text_box: &TextBox, id: u32, name: &str) -> String {
    let paragraphs: String = if text_box.paragraphs.is_empty() {
        "<a:p/>".to_string()
    } else {
        text_box.paragraphs.iter().map(paragraph_xml).collect()
    };

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:noAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        id = id,
        name = name,
        x = text_box.x,
        y = text_box.y,
        cx = text_box.width,
        cy = text_box.height,
        paragraphs = paragraphs,
    )
}

fn paragraph_xml(paragraph: &SlideParagraph) -> String {
    let align = match paragraph.align {
        TextAlign::Left => "l",
        TextAlign::Center => "ctr",
    };
    let bold = if paragraph.bold { r#" b="1""# } else { "" };
    let fill = paragraph
        .color
        .map(|[r, g, b]| {
            format!(
                r#"<a:solidFill><a:srgbClr val="{:02X}{:02X}{:02X}"/></a:solidFill>"#,
                r, g, b
            )
        })
        .unwrap_or_default();

    format!(
        r#"<a:p><a:pPr algn="{}"/><a:r><a:rPr lang="en-US" sz="{}"{} dirty="0">{}</a:rPr><a:t>{}</a:t></a:r></a:p>"#,
        align,
        paragraph.size_pt * 100,
        bold,
        fill,
        escape_xml(&paragraph.text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Flashcard;
    use crate::extract::extract_text;
    use crate::render::slides::build_deck;
    use std::io::Read;
    use zip::ZipArchive;

    fn sample_deck() -> SlideDeck {
        build_deck(
            &[
                Flashcard::new("What is <DNA>?", "Deoxyribonucleic acid"),
                Flashcard::new("Q & A", "Line one\\nLine two"),
            ],
            "Biology",
        )
    }

    #[test]
    fn test_package_has_one_part_per_slide() {
        let bytes = write_pptx(&sample_deck()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let slide_parts = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .count();
        assert_eq!(slide_parts, 4);

        let mut content_types = String::new();
        archive
            .by_name("[Content_Types].xml")
            .unwrap()
            .read_to_string(&mut content_types)
            .unwrap();
        assert!(content_types.contains("/ppt/slides/slide4.xml"));
    }

    #[test]
    fn test_slide_text_round_trips_through_extractor() {
        let bytes = write_pptx(&sample_deck()).unwrap();
        let text = extract_text(&bytes, "pptx");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "What is <DNA>?",
                "Biology - Card 1 (Question)",
                "Deoxyribonucleic acid",
                "Biology - Card 1 (Answer)",
                "Q & A",
                "Biology - Card 2 (Question)",
                "Line one",
                "Line two",
                "Biology - Card 2 (Answer)",
            ]
        );
    }

    #[test]
    fn test_empty_deck_is_still_a_package() {
        let deck = build_deck(&[], "Empty");
        let bytes = write_pptx(&deck).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.file_names().any(|n| n == "ppt/presentation.xml"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&apos;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }
}
