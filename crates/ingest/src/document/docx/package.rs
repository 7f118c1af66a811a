//! Reading a `.docx` ZIP package into a [`WordDocument`].
//!
//! Parts used:
//! - `word/document.xml`: body blocks and section properties
//! - `word/styles.xml`: style ids to display names
//! - `word/_rels/document.xml.rels`: header/footer part targets

use std::collections::HashMap;
use std::io::{Cursor, Read};

use docstruct_core::Formatting;
use roxmltree::{Document, Node};
use zip::result::ZipError;
use zip::ZipArchive;

use super::{Block, SectionParts, WordDocument, WordParagraph, WordTable};
use crate::document::ExtractionError;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";

/// Lowercase built-in style names that Word displays title-cased.
const BUILTIN_STYLE_PREFIXES: [&str; 10] = [
    "heading", "list", "caption", "header", "footer", "normal", "title", "subtitle", "toc",
    "body text",
];

/// Read the parts of a `.docx` needed for structural extraction.
pub fn read_package(bytes: &[u8]) -> Result<WordDocument, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| ExtractionError::Docx(format!("missing {DOCUMENT_PART}")))?;
    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => StyleNames::parse(&xml)?,
        None => StyleNames::default(),
    };
    let relationships = match read_part(&mut archive, RELS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let doc = parse_xml(&document_xml, DOCUMENT_PART)?;
    let body = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .ok_or_else(|| ExtractionError::Docx("document has no body".to_string()))?;

    let blocks = body
        .children()
        .filter_map(|node| {
            if node.has_tag_name((W_NS, "p")) {
                Some(Block::Paragraph(read_paragraph(node, &styles)))
            } else if node.has_tag_name((W_NS, "tbl")) {
                Some(Block::Table(read_table(node)))
            } else {
                None
            }
        })
        .collect();

    let sections = read_sections(body, &relationships, &mut archive)?;

    Ok(WordDocument {
        sections,
        body: blocks,
    })
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, ExtractionError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;
            Ok(Some(xml))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_xml<'x>(xml: &'x str, part: &str) -> Result<Document<'x>, ExtractionError> {
    Document::parse(xml).map_err(|source| ExtractionError::Xml {
        part: part.to_string(),
        source,
    })
}

fn w_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((W_NS, name))
}

fn w_child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name((W_NS, name)))
}

// ── Styles ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct StyleNames {
    by_id: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleNames {
    fn parse(xml: &str) -> Result<Self, ExtractionError> {
        let doc = parse_xml(xml, STYLES_PART)?;
        let mut names = StyleNames::default();
        for style in doc
            .root_element()
            .children()
            .filter(|n| n.has_tag_name((W_NS, "style")))
        {
            if w_attr(style, "type") != Some("paragraph") {
                continue;
            }
            let Some(id) = w_attr(style, "styleId") else {
                continue;
            };
            let name = w_child(style, "name")
                .and_then(|n| w_attr(n, "val"))
                .map(display_style_name)
                .unwrap_or_else(|| id.to_string());
            if matches!(w_attr(style, "default"), Some("1" | "true")) {
                names.default_paragraph = Some(name.clone());
            }
            names.by_id.insert(id.to_string(), name);
        }
        Ok(names)
    }

    fn resolve(&self, style_id: Option<&str>) -> String {
        match style_id {
            Some(id) => self.by_id.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => self.default_paragraph.clone().unwrap_or_default(),
        }
    }
}

/// `heading 1` -> `Heading 1`; custom names are kept verbatim.
fn display_style_name(name: &str) -> String {
    let is_builtin = name.chars().all(|c| !c.is_uppercase())
        && BUILTIN_STYLE_PREFIXES.iter().any(|p| name.starts_with(p));
    if !is_builtin {
        return name.to_string();
    }
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Paragraphs ──────────────────────────────────────────────────────

fn read_paragraph(node: Node, styles: &StyleNames) -> WordParagraph {
    let properties = w_child(node, "pPr");
    let style_id = properties
        .and_then(|p| w_child(p, "pStyle"))
        .and_then(|s| w_attr(s, "val"));
    let left_indent = properties
        .and_then(|p| w_child(p, "ind"))
        .and_then(|ind| w_attr(ind, "left").or_else(|| w_attr(ind, "start")))
        .and_then(|twips| twips.parse::<f64>().ok())
        .map(|twips| twips / 20.0);

    let mut paragraph = WordParagraph {
        style: styles.resolve(style_id),
        left_indent,
        ..WordParagraph::default()
    };
    collect_runs(node, &mut paragraph);
    paragraph
}

/// Gather run text and formatting, descending through hyperlinks, smart tags,
/// insertions and content controls but not deletions or drawings.
fn collect_runs(node: Node, paragraph: &mut WordParagraph) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(W_NS) {
            continue;
        }
        match child.tag_name().name() {
            "r" => read_run(child, paragraph),
            "pPr" | "del" | "moveFrom" => {}
            _ => collect_runs(child, paragraph),
        }
    }
}

fn read_run(run: Node, paragraph: &mut WordParagraph) {
    let properties = w_child(run, "rPr");
    paragraph.runs.push(Formatting {
        bold: properties.is_some_and(|p| toggle_on(p, "b")),
        italic: properties.is_some_and(|p| toggle_on(p, "i")),
        underline: properties
            .and_then(|p| w_child(p, "u"))
            .is_some_and(|u| w_attr(u, "val") != Some("none")),
    });

    for part in run.children().filter(|n| n.is_element()) {
        if part.tag_name().namespace() != Some(W_NS) {
            continue;
        }
        match part.tag_name().name() {
            "t" => paragraph.text.push_str(part.text().unwrap_or("")),
            "tab" => paragraph.text.push('\t'),
            "br" | "cr" => paragraph.text.push('\n'),
            _ => {}
        }
    }
}

fn toggle_on(properties: Node, name: &str) -> bool {
    w_child(properties, name)
        .is_some_and(|t| !matches!(w_attr(t, "val"), Some("0" | "false" | "off")))
}

fn paragraph_text(node: Node) -> String {
    let mut paragraph = WordParagraph::default();
    collect_runs(node, &mut paragraph);
    paragraph.text
}

// ── Tables ──────────────────────────────────────────────────────────

/// Cells spanning several grid columns repeat their text per column, and
/// vertically merged continuation cells repeat the text above them.
fn read_table(node: Node) -> WordTable {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for tr in node.children().filter(|n| n.has_tag_name((W_NS, "tr"))) {
        let mut row = Vec::new();
        for tc in tr.children().filter(|n| n.has_tag_name((W_NS, "tc"))) {
            let properties = w_child(tc, "tcPr");
            let span = properties
                .and_then(|p| w_child(p, "gridSpan"))
                .and_then(|g| w_attr(g, "val"))
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(1)
                .max(1);
            let continues_above = properties
                .and_then(|p| w_child(p, "vMerge"))
                .is_some_and(|v| w_attr(v, "val") != Some("restart"));

            let col = row.len();
            let text = match rows.last() {
                Some(above) if continues_above => above.get(col).cloned().unwrap_or_default(),
                _ => cell_text(tc),
            };
            row.extend(std::iter::repeat(text).take(span));
        }
        rows.push(row);
    }
    WordTable { rows }
}

fn cell_text(tc: Node) -> String {
    tc.children()
        .filter(|n| n.has_tag_name((W_NS, "p")))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Sections, headers and footers ───────────────────────────────────

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, ExtractionError> {
    let doc = parse_xml(xml, RELS_PART)?;
    Ok(doc
        .root_element()
        .children()
        .filter(|n| n.tag_name().name() == "Relationship")
        .filter_map(|rel| {
            let id = rel.attribute("Id")?;
            let target = rel.attribute("Target")?;
            let path = match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => format!("word/{target}"),
            };
            Some((id.to_string(), path))
        })
        .collect())
}

/// Default header/footer relationship ids of one `w:sectPr`.
struct SectionRefs {
    header: Option<String>,
    footer: Option<String>,
}

fn section_refs(sect_pr: Node) -> SectionRefs {
    let default_ref = |tag: &str| {
        sect_pr
            .children()
            .filter(|n| n.has_tag_name((W_NS, tag)))
            .find(|n| matches!(w_attr(*n, "type"), None | Some("default")))
            .and_then(|n| n.attribute((R_NS, "id")))
            .map(str::to_string)
    };
    SectionRefs {
        header: default_ref("headerReference"),
        footer: default_ref("footerReference"),
    }
}

/// Sections in document order: one per paragraph-level `w:sectPr`, plus the
/// body's trailing one. A section without its own default header or footer
/// inherits the previous section's.
fn read_sections(
    body: Node,
    relationships: &HashMap<String, String>,
    archive: &mut ZipArchive<Cursor<&[u8]>>,
) -> Result<Vec<SectionParts>, ExtractionError> {
    let mut sect_prs: Vec<Node> = body
        .children()
        .filter(|n| n.has_tag_name((W_NS, "p")))
        .filter_map(|p| w_child(p, "pPr"))
        .filter_map(|ppr| w_child(ppr, "sectPr"))
        .collect();
    if let Some(last) = w_child(body, "sectPr") {
        sect_prs.push(last);
    }

    let mut parts_cache: HashMap<String, Vec<String>> = HashMap::new();
    let mut sections = Vec::with_capacity(sect_prs.len());
    let mut inherited_header: Vec<String> = Vec::new();
    let mut inherited_footer: Vec<String> = Vec::new();

    for sect_pr in sect_prs {
        let refs = section_refs(sect_pr);
        let header_linked = refs.header.is_none();
        if let Some(id) = refs.header {
            inherited_header = load_part_paragraphs(&id, relationships, archive, &mut parts_cache)?;
        }
        if let Some(id) = refs.footer {
            inherited_footer = load_part_paragraphs(&id, relationships, archive, &mut parts_cache)?;
        }
        sections.push(SectionParts {
            header_linked,
            header: inherited_header.clone(),
            footer: inherited_footer.clone(),
        });
    }
    Ok(sections)
}

fn load_part_paragraphs(
    rel_id: &str,
    relationships: &HashMap<String, String>,
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    cache: &mut HashMap<String, Vec<String>>,
) -> Result<Vec<String>, ExtractionError> {
    let Some(path) = relationships.get(rel_id) else {
        tracing::warn!(rel_id, "header/footer relationship not found");
        return Ok(Vec::new());
    };
    if let Some(cached) = cache.get(path) {
        return Ok(cached.clone());
    }
    let paragraphs = match read_part(archive, path)? {
        Some(xml) => {
            let doc = parse_xml(&xml, path)?;
            doc.root_element()
                .children()
                .filter(|n| n.has_tag_name((W_NS, "p")))
                .map(paragraph_text)
                .collect()
        }
        None => Vec::new(),
    };
    cache.insert(path.clone(), paragraphs.clone());
    Ok(paragraphs)
}
