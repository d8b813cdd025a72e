/*!
 * DOCX package loading and saving.
 *
 * A package is read fully into memory. The main document part, the header and
 * footer parts referenced from section properties, and the core properties
 * part are parsed into XML trees; every other entry is written back
 * byte-for-byte on save.
 */

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use log::{debug, warn};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::DocumentError;
use super::model::{self, Paragraph, Table, PARAGRAPH, PARAGRAPH_PROPS, SECTION_PROPS, TABLE};
use super::xml::{XmlDocument, XmlElement, XmlNode};

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const DEFAULT_CORE_PART: &str = "docProps/core.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const CORE_PROPERTIES_REL: &str = "/core-properties";
const TITLE: &str = "dc:title";
const SUBJECT: &str = "dc:subject";

/// A raw zip entry
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Entry name inside the archive
    pub name: String,
    /// Uncompressed bytes
    pub data: Vec<u8>,
}

impl PackageEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Whether a header/footer part is a header or a footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFooterKind {
    Header,
    Footer,
}

/// Variant of a header or footer within a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderFooterType {
    Default,
    First,
    Even,
}

impl HeaderFooterType {
    const ALL: [HeaderFooterType; 3] = [Self::Default, Self::First, Self::Even];

    fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("first") => Self::First,
            Some("even") => Self::Even,
            _ => Self::Default,
        }
    }
}

/// A parsed header or footer part
#[derive(Debug, Clone)]
struct HeaderFooterPart {
    name: String,
    xml: XmlDocument,
}

/// Header and footer parts in effect for one section, as part indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Header parts in `default`, `first`, `even` order
    pub headers: Vec<usize>,
    /// Footer parts in `default`, `first`, `even` order
    pub footers: Vec<usize>,
}

/// Structural counts of a document, unchanged by translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentShape {
    /// Top-level body paragraphs
    pub paragraphs: usize,
    /// Cells per row, per top-level table
    pub tables: Vec<Vec<usize>>,
    /// Sections
    pub sections: usize,
}

/// An opened `.docx` package
#[derive(Debug, Clone)]
pub struct DocxDocument {
    entries: Vec<PackageEntry>,
    main_part: String,
    document: XmlDocument,
    parts: Vec<HeaderFooterPart>,
    sections: Vec<Section>,
    core_part: Option<(String, XmlDocument)>,
}

impl DocxDocument {
    /// Open a package from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        debug!("Opening document {:?}", path);
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();
            let mut data = Vec::new();
            if !entry.is_dir() {
                entry.read_to_end(&mut data)?;
            }
            entries.push(PackageEntry { name, data });
        }

        Self::from_entries(entries)
    }

    /// Build a document from raw package entries
    pub fn from_entries(entries: Vec<PackageEntry>) -> Result<Self, DocumentError> {
        let package_rels = match find_entry(&entries, PACKAGE_RELS) {
            Some(entry) => relationships(&parse_entry(entry)?, ""),
            None => Vec::new(),
        };

        let main_part = package_rels
            .iter()
            .find(|rel| rel.rel_type.ends_with(OFFICE_DOCUMENT_REL))
            .map(|rel| rel.target.clone())
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());
        let document = parse_entry(
            find_entry(&entries, &main_part).ok_or_else(|| DocumentError::MissingPart(main_part.clone()))?,
        )?;

        let core_name = package_rels
            .iter()
            .find(|rel| rel.rel_type.ends_with(CORE_PROPERTIES_REL))
            .map(|rel| rel.target.clone())
            .unwrap_or_else(|| DEFAULT_CORE_PART.to_string());
        let core_part = match find_entry(&entries, &core_name) {
            Some(entry) => Some((core_name, parse_entry(entry)?)),
            None => None,
        };

        let (parts, sections) = load_sections(&entries, &main_part, &document)?;

        Ok(Self {
            entries,
            main_part,
            document,
            parts,
            sections,
            core_part,
        })
    }

    fn body(&self) -> Option<&XmlElement> {
        self.document.root.find_child("w:body")
    }

    fn body_mut(&mut self) -> Option<&mut XmlElement> {
        self.document.root.find_child_mut("w:body")
    }

    /// Top-level body paragraphs in document order
    pub fn body_paragraphs_mut(&mut self) -> impl Iterator<Item = Paragraph<'_>> + '_ {
        self.body_mut().into_iter().flat_map(model::paragraphs_in)
    }

    /// Top-level tables in document order
    pub fn tables_mut(&mut self) -> impl Iterator<Item = Table<'_>> + '_ {
        self.body_mut()
            .into_iter()
            .flat_map(|body| body.child_elements_mut().filter(|e| e.is(TABLE)).map(Table::new))
    }

    /// Sections in document order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Name and kind of a header/footer part
    pub fn part_info(&self, index: usize) -> Option<(&str, HeaderFooterKind)> {
        self.parts.get(index).map(|part| {
            let kind = if part.xml.root.is("w:ftr") {
                HeaderFooterKind::Footer
            } else {
                HeaderFooterKind::Header
            };
            (part.name.as_str(), kind)
        })
    }

    /// Paragraphs of a header/footer part
    pub fn header_footer_paragraphs_mut(&mut self, index: usize) -> impl Iterator<Item = Paragraph<'_>> + '_ {
        self.parts
            .get_mut(index)
            .into_iter()
            .flat_map(|part| model::paragraphs_in(&mut part.xml.root))
    }

    fn core_field(&self, name: &str) -> Option<String> {
        self.core_part
            .as_ref()
            .and_then(|(_, xml)| xml.root.find_child(name))
            .map(XmlElement::text_content)
    }

    fn set_core_field(&mut self, name: &str, value: &str) -> Result<(), DocumentError> {
        let (_, xml) = self
            .core_part
            .as_mut()
            .ok_or_else(|| DocumentError::MissingPart(DEFAULT_CORE_PART.to_string()))?;
        match xml.root.find_child_mut(name) {
            Some(field) => field.set_text(value),
            None => xml.root.children.push(XmlNode::Element(XmlElement::new(name).with_text(value))),
        }
        Ok(())
    }

    /// Core property `dc:title`
    pub fn title(&self) -> Option<String> {
        self.core_field(TITLE)
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), DocumentError> {
        self.set_core_field(TITLE, title)
    }

    /// Core property `dc:subject`
    pub fn subject(&self) -> Option<String> {
        self.core_field(SUBJECT)
    }

    pub fn set_subject(&mut self, subject: &str) -> Result<(), DocumentError> {
        self.set_core_field(SUBJECT, subject)
    }

    /// Snapshot of the structural counts
    pub fn shape(&self) -> DocumentShape {
        let (paragraphs, tables) = match self.body() {
            Some(body) => (
                body.child_elements().filter(|e| e.is(PARAGRAPH)).count(),
                body.child_elements()
                    .filter(|e| e.is(TABLE))
                    .map(|table| {
                        table
                            .child_elements()
                            .filter(|e| e.is(model::ROW))
                            .map(|row| row.child_elements().filter(|e| e.is(model::CELL)).count())
                            .collect()
                    })
                    .collect(),
            ),
            None => (0, Vec::new()),
        };
        DocumentShape {
            paragraphs,
            tables,
            sections: self.sections.len(),
        }
    }

    /// Write the package to `path`
    ///
    /// The archive is written to a temporary file next to `path` and moved into
    /// place only once complete.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir)?;
        self.write_to(temp.as_file_mut())?;
        temp.persist(path).map_err(|e| DocumentError::Io(e.error))?;
        debug!("Saved document {:?}", path);
        Ok(())
    }

    /// Write the package as a zip archive
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<(), DocumentError> {
        let mut replaced: HashMap<&str, Vec<u8>> = HashMap::new();
        replaced.insert(self.main_part.as_str(), self.document.to_bytes(&self.main_part)?);
        for part in &self.parts {
            replaced.insert(part.name.as_str(), part.xml.to_bytes(&part.name)?);
        }
        if let Some((name, xml)) = &self.core_part {
            replaced.insert(name.as_str(), xml.to_bytes(name)?);
        }

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);
        for entry in &self.entries {
            if entry.is_dir() {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            zip.start_file(entry.name.as_str(), options)?;
            let data = replaced.get(entry.name.as_str()).unwrap_or(&entry.data);
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }
}

/// A package relationship with its target resolved to an entry name
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn find_entry<'a>(entries: &'a [PackageEntry], name: &str) -> Option<&'a PackageEntry> {
    entries.iter().find(|e| e.name == name)
}

fn parse_entry(entry: &PackageEntry) -> Result<XmlDocument, DocumentError> {
    let text = String::from_utf8_lossy(&entry.data);
    XmlDocument::parse(text.trim_start_matches('\u{feff}'), &entry.name)
}

/// Relationship part name for a source part, e.g. `word/_rels/document.xml.rels`
fn rels_name_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part
fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') || base_dir.is_empty() {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in target.trim_start_matches('/').split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn relationships(rels: &XmlDocument, base_dir: &str) -> Vec<Relationship> {
    rels.root
        .child_elements()
        .filter(|e| e.name.ends_with("Relationship"))
        .filter(|e| e.attribute("TargetMode") != Some("External"))
        .filter_map(|e| {
            Some(Relationship {
                id: e.attribute("Id")?.to_string(),
                rel_type: e.attribute("Type")?.to_string(),
                target: resolve_target(base_dir, e.attribute("Target")?),
            })
        })
        .collect()
}

/// Section properties in document order: those carried by paragraphs, then the body's own
fn section_properties(body: &XmlElement) -> Vec<&XmlElement> {
    let mut found: Vec<&XmlElement> = body
        .child_elements()
        .filter(|e| e.is(PARAGRAPH))
        .filter_map(|p| p.find_child(PARAGRAPH_PROPS))
        .filter_map(|props| props.find_child(SECTION_PROPS))
        .collect();
    if let Some(last) = body.find_child(SECTION_PROPS) {
        found.push(last);
    }
    found
}

/// Load the header/footer parts used by each section
///
/// A section without a reference of some type inherits the part the previous
/// section used for it.
fn load_sections(
    entries: &[PackageEntry],
    main_part: &str,
    document: &XmlDocument,
) -> Result<(Vec<HeaderFooterPart>, Vec<Section>), DocumentError> {
    let Some(body) = document.root.find_child("w:body") else {
        return Ok((Vec::new(), Vec::new()));
    };

    let base_dir = main_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let rels = match find_entry(entries, &rels_name_for(main_part)) {
        Some(entry) => relationships(&parse_entry(entry)?, base_dir),
        None => Vec::new(),
    };

    let mut parts: Vec<HeaderFooterPart> = Vec::new();
    let mut part_index: HashMap<String, usize> = HashMap::new();
    let mut inherited: HashMap<(&str, HeaderFooterType), usize> = HashMap::new();
    let mut sections = Vec::new();

    for props in section_properties(body) {
        let mut section = Section::default();
        for (reference, slot) in [("w:headerReference", "header"), ("w:footerReference", "footer")] {
            for reference_element in props.child_elements().filter(|e| e.is(reference)) {
                let ref_type = HeaderFooterType::from_attribute(reference_element.attribute("w:type"));
                let Some(rel) = reference_element
                    .attribute("r:id")
                    .and_then(|id| rels.iter().find(|rel| rel.id == id))
                else {
                    warn!("Section {} has a {} reference with no matching relationship", sections.len() + 1, slot);
                    continue;
                };

                let index = match part_index.get(&rel.target) {
                    Some(index) => *index,
                    None => {
                        let entry = find_entry(entries, &rel.target)
                            .ok_or_else(|| DocumentError::MissingPart(rel.target.clone()))?;
                        parts.push(HeaderFooterPart {
                            name: rel.target.clone(),
                            xml: parse_entry(entry)?,
                        });
                        part_index.insert(rel.target.clone(), parts.len() - 1);
                        parts.len() - 1
                    }
                };
                inherited.insert((slot, ref_type), index);
            }

            let resolved: Vec<usize> = HeaderFooterType::ALL
                .iter()
                .filter_map(|ref_type| inherited.get(&(slot, *ref_type)).copied())
                .collect();
            if slot == "header" {
                section.headers = resolved;
            } else {
                section.footers = resolved;
            }
        }
        sections.push(section);
    }

    Ok((parts, sections))
}
