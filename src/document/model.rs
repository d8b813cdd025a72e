/*!
 * WordprocessingML views over the XML tree.
 *
 * Each view borrows the element it describes, so paragraphs, tables and
 * cells can be edited in place without copying the document.
 */

use crate::errors::DocumentError;
use super::xml::{XmlElement, XmlNode};

pub const PARAGRAPH: &str = "w:p";
pub const PARAGRAPH_PROPS: &str = "w:pPr";
pub const RUN: &str = "w:r";
pub const RUN_PROPS: &str = "w:rPr";
pub const RUN_FONTS: &str = "w:rFonts";
pub const HYPERLINK: &str = "w:hyperlink";
pub const TEXT: &str = "w:t";
pub const TAB: &str = "w:tab";
pub const PTAB: &str = "w:ptab";
pub const BREAK: &str = "w:br";
pub const CARRIAGE_RETURN: &str = "w:cr";
pub const NO_BREAK_HYPHEN: &str = "w:noBreakHyphen";
pub const TABLE: &str = "w:tbl";
pub const ROW: &str = "w:tr";
pub const CELL: &str = "w:tc";
pub const SECTION_PROPS: &str = "w:sectPr";

/// Font attributes written on a new run so every script uses the same face
const FONT_SLOTS: [&str; 4] = ["w:ascii", "w:hAnsi", "w:eastAsia", "w:cs"];

/// Whether a character may appear in XML 1.0 content
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn is_run_container(node: &XmlNode) -> bool {
    matches!(node, XmlNode::Element(e) if e.is(RUN) || e.is(HYPERLINK))
}

/// Read-only view of a run
#[derive(Debug, Clone, Copy)]
pub struct Run<'a> {
    element: &'a XmlElement,
}

impl<'a> Run<'a> {
    pub fn new(element: &'a XmlElement) -> Self {
        Self { element }
    }

    /// Text of the run with tabs and breaks mapped to `\t` and `\n`
    pub fn text(&self) -> String {
        let mut text = String::new();
        for child in self.element.child_elements() {
            match child.name.as_str() {
                TEXT => text.push_str(&child.text_content()),
                TAB | PTAB => text.push('\t'),
                BREAK | CARRIAGE_RETURN => text.push('\n'),
                NO_BREAK_HYPHEN => text.push('-'),
                _ => {}
            }
        }
        text
    }

    /// The ASCII font of the run, if one is set directly on it
    pub fn font_name(&self) -> Option<&'a str> {
        self.element
            .find_child(RUN_PROPS)
            .and_then(|props| props.find_child(RUN_FONTS))
            .and_then(|fonts| fonts.attribute("w:ascii"))
    }
}

/// Mutable view of a paragraph
#[derive(Debug)]
pub struct Paragraph<'a> {
    element: &'a mut XmlElement,
}

impl<'a> Paragraph<'a> {
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    /// Runs in order, including runs nested in hyperlinks
    pub fn runs(&self) -> Vec<Run<'_>> {
        let mut runs = Vec::new();
        for child in self.element.child_elements() {
            if child.is(RUN) {
                runs.push(Run::new(child));
            } else if child.is(HYPERLINK) {
                runs.extend(child.child_elements().filter(|e| e.is(RUN)).map(Run::new));
            }
        }
        runs
    }

    pub fn run_count(&self) -> usize {
        self.runs().len()
    }

    /// Concatenated text of every run
    pub fn text(&self) -> String {
        self.runs().iter().map(Run::text).collect()
    }

    /// Remove every run and hyperlink, keeping paragraph properties and markers
    pub fn clear_runs(&mut self) -> usize {
        self.element.remove_children(is_run_container)
    }

    /// Append a run holding `text`
    ///
    /// Tabs become `w:tab` and line breaks become `w:br`, so `text()` reads the
    /// same string back. With `font_name` set, all four font slots are filled.
    pub fn add_run(&mut self, text: &str, font_name: Option<&str>) -> Result<Run<'_>, DocumentError> {
        if let Some(bad) = text.chars().find(|c| !is_xml_char(*c)) {
            return Err(DocumentError::InvalidText(bad as u32));
        }

        let mut run = XmlElement::new(RUN);
        if let Some(font) = font_name.filter(|f| !f.trim().is_empty()) {
            let fonts = FONT_SLOTS
                .iter()
                .fold(XmlElement::new(RUN_FONTS), |fonts, slot| fonts.with_attribute(*slot, font));
            run.children.push(XmlNode::Element(XmlElement::new(RUN_PROPS).with_child(fonts)));
        }

        let mut pending = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\t' => {
                    flush_text(&mut run, &mut pending);
                    run.children.push(XmlNode::Element(XmlElement::new(TAB)));
                }
                '\r' | '\n' => {
                    if c == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    flush_text(&mut run, &mut pending);
                    run.children.push(XmlNode::Element(XmlElement::new(BREAK)));
                }
                _ => pending.push(c),
            }
        }
        flush_text(&mut run, &mut pending);

        self.element.children.push(XmlNode::Element(run));
        match self.element.children.last() {
            Some(XmlNode::Element(run)) => Ok(Run::new(run)),
            _ => unreachable!("run was just appended"),
        }
    }

    /// Drop every existing run and write `text` as a single new run
    ///
    /// Runs are removed before the new one is validated, so a rejected text
    /// leaves the paragraph without runs.
    pub fn replace_runs(&mut self, text: &str, font_name: Option<&str>) -> Result<(), DocumentError> {
        self.clear_runs();
        self.add_run(text, font_name)?;
        Ok(())
    }
}

fn flush_text(run: &mut XmlElement, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let t = XmlElement::new(TEXT)
        .with_attribute("xml:space", "preserve")
        .with_text(std::mem::take(pending));
    run.children.push(XmlNode::Element(t));
}

/// Direct paragraph children of a container element
pub fn paragraphs_in(container: &mut XmlElement) -> impl Iterator<Item = Paragraph<'_>> + '_ {
    container
        .child_elements_mut()
        .filter(|e| e.is(PARAGRAPH))
        .map(Paragraph::new)
}

/// Mutable view of a table
#[derive(Debug)]
pub struct Table<'a> {
    element: &'a mut XmlElement,
}

impl<'a> Table<'a> {
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.element
            .child_elements_mut()
            .filter(|e| e.is(ROW))
            .map(Row::new)
    }

    /// Number of cells in each row
    pub fn cell_counts(&self) -> Vec<usize> {
        self.element
            .child_elements()
            .filter(|e| e.is(ROW))
            .map(|row| row.child_elements().filter(|e| e.is(CELL)).count())
            .collect()
    }
}

/// Mutable view of a table row
#[derive(Debug)]
pub struct Row<'a> {
    element: &'a mut XmlElement,
}

impl<'a> Row<'a> {
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = Cell<'_>> + '_ {
        self.element
            .child_elements_mut()
            .filter(|e| e.is(CELL))
            .map(Cell::new)
    }
}

/// Mutable view of a table cell
#[derive(Debug)]
pub struct Cell<'a> {
    element: &'a mut XmlElement,
}

impl<'a> Cell<'a> {
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = Paragraph<'_>> + '_ {
        paragraphs_in(self.element)
    }
}
