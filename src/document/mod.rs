/*!
 * Word document (`.docx`) model.
 *
 * This module contains:
 * - `xml`: Owned XML tree used for every edited package part
 * - `model`: Paragraph, run and table views over that tree
 * - `package`: Zip package loading, section resolution and saving
 */

pub mod model;
pub mod package;
pub mod xml;

// Re-export main types
pub use model::{Cell, Paragraph, Row, Run, Table};
pub use package::{DocumentShape, DocxDocument, HeaderFooterKind, PackageEntry, Section};
