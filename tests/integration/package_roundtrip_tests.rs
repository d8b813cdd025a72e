/*!
 * Tests for loading and saving `.docx` packages on disk
 */

use std::fs::File;
use std::io::{Cursor, Read};

use zip::ZipArchive;

use docxlate::document::DocxDocument;
use docxlate::errors::DocumentError;
use docxlate::providers::mock::MockProvider;

use crate::common::{self, DocxFixture, PartRef};

fn archive_entry(path: &std::path::Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

fn archive_names(path: &std::path::Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect::<Vec<_>>()
}

#[test]
fn test_saveAndOpen_withoutChanges_shouldPreserveContent() {
    let dir = common::create_temp_dir().unwrap();
    let fixture = DocxFixture::new()
        .paragraph_runs(&["Hello ", "& welcome <back>."])
        .table(&[&["x", "y"]])
        .title("Doc title");
    let path = fixture.write_to(dir.path(), "plain.docx");

    let mut reopened = DocxDocument::open(&path).unwrap();

    assert_eq!(common::body_texts(&mut reopened), vec!["Hello & welcome <back>."]);
    assert_eq!(common::table_texts(&mut reopened), vec!["x", "y"]);
    assert_eq!(reopened.title().as_deref(), Some("Doc title"));
    assert_eq!(reopened.shape(), fixture.build().shape());
}

#[test]
fn test_save_shouldKeepEntryOrderAndUntouchedBytes() {
    let dir = common::create_temp_dir().unwrap();
    let fixture = DocxFixture::new()
        .paragraph("Text.")
        .final_section(&[PartRef::header("default", "rIdH1")])
        .header("rIdH1", "header1.xml", "Header.");
    let path = fixture.write_to(dir.path(), "ordered.docx");

    let expected: Vec<String> = fixture.entries().into_iter().map(|e| e.name).collect();
    let mut names = archive_names(&path);
    names.sort_by_key(|name| expected.iter().position(|e| e == name));
    assert_eq!(names.len(), expected.len());
    assert_eq!(names, expected);

    let styles = fixture
        .entries()
        .into_iter()
        .find(|e| e.name == "word/styles.xml")
        .unwrap();
    assert_eq!(archive_entry(&path, "word/styles.xml"), styles.data);
    assert_eq!(
        archive_entry(&path, "word/_rels/document.xml.rels"),
        fixture.entries()[3].data
    );
}

#[tokio::test]
async fn test_translateAndSave_shouldPersistTranslatedParts() {
    let dir = common::create_temp_dir().unwrap();
    let source = DocxFixture::new()
        .paragraph("Body.")
        .final_section(&[PartRef::footer("default", "rIdF1")])
        .footer("rIdF1", "footer1.xml", "Footer.")
        .subject("Topic")
        .write_to(dir.path(), "source.docx");
    let destination = dir.path().join("source-CN.docx");
    let translator = common::mock_translator(MockProvider::working(), "SimSun");

    let outcome = translator.translate_file(&source, "zh-CN", &destination).await;

    assert!(outcome.is_success());
    let mut translated = DocxDocument::open(&destination).unwrap();
    assert_eq!(common::body_texts(&mut translated), vec!["[TRANSLATED] Body."]);
    assert_eq!(translated.subject().as_deref(), Some("[TRANSLATED] Topic"));
    let footer = translated.sections()[0].footers[0];
    let texts: Vec<String> = translated.header_footer_paragraphs_mut(footer).map(|p| p.text()).collect();
    assert_eq!(texts, vec!["[TRANSLATED] Footer."]);

    let core = String::from_utf8(archive_entry(&destination, "docProps/core.xml")).unwrap();
    assert!(core.contains("<dc:creator>tester</dc:creator>"));

    // The source is never modified
    let mut original = DocxDocument::open(&source).unwrap();
    assert_eq!(common::body_texts(&mut original), vec!["Body."]);
}

#[test]
fn test_open_withMissingFile_shouldReturnIoError() {
    let dir = common::create_temp_dir().unwrap();

    let result = DocxDocument::open(dir.path().join("missing.docx"));

    assert!(matches!(result, Err(DocumentError::Io(_))));
}

#[test]
fn test_open_withNonZipFile_shouldReturnArchiveError() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("broken.docx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let result = DocxDocument::open(&path);

    assert!(matches!(result, Err(DocumentError::Archive(_))));
}

#[test]
fn test_fromEntries_withMalformedMainPart_shouldReturnXmlError() {
    let mut entries = DocxFixture::new().paragraph("x").entries();
    for entry in entries.iter_mut().filter(|e| e.name == "word/document.xml") {
        entry.data = b"<w:document><w:body>".to_vec();
    }

    let result = DocxDocument::from_entries(entries);

    assert!(matches!(result, Err(DocumentError::Xml { part, .. }) if part == "word/document.xml"));
}

#[test]
fn test_fromEntries_withDanglingHeaderTarget_shouldReturnMissingPart() {
    let mut entries = DocxFixture::new()
        .paragraph("x")
        .final_section(&[PartRef::header("default", "rIdH1")])
        .header("rIdH1", "header1.xml", "Header.")
        .entries();
    entries.retain(|e| e.name != "word/header1.xml");

    let result = DocxDocument::from_entries(entries);

    assert!(matches!(result, Err(DocumentError::MissingPart(name)) if name == "word/header1.xml"));
}

#[test]
fn test_setTitle_withoutCoreProperties_shouldReturnMissingPart() {
    let mut entries = DocxFixture::new().paragraph("x").entries();
    entries.retain(|e| e.name != "docProps/core.xml");

    let mut document = DocxDocument::from_entries(entries).unwrap();

    assert_eq!(document.title(), None);
    assert!(matches!(document.set_title("t"), Err(DocumentError::MissingPart(_))));
}

#[test]
fn test_writeTo_withInMemoryBuffer_shouldProduceReadableArchive() {
    let document = DocxFixture::new().paragraph("In memory.").build();
    let mut buffer = Cursor::new(Vec::new());

    document.write_to(&mut buffer).unwrap();

    let archive = ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
    assert!(archive.file_names().any(|name| name == "word/document.xml"));
}
