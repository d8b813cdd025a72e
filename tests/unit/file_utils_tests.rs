/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;

use docxlate::file_utils::{FileManager, FileType};

use crate::common::{self, DocxFixture};

#[test]
fn test_generateOutputPath_withSuffix_shouldAppendSuffixToStem() {
    let path = FileManager::generate_output_path("/docs/report.final.docx", "/out", "CN");
    assert_eq!(path, Path::new("/out/report.final-CN.docx"));
}

#[test]
fn test_ensureDir_withNestedPath_shouldCreateAllParents() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested).unwrap();
    FileManager::ensure_dir(&nested).unwrap();

    assert!(FileManager::dir_exists(&nested));
}

#[test]
fn test_findFiles_withLockFilesAndOtherExtensions_shouldReturnDocxOnly() {
    let dir = common::create_temp_dir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("a.docx"), b"x").unwrap();
    fs::write(sub.join("b.DOCX"), b"x").unwrap();
    fs::write(dir.path().join("~$a.docx"), b"x").unwrap();
    fs::write(dir.path().join("notes.txt"), b"x").unwrap();

    let found = FileManager::find_files(dir.path(), ".docx").unwrap();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| !p.file_name().unwrap().to_string_lossy().starts_with("~$")));
}

#[test]
fn test_detectFileType_withRealPackage_shouldReturnDocx() {
    let dir = common::create_temp_dir().unwrap();
    let path = DocxFixture::new().paragraph("Hello.").write_to(dir.path(), "in.docx");

    assert_eq!(FileManager::detect_file_type(&path).unwrap(), FileType::Docx);
}

#[test]
fn test_detectFileType_withMismatchedContent_shouldReturnUnknown() {
    let dir = common::create_temp_dir().unwrap();
    let fake = dir.path().join("fake.docx");
    fs::write(&fake, b"plain text").unwrap();
    let legacy = dir.path().join("old.doc");
    fs::write(&legacy, [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1]).unwrap();

    assert_eq!(FileManager::detect_file_type(&fake).unwrap(), FileType::Unknown);
    assert_eq!(FileManager::detect_file_type(&legacy).unwrap(), FileType::LegacyWord);
    assert!(FileManager::detect_file_type(dir.path().join("missing.docx")).is_err());
}

#[test]
fn test_fileAndDirExists_shouldDistinguishKinds() {
    let dir = common::create_temp_dir().unwrap();
    let file = dir.path().join("a.docx");
    fs::write(&file, b"x").unwrap();

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(dir.path()));
    assert!(FileManager::dir_exists(dir.path()));
    assert!(!FileManager::dir_exists(&file));
    assert!(!FileManager::file_exists(dir.path().join("missing.docx")));
}
