/*!
 * Tests for the application controller over files and folders
 */

use std::fs;

use docxlate::app_config::Config;
use docxlate::app_controller::{Controller, FolderSummary};
use docxlate::document::DocxDocument;
use docxlate::providers::mock::MockProvider;
use docxlate::translation::TranslationOutcome;

use crate::common::{self, DocxFixture};

fn mock_controller(provider: MockProvider) -> Controller<MockProvider> {
    let config = Config::default();
    let translator = common::mock_translator(provider, &config.font_name);
    Controller::with_translator(config, translator)
}

#[tokio::test]
async fn test_run_withDocx_shouldWriteSuffixedOutput() {
    let dir = common::create_temp_dir().unwrap();
    let input = DocxFixture::new().paragraph("Hello world.").write_to(dir.path(), "report.docx");
    let output_dir = dir.path().join("out");
    let controller = mock_controller(MockProvider::working());

    let outcome = controller.run(input, output_dir.clone(), false).await.unwrap();

    let expected = output_dir.join("report-CN.docx");
    match outcome {
        Some(TranslationOutcome::Success { destination, report }) => {
            assert_eq!(destination, expected);
            assert_eq!(report.paragraphs_rewritten, 1);
        }
        other => panic!("expected success, got {:?}", other),
    }
    let mut translated = DocxDocument::open(&expected).unwrap();
    assert_eq!(common::body_texts(&mut translated), vec!["[TRANSLATED] Hello world."]);
}

#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() {
    let dir = common::create_temp_dir().unwrap();
    let input = DocxFixture::new().paragraph("Hello.").write_to(dir.path(), "memo.docx");
    let provider = MockProvider::working();
    let controller = mock_controller(provider.clone());

    controller.run(input.clone(), dir.path().to_path_buf(), false).await.unwrap();
    let calls = provider.request_count();

    let skipped = controller.run(input.clone(), dir.path().to_path_buf(), false).await.unwrap();
    assert!(skipped.is_none());
    assert_eq!(provider.request_count(), calls);

    let forced = controller.run(input, dir.path().to_path_buf(), true).await.unwrap();
    assert!(forced.is_some_and(|outcome| outcome.is_success()));
    assert_eq!(provider.request_count(), calls * 2);
}

#[tokio::test]
async fn test_run_withMissingOrLegacyInput_shouldReturnError() {
    let dir = common::create_temp_dir().unwrap();
    let legacy = dir.path().join("old.doc");
    fs::write(&legacy, [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]).unwrap();
    let controller = mock_controller(MockProvider::working());

    assert!(controller.run(dir.path().join("missing.docx"), dir.path().to_path_buf(), false).await.is_err());
    assert!(controller.run(legacy, dir.path().to_path_buf(), false).await.is_err());
}

#[tokio::test]
async fn test_run_withCorruptPackage_shouldReturnFailureOutcome() {
    let dir = common::create_temp_dir().unwrap();
    let corrupt = dir.path().join("corrupt.docx");
    fs::write(&corrupt, b"PK\x03\x04 truncated").unwrap();
    let controller = mock_controller(MockProvider::working());

    let outcome = controller.run(corrupt, dir.path().to_path_buf(), false).await.unwrap();

    assert!(matches!(outcome, Some(TranslationOutcome::Failure { .. })));
    assert!(!dir.path().join("corrupt-CN.docx").exists());
}

#[tokio::test]
async fn test_runFolder_shouldCountProcessedSkippedAndFailed() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    DocxFixture::new().paragraph("A.").write_to(dir.path(), "a.docx");
    DocxFixture::new().paragraph("B.").write_to(&nested, "b.docx");
    fs::write(dir.path().join("c.docx"), b"PK\x03\x04 truncated").unwrap();
    let controller = mock_controller(MockProvider::working());

    let first = controller.run_folder(dir.path().to_path_buf(), false).await.unwrap();
    assert_eq!(first, FolderSummary { processed: 2, skipped: 0, failed: 1 });
    assert!(dir.path().join("a-CN.docx").exists());
    assert!(nested.join("b-CN.docx").exists());

    // Outputs from the first pass are not picked up as inputs
    let second = controller.run_folder(dir.path().to_path_buf(), false).await.unwrap();
    assert_eq!(second, FolderSummary { processed: 0, skipped: 2, failed: 1 });
}

#[tokio::test]
async fn test_runFolder_withNoDocuments_shouldReturnError() {
    let dir = common::create_temp_dir().unwrap();
    fs::write(dir.path().join("notes.txt"), b"x").unwrap();
    let controller = mock_controller(MockProvider::working());

    assert!(controller.run_folder(dir.path().to_path_buf(), false).await.is_err());
    assert!(controller.run_folder(dir.path().join("missing"), false).await.is_err());
}

#[tokio::test]
async fn test_translateFile_withMissingSource_shouldReturnFailure() {
    let dir = common::create_temp_dir().unwrap();
    let translator = common::mock_translator(MockProvider::working(), "Arial");
    let destination = dir.path().join("never.docx");

    let outcome = translator.translate_file(dir.path().join("missing.docx"), "fr", &destination).await;

    assert!(matches!(outcome, TranslationOutcome::Failure { reason } if !reason.is_empty()));
    assert!(!destination.exists());
}

#[test]
fn test_withConfig_withDefaultConfig_shouldBuildOpenAiController() {
    let controller = Controller::with_config(Config::default()).unwrap();

    assert_eq!(controller.config().target_language, "zh-CN");
    let path = controller.output_path_for(std::path::Path::new("/in/a.docx"), std::path::Path::new("/out"));
    assert_eq!(path, std::path::Path::new("/out/a-CN.docx"));
}

#[test]
fn test_run_fromSyncContext_shouldTranslateWithBlockOn() {
    let dir = common::create_temp_dir().unwrap();
    let input = DocxFixture::new().paragraph("Sync call.").write_to(dir.path(), "sync.docx");
    let controller = mock_controller(MockProvider::working());

    let outcome = tokio_test::block_on(async {
        controller.run(input, dir.path().to_path_buf(), false).await
    });

    assert!(outcome.unwrap().is_some_and(|o| o.is_success()));
    assert!(dir.path().join("sync-CN.docx").exists());
}

#[tokio::test]
async fn test_run_withDirectoryAsInput_shouldReturnError() {
    let dir = common::create_temp_dir().unwrap();
    let folder = dir.path().join("looks-like.docx");
    fs::create_dir(&folder).unwrap();
    let controller = mock_controller(MockProvider::working());

    let result = controller.run(folder, dir.path().to_path_buf(), false).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_withDirectoryAtOutputPath_shouldNotTreatItAsExistingOutput() {
    let dir = common::create_temp_dir().unwrap();
    let input = DocxFixture::new().paragraph("Hello.").write_to(dir.path(), "memo.docx");
    fs::create_dir(dir.path().join("memo-CN.docx")).unwrap();
    let provider = MockProvider::working();
    let controller = mock_controller(provider.clone());

    let outcome = controller.run(input, dir.path().to_path_buf(), false).await.unwrap();

    // Saving over a directory fails, but the run is attempted rather than skipped
    assert!(matches!(outcome, Some(TranslationOutcome::Failure { .. })));
    assert_eq!(provider.request_count(), 1);
}
