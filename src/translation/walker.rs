/*!
 * Document traversal.
 *
 * Visits every translatable location of a document in a fixed order:
 * 1. Top-level body paragraphs
 * 2. Table cells, row by row, paragraph by paragraph
 * 3. Header then footer parts of each section
 * 4. Title and subject core properties
 *
 * Failures are logged and counted; they never stop the walk.
 */

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::ProgressBar;
use log::{error, info, warn};

use crate::document::{DocxDocument, HeaderFooterKind, Paragraph};
use crate::errors::DocumentError;
use crate::providers::openai::{OpenAIRequest, OpenAIResponse};
use crate::providers::Provider;
use super::core::TranslationService;
use super::rewriter::{ParagraphRewriter, RewriteOutcome};

/// Counts collected while walking a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Paragraphs handed to the rewriter
    pub paragraphs_visited: usize,
    /// Paragraphs whose runs were replaced
    pub paragraphs_rewritten: usize,
    /// Blank paragraphs left as they were
    pub paragraphs_skipped: usize,
    /// Paragraphs that hit an error
    pub paragraphs_failed: usize,
    /// Distinct header and footer parts translated
    pub header_footer_parts: usize,
    /// Core properties translated (title, subject)
    pub metadata_translated: usize,
}

/// Result of translating a file
#[derive(Debug)]
pub enum TranslationOutcome {
    /// The translated document was written
    Success {
        destination: PathBuf,
        report: WalkReport,
    },
    /// The document could not be read or written
    Failure {
        reason: String,
    },
}

impl TranslationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Translates whole documents
#[derive(Debug)]
pub struct DocumentTranslator<P> {
    service: TranslationService<P>,
    font_name: String,
    progress: ProgressBar,
}

impl<P> DocumentTranslator<P>
where
    P: Provider<Request = OpenAIRequest, Response = OpenAIResponse>,
{
    /// Create a translator writing new runs in `font_name`
    pub fn new(service: TranslationService<P>, font_name: impl Into<String>) -> Self {
        Self {
            service,
            font_name: font_name.into(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report paragraph progress on `progress`
    pub fn with_progress_bar(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn service(&self) -> &TranslationService<P> {
        &self.service
    }

    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    /// Translate a document file and write the result to `destination`
    ///
    /// Errors are logged and returned as [`TranslationOutcome::Failure`].
    pub async fn translate_file<S, D>(&self, source: S, target_language: &str, destination: D) -> TranslationOutcome
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        let source = source.as_ref();
        let destination = destination.as_ref();
        let start_time = Instant::now();

        match self.try_translate_file(source, target_language, destination).await {
            Ok(report) => {
                info!(
                    "Translated {:?} -> {:?} in {:.1}s ({} paragraphs, {} failed)",
                    source,
                    destination,
                    start_time.elapsed().as_secs_f64(),
                    report.paragraphs_rewritten,
                    report.paragraphs_failed
                );
                TranslationOutcome::Success {
                    destination: destination.to_path_buf(),
                    report,
                }
            }
            Err(e) => {
                error!("Error processing document {:?}: {}", source, e);
                TranslationOutcome::Failure { reason: e.to_string() }
            }
        }
    }

    async fn try_translate_file(
        &self,
        source: &Path,
        target_language: &str,
        destination: &Path,
    ) -> Result<WalkReport, DocumentError> {
        let mut document = DocxDocument::open(source)?;
        let report = self.translate_document(&mut document, target_language).await;
        document.save(destination)?;
        Ok(report)
    }

    /// Translate a document in memory
    pub async fn translate_document(&self, document: &mut DocxDocument, target_language: &str) -> WalkReport {
        let rewriter = ParagraphRewriter::new(&self.service, &self.font_name);
        let mut report = WalkReport::default();

        self.progress.set_length(count_paragraphs(document) as u64);
        self.progress.set_position(0);

        self.progress.set_message("Body");
        for (index, mut paragraph) in document.body_paragraphs_mut().enumerate() {
            let location = format!("body paragraph {}", index + 1);
            self.rewrite(&rewriter, &mut paragraph, target_language, &location, &mut report).await;
        }

        self.progress.set_message("Tables");
        for (t, mut table) in document.tables_mut().enumerate() {
            for (r, mut row) in table.rows_mut().enumerate() {
                for (c, mut cell) in row.cells_mut().enumerate() {
                    for (p, mut paragraph) in cell.paragraphs_mut().enumerate() {
                        let location = format!("table {} row {} cell {} paragraph {}", t + 1, r + 1, c + 1, p + 1);
                        self.rewrite(&rewriter, &mut paragraph, target_language, &location, &mut report).await;
                    }
                }
            }
        }

        self.progress.set_message("Headers and footers");
        let mut translated_parts = HashSet::new();
        let sections = document.sections().to_vec();
        for (s, section) in sections.iter().enumerate() {
            for &part in section.headers.iter().chain(section.footers.iter()) {
                if !translated_parts.insert(part) {
                    continue;
                }
                let Some((name, kind)) = document.part_info(part) else {
                    continue;
                };
                let label = match kind {
                    HeaderFooterKind::Header => "header",
                    HeaderFooterKind::Footer => "footer",
                };
                let prefix = format!("section {} {} ({})", s + 1, label, name);

                for (p, mut paragraph) in document.header_footer_paragraphs_mut(part).enumerate() {
                    let location = format!("{} paragraph {}", prefix, p + 1);
                    self.rewrite(&rewriter, &mut paragraph, target_language, &location, &mut report).await;
                }
                report.header_footer_parts += 1;
            }
        }

        self.progress.set_message("Metadata");
        if let Some(title) = document.title().filter(|t| !t.trim().is_empty()) {
            let translated = self.service.translate(&title, target_language).await;
            match document.set_title(&translated) {
                Ok(()) => report.metadata_translated += 1,
                Err(e) => error!("Error translating title: {}", e),
            }
        }
        if let Some(subject) = document.subject().filter(|s| !s.trim().is_empty()) {
            let translated = self.service.translate(&subject, target_language).await;
            match document.set_subject(&translated) {
                Ok(()) => report.metadata_translated += 1,
                Err(e) => error!("Error translating subject: {}", e),
            }
        }

        self.progress.finish_with_message("Done");
        if report.paragraphs_failed > 0 {
            warn!("{} of {} paragraphs failed", report.paragraphs_failed, report.paragraphs_visited);
        }
        report
    }

    async fn rewrite(
        &self,
        rewriter: &ParagraphRewriter<'_, P>,
        paragraph: &mut Paragraph<'_>,
        target_language: &str,
        location: &str,
        report: &mut WalkReport,
    ) {
        report.paragraphs_visited += 1;
        match rewriter.rewrite(paragraph, target_language).await {
            Ok(RewriteOutcome::Rewritten { .. }) => report.paragraphs_rewritten += 1,
            Ok(RewriteOutcome::Skipped) => report.paragraphs_skipped += 1,
            Err(e) => {
                error!("Error translating paragraph ({}): {}", location, e);
                report.paragraphs_failed += 1;
            }
        }
        self.progress.inc(1);
    }
}

/// Paragraphs the walk will visit, shared header/footer parts counted once
fn count_paragraphs(document: &mut DocxDocument) -> usize {
    let mut total = document.body_paragraphs_mut().count();
    for mut table in document.tables_mut() {
        for mut row in table.rows_mut() {
            for mut cell in row.cells_mut() {
                total += cell.paragraphs_mut().count();
            }
        }
    }

    let parts: HashSet<usize> = document
        .sections()
        .iter()
        .flat_map(|s| s.headers.iter().chain(s.footers.iter()).copied())
        .collect();
    for part in parts {
        total += document.header_footer_paragraphs_mut(part).count();
    }
    total
}
