/*!
 * Paragraph rewriting.
 *
 * A paragraph is read as one string, translated, and written back as a
 * single run in the normalized font. Run level formatting does not survive.
 */

use log::info;

use crate::document::Paragraph;
use crate::errors::TranslationError;
use crate::providers::openai::{OpenAIRequest, OpenAIResponse};
use crate::providers::Provider;
use super::core::{preview, TranslationService, LOG_PREVIEW_CHARS};

/// What happened to a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteOutcome {
    /// Blank paragraph, left untouched
    Skipped,
    /// Runs were replaced with the translation
    Rewritten {
        original: String,
        translated: String,
    },
}

/// Rewrites paragraphs through a translation service
#[derive(Debug)]
pub struct ParagraphRewriter<'a, P> {
    service: &'a TranslationService<P>,
    font_name: &'a str,
}

impl<'a, P> ParagraphRewriter<'a, P>
where
    P: Provider<Request = OpenAIRequest, Response = OpenAIResponse>,
{
    /// An empty `font_name` leaves the new run without a font
    pub fn new(service: &'a TranslationService<P>, font_name: &'a str) -> Self {
        Self { service, font_name }
    }

    fn font(&self) -> Option<&str> {
        Some(self.font_name).filter(|f| !f.trim().is_empty())
    }

    /// Translate a paragraph in place
    ///
    /// On error the paragraph may already have lost its runs.
    pub async fn rewrite(
        &self,
        paragraph: &mut Paragraph<'_>,
        target_language: &str,
    ) -> Result<RewriteOutcome, TranslationError> {
        let original = paragraph.text();
        if original.trim().is_empty() {
            return Ok(RewriteOutcome::Skipped);
        }

        info!("Original Text: {}", preview(&original, LOG_PREVIEW_CHARS));
        let translated = normalize_line_breaks(&self.service.translate(&original, target_language).await);

        paragraph.replace_runs(&translated, self.font())?;
        info!("Translated Text: {}", preview(&translated, LOG_PREVIEW_CHARS));

        Ok(RewriteOutcome::Rewritten { original, translated })
    }
}

/// `\r\n` and lone `\r` become `\n`, the only break a run reads back
fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
