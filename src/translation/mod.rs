/*!
 * Translation pipeline for Word documents using AI providers.
 *
 * It is split into several submodules:
 *
 * - `segmenter`: Sentence splitting of paragraph text
 * - `prompts`: System prompt template and protection rules
 * - `core`: Sentence-by-sentence translation service
 * - `rewriter`: Paragraph rewriting into a single translated run
 * - `walker`: Whole-document traversal
 */

// Re-export main types for easier usage
pub use self::core::{SentenceOutcome, TokenUsageStats, TranslationOptions, TranslationService};
pub use self::rewriter::{ParagraphRewriter, RewriteOutcome};
pub use self::segmenter::split_into_sentences;
pub use self::walker::{DocumentTranslator, TranslationOutcome, WalkReport};

// Re-export prompt types
pub use self::prompts::{PromptRules, PromptTemplate};

// Submodules
pub mod core;
pub mod prompts;
pub mod rewriter;
pub mod segmenter;
pub mod walker;
