/*!
 * # docxlate - Word document translation with AI
 *
 * A Rust library for translating `.docx` documents with OpenAI-compatible
 * chat completion APIs.
 *
 * ## Features
 *
 * - Translate body paragraphs, table cells, headers, footers and the
 *   title/subject core properties
 * - Sentence-level requests with a fixed instruction set that protects
 *   IT terms, brand-prefixed words and quoted literals
 * - Per-sentence fallback: a failed request keeps the original sentence
 * - Translated paragraphs are rewritten as one run in a normalized font
 * - Providers: SiliconFlow, OpenAI, LM Studio
 * - ISO 639 language codes with optional region (`zh-CN`)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: DOCX package model:
 *   - `document::xml`: Owned XML tree
 *   - `document::model`: Paragraph, run and table views
 *   - `document::package`: Zip package loading and saving
 * - `translation`: The translation pipeline:
 *   - `translation::segmenter`: Sentence splitting
 *   - `translation::prompts`: System prompt template
 *   - `translation::core`: Sentence translation service
 *   - `translation::rewriter`: Paragraph rewriting
 *   - `translation::walker`: Document traversal
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Chat completion clients:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Deterministic provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::DocxDocument;
pub use translation::{DocumentTranslator, TranslationOutcome, TranslationService};
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, DocumentError, ProviderError, TranslationError};
