/*!
 * Prompt construction for document translation.
 *
 * This module provides:
 * - The fixed system instruction template
 * - The protection rules (brand prefix, quoted terms) rendered into it
 */

pub mod templates;

// Re-export main types
pub use templates::{PromptRules, PromptTemplate};
