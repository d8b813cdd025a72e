/*!
 * System prompt template for sentence translation.
 *
 * Every request carries the same rule set. Only the target language and the
 * protection rules vary, and both come from configuration.
 */

use serde::{Deserialize, Serialize};

/// Tokens the model must leave untranslated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRules {
    /// Words beginning with this prefix are kept as-is (brand names)
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,

    /// Words that are kept as-is when written in single quotes
    #[serde(default = "default_protected_terms")]
    pub protected_terms: Vec<String>,
}

fn default_protected_prefix() -> String {
    "Forti".to_string()
}

fn default_protected_terms() -> Vec<String> {
    vec!["output".to_string(), "spoke".to_string()]
}

impl Default for PromptRules {
    fn default() -> Self {
        Self {
            protected_prefix: default_protected_prefix(),
            protected_terms: default_protected_terms(),
        }
    }
}

/// System prompt template for sentence translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt.
    ///
    /// Placeholders: `{target_language}`, `{prefix_rule}`, `{quoted_rule}`.
    pub const SENTENCE_TRANSLATOR: &'static str = "You are a professional, authentic machine translation engine. \
Translate the following sentence to {target_language}. \
Output translation directly without any additional text. \
Don't translate IT terms. \
{prefix_rule}\
{quoted_rule}\
Keep the original words unchanged which you can't recognize.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default sentence translator template.
    pub fn sentence_translator() -> Self {
        Self::new(Self::SENTENCE_TRANSLATOR)
    }

    /// Render the template for a target language.
    ///
    /// An empty prefix or an empty term list drops the matching rule.
    pub fn render(&self, target_language: &str, rules: &PromptRules) -> String {
        let prefix_rule = if rules.protected_prefix.trim().is_empty() {
            String::new()
        } else {
            format!("Don't translate the words beginning with '{}'. ", rules.protected_prefix.trim())
        };

        let quoted_rule = if rules.protected_terms.is_empty() {
            String::new()
        } else {
            let terms = rules.protected_terms
                .iter()
                .map(|term| format!("'{}'", term))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Don't translate words in single quotes ({}). ", terms)
        };

        self.template
            .replace("{target_language}", target_language)
            .replace("{prefix_rule}", &prefix_rule)
            .replace("{quoted_rule}", &quoted_rule)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::sentence_translator()
    }
}
