/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct and its implementation,
 * which translates text one sentence at a time through a chat completion provider.
 * A sentence that cannot be translated degrades to its original text.
 */

use anyhow::{Result, anyhow};
use log::{debug, error, warn};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::app_config::TranslationConfig;
use crate::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};
use crate::providers::Provider;
use super::prompts::{PromptRules, PromptTemplate};
use super::segmenter::split_into_sentences;

/// Number of characters shown when a text is echoed in a log line
pub const LOG_PREVIEW_CHARS: usize = 50;

/// First `max_chars` characters of `text`, for log lines
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Sentences sent to the provider
    pub sentences: u64,

    /// Sentences that fell back to their original text
    pub fallbacks: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self::with_provider_info(String::new(), String::new())
    }

    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            sentences: 0,
            fallbacks: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Add token usage numbers
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        // Use the API duration for rate calculation, with fallback to elapsed time
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        let elapsed_minutes = self.start_time.elapsed().as_secs_f64() / 60.0;
        let api_minutes = self.api_duration.as_secs_f64() / 60.0;

        format!(
            "Token Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Sentences: {} ({} kept original)\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             Elapsed time: {:.2} minutes\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}",
            self.provider,
            self.model,
            self.sentences,
            self.fallbacks,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            elapsed_minutes,
            api_minutes,
            self.tokens_per_minute()
        )
    }
}

/// Result of translating one sentence
#[derive(Debug, Clone, PartialEq)]
pub enum SentenceOutcome {
    /// The provider returned a usable translation
    Translated(String),

    /// The sentence is kept untranslated
    Fallback {
        /// The sentence as it was sent
        original: String,
        /// Why the translation was not used
        reason: String,
    },
}

impl SentenceOutcome {
    /// Text to place in the output, translated or original
    pub fn text(&self) -> &str {
        match self {
            Self::Translated(text) => text,
            Self::Fallback { original, .. } => original,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Translated(text) => text,
            Self::Fallback { original, .. } => original,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Translation options for customizing the translation process
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Sampling temperature sent with every request
    pub temperature: f32,

    /// Upper bound on generated tokens, if any
    pub max_tokens: Option<u32>,

    /// Texts with fewer trimmed characters skip the provider
    pub min_text_chars: usize,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: None,
            min_text_chars: 2,
        }
    }
}

/// Sentence-by-sentence translation service
///
/// Generic over any provider speaking the OpenAI chat completions types, so the
/// HTTP client and the test mock are interchangeable.
#[derive(Debug)]
pub struct TranslationService<P> {
    /// Chat completion backend
    provider: P,

    /// Model sent with every request
    model: String,

    /// Translation options
    pub options: TranslationOptions,

    /// System prompt template
    prompt: PromptTemplate,

    /// Protection rules rendered into the prompt
    rules: PromptRules,

    /// Usage accumulated since creation or the last reset
    stats: Mutex<TokenUsageStats>,
}

impl TranslationService<OpenAI> {
    /// Create a service backed by the configured OpenAI-compatible provider
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let endpoint = config.get_endpoint();
        if endpoint.trim().is_empty() {
            return Err(anyhow!("Endpoint cannot be empty"));
        }
        let model = config.get_model();
        let client = OpenAI::new_with_timeout(
            config.get_api_key(),
            endpoint,
            model.clone(),
            config.get_timeout_secs(),
        );

        let options = TranslationOptions {
            temperature: config.common.temperature,
            max_tokens: config.common.max_tokens,
            min_text_chars: config.common.min_text_chars,
        };

        let service = Self::new(client, model, options, config.common.prompt_rules());
        service.set_provider_name(config.provider.display_name());
        Ok(service)
    }
}

impl<P> TranslationService<P>
where
    P: Provider<Request = OpenAIRequest, Response = OpenAIResponse>,
{
    /// Create a new translation service
    pub fn new(provider: P, model: impl Into<String>, options: TranslationOptions, rules: PromptRules) -> Self {
        let model = model.into();
        Self {
            provider,
            stats: Mutex::new(TokenUsageStats::with_provider_info(String::new(), model.clone())),
            model,
            options,
            prompt: PromptTemplate::default(),
            rules,
        }
    }

    fn set_provider_name(&self, name: &str) {
        if let Ok(mut stats) = self.stats.try_lock() {
            stats.provider = name.to_string();
        }
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The model sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The system instruction used for a target language
    pub fn system_prompt(&self, target_language: &str) -> String {
        self.prompt.render(target_language, &self.rules)
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<()> {
        self.provider.test_connection().await
            .map_err(|e| anyhow!("Failed to connect to translation provider: {}", e))
    }

    /// Translate a block of text
    ///
    /// The text is split into sentences, each sentence is translated on its
    /// own and the results are joined with a single space. Sentences that fail
    /// keep their original text. Texts shorter than `min_text_chars` trimmed
    /// characters are returned unchanged without a provider call.
    pub async fn translate(&self, text: &str, target_language: &str) -> String {
        if text.trim().chars().count() < self.options.min_text_chars {
            return text.to_string();
        }

        let sentences = split_into_sentences(text);
        let mut translated = Vec::with_capacity(sentences.len());
        for sentence in &sentences {
            translated.push(self.translate_sentence(sentence, target_language).await.into_text());
        }

        translated.join(" ")
    }

    /// Translate one sentence, falling back to the original on any failure
    pub async fn translate_sentence(&self, sentence: &str, target_language: &str) -> SentenceOutcome {
        let mut request = OpenAIRequest::new(self.model.as_str())
            .add_message("system", self.system_prompt(target_language))
            .add_message("user", sentence)
            .temperature(self.options.temperature);
        if let Some(max_tokens) = self.options.max_tokens {
            request = request.max_tokens(max_tokens);
        }

        let start_time = Instant::now();
        let result = self.provider.complete(request).await;
        let duration = start_time.elapsed();

        let outcome = match result {
            Ok(response) => {
                let usage = P::token_usage(&response);
                self.record_usage(usage, duration).await;

                let translated = P::extract_text(&response).trim().to_string();
                if translated.is_empty() {
                    warn!("Empty translation for '{}', keeping original", preview(sentence, LOG_PREVIEW_CHARS));
                    SentenceOutcome::Fallback {
                        original: sentence.to_string(),
                        reason: "provider returned an empty completion".to_string(),
                    }
                } else {
                    debug!("Translated sentence in {:?}", duration);
                    SentenceOutcome::Translated(translated)
                }
            }
            Err(e) => {
                self.record_usage(None, duration).await;
                error!("Error translating sentence '{}': {}", preview(sentence, LOG_PREVIEW_CHARS), e);
                SentenceOutcome::Fallback {
                    original: sentence.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        if outcome.is_fallback() {
            self.stats.lock().await.fallbacks += 1;
        }
        outcome
    }

    async fn record_usage(&self, usage: Option<(u64, u64)>, duration: Duration) {
        let mut stats = self.stats.lock().await;
        stats.sentences += 1;
        stats.api_duration += duration;
        if let Some((prompt_tokens, completion_tokens)) = usage {
            stats.add_token_usage(Some(prompt_tokens), Some(completion_tokens));
        }
    }

    /// Snapshot of the usage accumulated so far
    pub async fn token_usage(&self) -> TokenUsageStats {
        self.stats.lock().await.clone()
    }

    /// Start a new accounting period
    pub async fn reset_token_usage(&self) {
        let mut stats = self.stats.lock().await;
        let provider = std::mem::take(&mut stats.provider);
        *stats = TokenUsageStats::with_provider_info(provider, self.model.clone());
    }
}
