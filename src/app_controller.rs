use anyhow::{anyhow, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::language_utils;
use crate::providers::openai::{OpenAI, OpenAIRequest, OpenAIResponse};
use crate::providers::Provider;
use crate::translation::{DocumentTranslator, TranslationOutcome, TranslationService};

// @module: Application controller for document translation

/// Per-folder counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for document translation
pub struct Controller<P = OpenAI> {
    // @field: App configuration
    config: Config,
    // @field: Document pipeline
    translator: DocumentTranslator<P>,
    // @field: Shared progress display
    multi_progress: MultiProgress,
    // @field: Whether bars are drawn
    show_progress: bool,
}

impl Controller<OpenAI> {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::from_config(&config.translation)?;
        let translator = DocumentTranslator::new(service, config.font_name.clone());
        Ok(Self::with_translator(config, translator))
    }
}

impl<P> Controller<P>
where
    P: Provider<Request = OpenAIRequest, Response = OpenAIResponse>,
{
    /// Create a controller around an existing pipeline
    pub fn with_translator(config: Config, translator: DocumentTranslator<P>) -> Self {
        Self {
            config,
            translator,
            multi_progress: MultiProgress::new(),
            show_progress: false,
        }
    }

    /// Draw progress bars on stderr
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        if show_progress {
            let bar = self.multi_progress.add(ProgressBar::new(0));
            bar.set_style(Self::bar_style("paragraphs"));
            self.translator = self.translator.with_progress_bar(bar);
        }
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    /// Output path for an input document
    pub fn output_path_for(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        FileManager::generate_output_path(input_file, output_dir, &self.config.output_suffix)
    }

    /// Translate one document into `output_dir`
    ///
    /// Returns an error only when the input cannot be used at all; translation
    /// failures come back as [`TranslationOutcome::Failure`]. Returns
    /// `Ok(None)` when the output exists and `force_overwrite` is not set.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<Option<TranslationOutcome>> {
        let start_time = Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist or is not a file: {:?}", input_file));
        }

        match FileManager::detect_file_type(&input_file)? {
            FileType::Docx => {}
            FileType::LegacyWord => {
                return Err(anyhow!("Legacy Word documents are not supported, save {:?} as .docx first", input_file));
            }
            FileType::Unknown => {
                return Err(anyhow!("Not a Word document: {:?}", input_file));
            }
        }

        FileManager::ensure_dir(&output_dir)?;

        let output_path = self.output_path_for(&input_file, &output_dir);
        if FileManager::file_exists(&output_path) && !force_overwrite {
            warn!("Skipping {:?}, translation already exists (use -f to force overwrite)", output_path);
            return Ok(None);
        }

        let language_name = language_utils::get_language_name(&self.config.target_language)
            .unwrap_or_else(|_| self.config.target_language.clone());
        info!(
            "Translating {:?} to {} with {}",
            input_file,
            language_name,
            self.translator.service().model()
        );

        self.translator.service().reset_token_usage().await;
        let outcome = self.translator
            .translate_file(&input_file, &self.config.target_language, &output_path)
            .await;

        match &outcome {
            TranslationOutcome::Success { destination, .. } => {
                info!("Success: {} ({})", destination.display(), Self::format_duration(start_time.elapsed()));
            }
            TranslationOutcome::Failure { reason } => {
                error!("Translation of {:?} failed: {}", input_file, reason);
            }
        }
        info!("{}", self.translator.service().token_usage().await.summary());

        Ok(Some(outcome))
    }

    /// Translate every `.docx` below `input_dir`, writing each output next to its input
    ///
    /// Files that already look like outputs (stem ending in `-<suffix>`) are ignored.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let output_marker = format!("-{}", self.config.output_suffix);
        let documents: Vec<PathBuf> = FileManager::find_files(&input_dir, "docx")?
            .into_iter()
            .filter(|path| {
                !path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().ends_with(&output_marker))
                    .unwrap_or(false)
            })
            .collect();

        if documents.is_empty() {
            return Err(anyhow!("No .docx files found in directory: {:?}", input_dir));
        }

        let folder_pb = if self.show_progress {
            let bar = self.multi_progress.insert(0, ProgressBar::new(documents.len() as u64));
            bar.set_style(Self::bar_style("files"));
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut summary = FolderSummary::default();
        for document in &documents {
            let file_name = document
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = document.parent().map(Path::to_path_buf).unwrap_or_else(|| input_dir.clone());
            match self.run(document.clone(), output_dir, force_overwrite).await {
                Ok(Some(outcome)) if outcome.is_success() => summary.processed += 1,
                Ok(Some(_)) => summary.failed += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors in {}",
            summary.processed,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
