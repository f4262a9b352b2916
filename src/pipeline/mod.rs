//! Word enrichment: unknown words in, uploaded cards out.
//!
//! For a batch `U` the pipeline asks the dictionary once, the image search
//! twice (bare words, then each word plus a clarifying suffix), zips the three
//! result lists by position, caps definitions and examples, merges 4 + 4
//! images, and hands the cards to the spaced-repetition sink.
//!
//! Positions are trusted, not re-keyed: the dictionary and plain image results
//! must name the same word at every index, or the batch fails before anything
//! is uploaded. Clarified results are not compared since their queries differ
//! from the words by construction.

pub mod stage;

use std::sync::Arc;

pub use stage::{Stage, StageTracker};

use crate::config::Config;
use crate::context::RequestContext;
use crate::dictionary::{Dictionary, WordInfo, WordsApiClient};
use crate::error::{LexiResult, PipelineError};
use crate::images::{CustomSearchClient, ImageSearch, WordImages};
use crate::sink::{NotionSink, SpacedRepetition};
use crate::word::{IMAGE_COUNT, IMAGES_PER_SOURCE, Word};

/// Suffix appended to each word for the second image search.
pub const DEFAULT_CLARIFY_SUFFIX: &str = " meaning";

/// Tunables for [`EnrichmentPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Appended to every word to form the clarified image query.
    pub clarify_suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clarify_suffix: DEFAULT_CLARIFY_SUFFIX.into(),
        }
    }
}

/// The clarified image queries for `words`, same order.
pub fn clarified_queries(words: &[String], suffix: &str) -> Vec<String> {
    words.iter().map(|w| format!("{w}{suffix}")).collect()
}

/// First [`IMAGES_PER_SOURCE`] plain URLs followed by the first
/// [`IMAGES_PER_SOURCE`] clarified ones.
pub fn merge_images(
    word: &str,
    plain: &[String],
    clarified: &[String],
) -> Result<[String; IMAGE_COUNT], PipelineError> {
    if plain.len() < IMAGES_PER_SOURCE || clarified.len() < IMAGES_PER_SOURCE {
        return Err(PipelineError::InsufficientImages {
            word: word.to_string(),
            plain: plain.len(),
            clarified: clarified.len(),
            required: IMAGES_PER_SOURCE,
        });
    }
    Ok(std::array::from_fn(|i| {
        if i < IMAGES_PER_SOURCE {
            plain[i].clone()
        } else {
            clarified[i - IMAGES_PER_SOURCE].clone()
        }
    }))
}

fn check_len(source_name: &'static str, expected: usize, actual: usize) -> Result<(), PipelineError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PipelineError::BatchLength {
            source_name,
            expected,
            actual,
        })
    }
}

/// Zip the three upstream result lists into cards.
///
/// Fails on the first violated position, so no card is produced for a batch
/// that is not fully consistent.
pub fn assemble_words(
    expected: usize,
    infos: Vec<WordInfo>,
    plain: Vec<WordImages>,
    clarified: Vec<WordImages>,
) -> Result<Vec<Word>, PipelineError> {
    check_len("dictionary", expected, infos.len())?;
    check_len("plain image search", expected, plain.len())?;
    check_len("clarified image search", expected, clarified.len())?;

    infos
        .into_iter()
        .zip(plain)
        .zip(clarified)
        .enumerate()
        .map(|(index, ((info, plain), clarified))| {
            if info.word != plain.word {
                return Err(PipelineError::AlignmentMismatch {
                    index,
                    dictionary_word: info.word,
                    images_word: plain.word,
                });
            }
            let image_urls = merge_images(&info.word, &plain.urls, &clarified.urls)?;
            Ok(Word::new(info.word, info.definitions, info.examples, image_urls))
        })
        .collect()
}

/// Orchestrates dictionary, image search and sink for one batch.
pub struct EnrichmentPipeline {
    dictionary: Arc<dyn Dictionary>,
    images: Arc<dyn ImageSearch>,
    sink: Arc<dyn SpacedRepetition>,
    config: PipelineConfig,
}

impl EnrichmentPipeline {
    pub fn new(
        dictionary: Arc<dyn Dictionary>,
        images: Arc<dyn ImageSearch>,
        sink: Arc<dyn SpacedRepetition>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            dictionary,
            images,
            sink,
            config,
        }
    }

    /// Wire the production upstream clients described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(WordsApiClient::new(config.dictionary.clone())),
            Arc::new(CustomSearchClient::new(config.images.clone())),
            Arc::new(NotionSink::new(config.notion.clone())),
            config.pipeline.clone(),
        )
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch and assemble cards for `unknown` without uploading them.
    pub fn enrich(&self, ctx: &RequestContext, unknown: &[String]) -> LexiResult<Vec<Word>> {
        let infos = self.dictionary.words_info(ctx, unknown)?;
        let plain = self.images.search(ctx, unknown)?;
        let clarified = self
            .images
            .search(ctx, &clarified_queries(unknown, &self.config.clarify_suffix))?;

        Ok(assemble_words(unknown.len(), infos, plain, clarified)?)
    }

    /// Enrich `unknown` and upload the cards in input order.
    ///
    /// Returns the uploaded cards. On failure nothing past the failing word is
    /// uploaded; earlier uploads stay.
    pub fn run(&self, ctx: &RequestContext, unknown: &[String]) -> LexiResult<Vec<Word>> {
        let mut stages = StageTracker::start(Stage::Enriching, unknown.len());

        let words = stages.track(self.enrich(ctx, unknown))?;

        stages.advance(Stage::Uploading);
        stages.track(
            ctx.check("uploading")
                .and_then(|()| self.sink.upload_words(ctx, &words)),
        )?;

        stages.advance(Stage::Done);
        tracing::info!(count = words.len(), "words uploaded");
        Ok(words)
    }
}
