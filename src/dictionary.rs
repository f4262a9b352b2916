//! Dictionary lookups: definitions and usage examples per word.
//!
//! [`Dictionary`] is the seam the enrichment pipeline consumes.
//! [`WordsApiClient`] speaks the WordsAPI REST interface over ureq (sync HTTP),
//! two GETs per word, strictly in input order.

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::context::RequestContext;
use crate::error::LexiResult;

/// Host WordsAPI expects in the `X-RapidAPI-Host` header.
pub const WORDS_API_HOST: &str = "wordsapiv1.p.rapidapi.com";

/// Default base URL of the WordsAPI service.
pub const WORDS_API_BASE_URL: &str = "https://wordsapiv1.p.rapidapi.com";

/// Errors from the dictionary upstream. Any of them aborts the whole batch.
#[derive(Debug, Error, Diagnostic)]
pub enum DictionaryError {
    #[error("dictionary request for \"{word}\" failed: {message}")]
    #[diagnostic(
        code(lexicard::dictionary::transport),
        help("Check network access to the dictionary API and WORDS_API_BASE_URL.")
    )]
    Transport { word: String, message: String },

    #[error("dictionary returned HTTP {status} for \"{word}\": {body}")]
    #[diagnostic(
        code(lexicard::dictionary::status),
        help(
            "A 401/403 means WORDS_API_KEY is wrong or over quota; \
             a 404 means the dictionary has no entry for this word."
        )
    )]
    Status {
        word: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode dictionary response for \"{word}\": {message}")]
    #[diagnostic(
        code(lexicard::dictionary::decode),
        help("The dictionary API answered with an unexpected JSON shape.")
    )]
    Decode { word: String, message: String },
}

/// Dictionary output for one word.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordInfo {
    /// The word exactly as it was requested.
    pub word: String,
    /// Definitions in upstream order, part-of-speech dropped.
    pub definitions: Vec<String>,
    /// Usage examples in upstream order.
    pub examples: Vec<String>,
}

/// Source of definitions and examples.
pub trait Dictionary: Send + Sync {
    /// One [`WordInfo`] per input word, positionally aligned with `words`.
    fn words_info(&self, ctx: &RequestContext, words: &[String]) -> LexiResult<Vec<WordInfo>>;
}

/// Configuration for the WordsAPI client.
#[derive(Clone)]
pub struct WordsApiConfig {
    /// Base URL, without a trailing `/words`.
    pub base_url: String,
    /// RapidAPI key.
    pub api_key: String,
}

impl WordsApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: WORDS_API_BASE_URL.into(),
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for WordsApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordsApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct DefinitionsResponse {
    #[serde(default)]
    definitions: Vec<DefinitionItem>,
}

// Upstream items also carry `partOfSpeech`; cards don't use it.
#[derive(Debug, Deserialize)]
struct DefinitionItem {
    definition: String,
}

#[derive(Debug, Deserialize)]
struct ExamplesResponse {
    #[serde(default)]
    examples: Vec<String>,
}

/// Client for the WordsAPI REST interface.
pub struct WordsApiClient {
    config: WordsApiConfig,
    agent: ureq::Agent,
}

impl WordsApiClient {
    pub fn new(config: WordsApiConfig) -> Self {
        Self {
            config,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    fn endpoint(&self, word: &str, resource: &str) -> String {
        format!(
            "{}/words/{}/{resource}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(word)
        )
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        word: &str,
        resource: &str,
    ) -> LexiResult<T> {
        ctx.check("dictionary lookup")?;
        let url = self.endpoint(word, resource);
        tracing::debug!(word, resource, "dictionary request");

        let response = self
            .agent
            .get(&url)
            .timeout(ctx.remaining())
            .set("X-RapidAPI-Key", &self.config.api_key)
            .set("X-RapidAPI-Host", WORDS_API_HOST)
            .call();

        match response {
            Ok(resp) => resp.into_json::<T>().map_err(|e| {
                DictionaryError::Decode {
                    word: word.to_string(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(ureq::Error::Status(status, resp)) => Err(DictionaryError::Status {
                word: word.to_string(),
                status,
                body: resp.into_string().unwrap_or_default(),
            }
            .into()),
            Err(ureq::Error::Transport(transport)) => {
                // A timeout sized from the deadline surfaces as a transport error.
                ctx.check("dictionary lookup")?;
                Err(DictionaryError::Transport {
                    word: word.to_string(),
                    message: transport.to_string(),
                }
                .into())
            }
        }
    }
}

impl Dictionary for WordsApiClient {
    fn words_info(&self, ctx: &RequestContext, words: &[String]) -> LexiResult<Vec<WordInfo>> {
        let mut infos = Vec::with_capacity(words.len());
        for word in words {
            let definitions: DefinitionsResponse = self.get(ctx, word, "definitions")?;
            let examples: ExamplesResponse = self.get(ctx, word, "examples")?;
            infos.push(WordInfo {
                word: word.clone(),
                definitions: definitions
                    .definitions
                    .into_iter()
                    .map(|d| d.definition)
                    .collect(),
                examples: examples.examples,
            });
        }
        Ok(infos)
    }
}
