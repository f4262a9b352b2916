//! Image search: candidate picture URLs per query.
//!
//! [`ImageSearch`] is the seam the enrichment pipeline consumes.
//! [`CustomSearchClient`] calls the Google Custom Search JSON API in image mode
//! over ureq, one query at a time, and keeps only PNG and JPEG results.

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::context::RequestContext;
use crate::error::LexiResult;

/// Default base URL of the Custom Search API.
pub const CUSTOM_SEARCH_BASE_URL: &str = "https://www.googleapis.com";

/// MIME types a card can embed.
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// Errors from the image search upstream. Any of them aborts the whole batch.
#[derive(Debug, Error, Diagnostic)]
pub enum ImageError {
    #[error("image search for \"{query}\" failed: {message}")]
    #[diagnostic(
        code(lexicard::images::transport),
        help("Check network access to the image search API and GOOGLE_SEARCH_BASE_URL.")
    )]
    Transport { query: String, message: String },

    #[error("image search returned HTTP {status} for \"{query}\": {body}")]
    #[diagnostic(
        code(lexicard::images::status),
        help(
            "Check GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID, and that the \
             engine has image search enabled. A 429 means the daily quota is spent."
        )
    )]
    Status {
        query: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode image search response for \"{query}\": {message}")]
    #[diagnostic(
        code(lexicard::images::decode),
        help("The image search API answered with an unexpected JSON shape.")
    )]
    Decode { query: String, message: String },
}

/// Image search output for one query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordImages {
    /// The query string as sent, which may differ from the underlying word.
    pub word: String,
    /// Accepted image links in upstream order.
    pub urls: Vec<String>,
}

/// Source of image URLs.
pub trait ImageSearch: Send + Sync {
    /// One [`WordImages`] per query, positionally aligned with `queries`.
    fn search(&self, ctx: &RequestContext, queries: &[String]) -> LexiResult<Vec<WordImages>>;
}

/// Configuration for the Custom Search client.
#[derive(Clone)]
pub struct CustomSearchConfig {
    pub base_url: String,
    pub api_key: String,
    /// Programmable search engine identifier (`cx`).
    pub engine_id: String,
}

impl CustomSearchConfig {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            base_url: CUSTOM_SEARCH_BASE_URL.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }
}

impl std::fmt::Debug for CustomSearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomSearchConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    // Absent when the query has no results.
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
    #[serde(default)]
    mime: Option<String>,
}

fn accepted_links(items: Vec<SearchItem>) -> Vec<String> {
    items
        .into_iter()
        .filter(|item| {
            item.mime
                .as_deref()
                .is_some_and(|mime| ACCEPTED_MIME_TYPES.contains(&mime))
        })
        .map(|item| item.link)
        .collect()
}

/// Client for the Google Custom Search JSON API.
pub struct CustomSearchClient {
    config: CustomSearchConfig,
    agent: ureq::Agent,
}

impl CustomSearchClient {
    pub fn new(config: CustomSearchConfig) -> Self {
        Self {
            config,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    fn search_one(&self, ctx: &RequestContext, query: &str) -> LexiResult<WordImages> {
        ctx.check("image search")?;
        let url = format!(
            "{}/customsearch/v1",
            self.config.base_url.trim_end_matches('/')
        );
        tracing::debug!(query, "image search request");

        let response = self
            .agent
            .get(&url)
            .timeout(ctx.remaining())
            .query("key", &self.config.api_key)
            .query("cx", &self.config.engine_id)
            .query("q", query)
            .query("searchType", "image")
            .call();

        let body: SearchResponse = match response {
            Ok(resp) => resp.into_json().map_err(|e| ImageError::Decode {
                query: query.to_string(),
                message: e.to_string(),
            })?,
            Err(ureq::Error::Status(status, resp)) => {
                return Err(ImageError::Status {
                    query: query.to_string(),
                    status,
                    body: resp.into_string().unwrap_or_default(),
                }
                .into());
            }
            Err(ureq::Error::Transport(transport)) => {
                ctx.check("image search")?;
                return Err(ImageError::Transport {
                    query: query.to_string(),
                    message: transport.to_string(),
                }
                .into());
            }
        };

        Ok(WordImages {
            word: query.to_string(),
            urls: accepted_links(body.items),
        })
    }
}

impl ImageSearch for CustomSearchClient {
    fn search(&self, ctx: &RequestContext, queries: &[String]) -> LexiResult<Vec<WordImages>> {
        queries.iter().map(|q| self.search_one(ctx, q)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexiError;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CustomSearchClient {
        CustomSearchClient::new(CustomSearchConfig {
            base_url: server.uri(),
            api_key: "key".into(),
            engine_id: "engine".into(),
        })
    }

    async fn search(client: CustomSearchClient, queries: &[&str]) -> LexiResult<Vec<WordImages>> {
        let queries: Vec<String> = queries.iter().map(|q| q.to_string()).collect();
        tokio::task::spawn_blocking(move || client.search(&RequestContext::background(), &queries))
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn keeps_only_png_and_jpeg() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("q", "ship"))
            .and(query_param("cx", "engine"))
            .and(query_param("key", "key"))
            .and(query_param("searchType", "image"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"items":[
                    {"link":"https://a/1.png","mime":"image/png"},
                    {"link":"https://a/2.gif","mime":"image/gif"},
                    {"link":"https://a/3.jpg","mime":"image/jpeg"},
                    {"link":"https://a/4.svg","mime":"image/svg+xml"},
                    {"link":"https://a/5"}
                ]}"#,
            ))
            .mount(&server)
            .await;

        let images = search(client(&server), &["ship"]).await.unwrap();
        assert_eq!(
            images,
            vec![WordImages {
                word: "ship".into(),
                urls: vec!["https://a/1.png".into(), "https://a/3.jpg".into()],
            }]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn word_is_the_query_as_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "ship meaning"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"items":[{"link":"https://c/1.jpg","mime":"image/jpeg"}]}"#,
            ))
            .mount(&server)
            .await;

        let images = search(client(&server), &["ship meaning"]).await.unwrap();
        assert_eq!(images[0].word, "ship meaning");
        assert_eq!(images[0].urls, vec!["https://c/1.jpg"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn no_items_means_no_urls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"kind":"customsearch#search"}"#))
            .mount(&server)
            .await;

        let images = search(client(&server), &["qwxz", "zzyx"]).await.unwrap();
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|i| i.urls.is_empty()));
        assert_eq!(images[1].word, "zzyx");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn quota_error_aborts_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let err = search(client(&server), &["ship"]).await.unwrap_err();
        assert!(matches!(
            err,
            LexiError::Images(ImageError::Status { status: 429, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn deadline_hit_mid_call_is_reported_as_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_millis(800)),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let err = tokio::task::spawn_blocking(move || {
            let ctx = RequestContext::with_timeout(Duration::from_millis(200));
            client.search(&ctx, &["ship".to_string()])
        })
        .await
        .unwrap()
        .unwrap_err();
        assert!(matches!(err, LexiError::DeadlineExceeded { .. }), "{err:?}");
    }
}
