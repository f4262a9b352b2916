//! Spaced-repetition sink: one notebook page per enriched word.
//!
//! [`SpacedRepetition`] is the seam the enrichment pipeline delivers to.
//! [`NotionSink`] creates pages in a Notion database over ureq. Uploads are
//! sequential and append-only: a failure stops the batch, pages created before
//! it stay where they are.

use miette::Diagnostic;
use serde_json::{Value, json};
use thiserror::Error;

use crate::context::RequestContext;
use crate::error::LexiResult;
use crate::word::Word;

/// Default base URL of the Notion API.
pub const NOTION_BASE_URL: &str = "https://api.notion.com";

/// API version sent in the `Notion-Version` header.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Name of the database's title property.
pub const TITLE_PROPERTY: &str = "Name";

/// Errors from the notebook upstream, always naming the word being uploaded.
#[derive(Debug, Error, Diagnostic)]
pub enum SinkError {
    #[error("the notebook page for word \"{word}\" could not be created: {message}")]
    #[diagnostic(
        code(lexicard::sink::transport),
        help(
            "Check network access to the notebook API. Words before this one \
             were uploaded and are not rolled back."
        )
    )]
    Transport { word: String, message: String },

    #[error("the notebook rejected the page for word \"{word}\" with HTTP {status}: {body}")]
    #[diagnostic(
        code(lexicard::sink::status),
        help(
            "Check NOTION_API_KEY and NOTION_DATABASE_ID, and that the integration \
             is shared with the database. Words before this one were uploaded."
        )
    )]
    Status {
        word: String,
        status: u16,
        body: String,
    },
}

/// Destination for enriched words.
pub trait SpacedRepetition: Send + Sync {
    /// Create one entry per word, in order. Stops at the first failure.
    fn upload_words(&self, ctx: &RequestContext, words: &[Word]) -> LexiResult<()>;
}

/// Configuration for the Notion sink.
#[derive(Clone)]
pub struct NotionConfig {
    pub base_url: String,
    pub api_key: String,
    /// Database that receives one page per word.
    pub database_id: String,
}

impl NotionConfig {
    pub fn new(api_key: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            base_url: NOTION_BASE_URL.into(),
            api_key: api_key.into(),
            database_id: database_id.into(),
        }
    }
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("database_id", &self.database_id)
            .finish()
    }
}

fn rich_text(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content } })
}

fn image_block(url: &str) -> Value {
    json!({
        "object": "block",
        "type": "image",
        "image": { "type": "external", "external": { "url": url } },
    })
}

fn definition_block(definition: &str) -> Value {
    json!({
        "object": "block",
        "type": "bulleted_list_item",
        "bulleted_list_item": { "rich_text": [rich_text(definition)] },
    })
}

fn example_block(example: &str) -> Value {
    let mut text = rich_text(example);
    text["annotations"] = json!({ "italic": true });
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": [text] },
    })
}

/// Body of the page-create request for one word.
///
/// Children: every image, then every definition as a bullet, then every
/// example as an italic paragraph.
pub fn page_request(database_id: &str, word: &Word) -> Value {
    let children: Vec<Value> = word
        .image_urls()
        .iter()
        .map(|url| image_block(url))
        .chain(word.definitions().iter().map(|d| definition_block(d)))
        .chain(word.examples().iter().map(|e| example_block(e)))
        .collect();

    json!({
        "parent": { "type": "database_id", "database_id": database_id },
        "properties": {
            TITLE_PROPERTY: { "title": [rich_text(word.word())] },
        },
        "children": children,
    })
}

/// Sink that creates Notion database pages.
pub struct NotionSink {
    config: NotionConfig,
    agent: ureq::Agent,
}

impl NotionSink {
    pub fn new(config: NotionConfig) -> Self {
        Self {
            config,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    fn create_page(&self, ctx: &RequestContext, word: &Word) -> LexiResult<()> {
        ctx.check("uploading")?;
        let url = format!("{}/v1/pages", self.config.base_url.trim_end_matches('/'));
        let body = page_request(&self.config.database_id, word);

        let response = self
            .agent
            .post(&url)
            .timeout(ctx.remaining())
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .set("Notion-Version", NOTION_VERSION)
            .send_json(body);

        match response {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, resp)) => Err(SinkError::Status {
                word: word.word().to_string(),
                status,
                body: resp.into_string().unwrap_or_default(),
            }
            .into()),
            Err(ureq::Error::Transport(transport)) => {
                ctx.check("uploading")?;
                Err(SinkError::Transport {
                    word: word.word().to_string(),
                    message: transport.to_string(),
                }
                .into())
            }
        }
    }
}

impl SpacedRepetition for NotionSink {
    fn upload_words(&self, ctx: &RequestContext, words: &[Word]) -> LexiResult<()> {
        for (i, word) in words.iter().enumerate() {
            self.create_page(ctx, word)?;
            tracing::info!(word = word.word(), position = i + 1, total = words.len(), "page created");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexiError;
    use crate::word::IMAGE_COUNT;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn card(name: &str) -> Word {
        Word::new(
            name,
            vec!["a vessel".into(), "to send".into()],
            vec!["The ship sailed.".into()],
            std::array::from_fn(|i| format!("https://img/{i}.png")),
        )
    }

    fn ship() -> Word {
        card("ship")
    }

    #[test]
    fn page_children_are_images_then_definitions_then_examples() {
        let page = page_request("db-1", &ship());
        let children = page["children"].as_array().unwrap();

        assert_eq!(children.len(), IMAGE_COUNT + 2 + 1);
        for (i, child) in children[..IMAGE_COUNT].iter().enumerate() {
            assert_eq!(child["type"], "image");
            assert_eq!(child["image"]["type"], "external");
            assert_eq!(child["image"]["external"]["url"], format!("https://img/{i}.png"));
            assert!(child["image"].get("caption").is_none());
        }
        assert_eq!(children[8]["type"], "bulleted_list_item");
        assert_eq!(
            children[8]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
            "a vessel"
        );
        assert_eq!(children[9]["bulleted_list_item"]["rich_text"][0]["text"]["content"], "to send");

        let example = &children[10]["paragraph"]["rich_text"][0];
        assert_eq!(children[10]["type"], "paragraph");
        assert_eq!(example["text"]["content"], "The ship sailed.");
        assert_eq!(example["annotations"]["italic"], true);
    }

    #[test]
    fn page_title_and_parent() {
        let page = page_request("db-1", &ship());
        assert_eq!(page["parent"]["database_id"], "db-1");
        assert_eq!(
            page["properties"][TITLE_PROPERTY]["title"][0]["text"]["content"],
            "ship"
        );
    }

    fn sink(server: &MockServer) -> NotionSink {
        NotionSink::new(NotionConfig {
            base_url: server.uri(),
            api_key: "token".into(),
            database_id: "db-1".into(),
        })
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn uploads_one_page_per_word() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .and(header("Authorization", "Bearer token"))
            .and(header("Notion-Version", NOTION_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"object":"page"}"#))
            .expect(2)
            .mount(&server)
            .await;

        let sink = sink(&server);
        tokio::task::spawn_blocking(move || {
            sink.upload_words(&RequestContext::background(), &[ship(), ship()])
        })
        .await
        .unwrap()
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failure_names_the_word_and_stops() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "properties": { "Name": { "title": [{ "text": { "content": "boat" } }] } }
            })))
            .respond_with(ResponseTemplate::new(400).set_body_string("validation_error"))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = sink(&server);
        let err = tokio::task::spawn_blocking(move || {
            sink.upload_words(&RequestContext::background(), &[ship(), card("boat"), ship()])
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(
            err,
            LexiError::Sink(SinkError::Status { status: 400, ref word, .. }) if word == "boat"
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn deadline_hit_mid_upload_is_reported_as_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
            .mount(&server)
            .await;

        let sink = sink(&server);
        let err = tokio::task::spawn_blocking(move || {
            let ctx = RequestContext::with_timeout(Duration::from_millis(200));
            sink.upload_words(&ctx, &[ship()])
        })
        .await
        .unwrap()
        .unwrap_err();
        assert!(matches!(err, LexiError::DeadlineExceeded { .. }), "{err:?}");
    }
}
