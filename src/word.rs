//! The enriched word card handed to the spaced-repetition sink.

use serde::Serialize;

/// Most definitions kept per card.
pub const MAX_DEFINITIONS: usize = 4;
/// Most usage examples kept per card.
pub const MAX_EXAMPLES: usize = 4;
/// Images taken from each of the two image searches.
pub const IMAGES_PER_SOURCE: usize = 4;
/// Images on every card: plain results first, then clarified ones.
pub const IMAGE_COUNT: usize = IMAGES_PER_SOURCE * 2;

/// A fully enriched word.
///
/// Built only through [`Word::new`], which caps definitions and examples.
/// The image list has a fixed length by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    word: String,
    definitions: Vec<String>,
    examples: Vec<String>,
    image_urls: [String; IMAGE_COUNT],
}

impl Word {
    /// Build a card, keeping at most [`MAX_DEFINITIONS`] definitions and
    /// [`MAX_EXAMPLES`] examples (prefix order).
    pub fn new(
        word: impl Into<String>,
        mut definitions: Vec<String>,
        mut examples: Vec<String>,
        image_urls: [String; IMAGE_COUNT],
    ) -> Self {
        definitions.truncate(MAX_DEFINITIONS);
        examples.truncate(MAX_EXAMPLES);
        Self {
            word: word.into(),
            definitions,
            examples,
            image_urls,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }
}
