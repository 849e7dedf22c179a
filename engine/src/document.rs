use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::blocks::{content_text, ContentBlock};

/// Immutable post snapshot handed to the engine by the data layer. The
/// engine never mutates one; every ranking call works on a fresh batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub author_id: String,
    /// Display name, resolved by the data layer; the search ranker scores
    /// against it and the author fallback is keyed on it.
    #[serde(default)]
    pub author_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub views: u32,
}

impl Document {
    /// Text the document exposes to tokenization: title, excerpt, block
    /// text, tags and categories, space-joined.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.excerpt.len() + 64);
        push_part(&mut text, &self.title);
        push_part(&mut text, &self.excerpt);
        push_part(&mut text, &content_text(&self.content));
        for tag in &self.tags {
            push_part(&mut text, tag);
        }
        for category in &self.categories {
            push_part(&mut text, category);
        }
        text
    }

    pub(crate) fn age_days(&self, now: OffsetDateTime) -> f32 {
        (now - self.created_at).as_seconds_f32() / 86_400.0
    }

    #[cfg(test)]
    pub(crate) fn for_tests(id: &str, created_at: OffsetDateTime) -> Self {
        Document {
            id: id.to_string(),
            title: String::new(),
            excerpt: String::new(),
            content: Vec::new(),
            tags: Vec::new(),
            categories: Vec::new(),
            author_id: String::new(),
            author_name: String::new(),
            created_at,
            likes: 0,
            views: 0,
        }
    }
}

fn push_part(out: &mut String, part: &str) {
    let part = part.trim();
    if part.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(part);
}

/// One entry of a user's interest profile: a category affinity plus the
/// tags accumulated under it, which count at half the entry's weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    pub category: String,
    pub score: f32,
    #[serde(default)]
    pub tags: Vec<String>,
}
