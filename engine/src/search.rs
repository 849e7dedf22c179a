use std::collections::HashSet;
use std::str::FromStr;

use serde::Serialize;
use time::OffsetDateTime;

use crate::blocks::content_text;
use crate::document::Document;
use crate::page::Page;

pub const TEXT_SCORE_WEIGHT: f32 = 8.0;
pub const TITLE_PHRASE_BONUS: f32 = 60.0;
pub const EXCERPT_PHRASE_BONUS: f32 = 25.0;
pub const CONTENT_PHRASE_BONUS: f32 = 20.0;
pub const TITLE_WORD_BONUS: f32 = 8.0;
pub const CONTENT_WORD_BONUS: f32 = 3.0;
pub const CATEGORY_WORD_BONUS: f32 = 18.0;
pub const TAG_WORD_BONUS: f32 = 12.0;
pub const AUTHOR_WORD_BONUS: f32 = 10.0;
/// Engagement is capped so a viral post cannot drown out textual relevance.
pub const LIKES_CAP: f32 = 50.0;
pub const LIKES_FACTOR: f32 = 1.2;
pub const VIEWS_CAP: f32 = 40.0;
pub const VIEWS_FACTOR: f32 = 0.02;
pub const FRESH_WEEK_BONUS: f32 = 10.0;
pub const FRESH_MONTH_BONUS: f32 = 4.0;

/// Result ordering for a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Relevance,
    Newest,
    Popular,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relevance" => Ok(SortMode::Relevance),
            "newest" => Ok(SortMode::Newest),
            "popular" => Ok(SortMode::Popular),
            other => Err(format!("unknown sort mode `{other}`")),
        }
    }
}

/// A full-text index hit: the document plus the index's native score.
#[derive(Debug, Clone)]
pub struct TextHit {
    pub doc: Document,
    pub text_score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub post_id: String,
    pub title: String,
    pub score: f32,
}

/// One page of scored results, echoing the clamped paging parameters.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub total_results: usize,
    pub page: usize,
    pub limit: usize,
    pub results: Vec<SearchHit>,
}

/// Merge the candidate lists, score them under `mode`, and slice one page.
///
/// The union of full-text and pattern hits is keyed by document id with the
/// first occurrence winning, so a document in both lists keeps its native
/// text score. Only when that union is empty do the author-fallback hits
/// stand in. `Newest` and `Popular` skip relevance scoring entirely and
/// report `score` 0 for every hit.
pub fn search(
    query: &str,
    full_text_hits: Vec<TextHit>,
    pattern_hits: Vec<Document>,
    author_hits: Vec<Document>,
    mode: SortMode,
    page: Page,
    now: OffsetDateTime,
) -> SearchPage {
    let phrase = query.trim().to_lowercase();
    let words = distinct_words(&phrase);

    let mut seen: HashSet<String> = HashSet::new();
    let mut pool: Vec<(Document, Option<f32>)> = Vec::new();
    for hit in full_text_hits {
        if seen.insert(hit.doc.id.clone()) {
            pool.push((hit.doc, Some(hit.text_score)));
        }
    }
    for doc in pattern_hits {
        if seen.insert(doc.id.clone()) {
            pool.push((doc, None));
        }
    }
    if pool.is_empty() {
        for doc in author_hits {
            if seen.insert(doc.id.clone()) {
                pool.push((doc, None));
            }
        }
    }
    tracing::debug!(candidates = pool.len(), mode = ?mode, "search pool merged");

    let scored: Vec<(Document, f32)> = match mode {
        SortMode::Relevance => {
            let mut scored: Vec<(Document, f32)> = pool
                .into_iter()
                .map(|(doc, text_score)| {
                    let score = relevance_score(&doc, text_score, &phrase, &words, now);
                    (doc, score)
                })
                .collect();
            scored.sort_by(|a, b| {
                b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
            });
            scored
        }
        SortMode::Newest => {
            let mut scored: Vec<(Document, f32)> =
                pool.into_iter().map(|(doc, _)| (doc, 0.0)).collect();
            scored.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
            scored
        }
        SortMode::Popular => {
            let mut scored: Vec<(Document, f32)> =
                pool.into_iter().map(|(doc, _)| (doc, 0.0)).collect();
            scored.sort_by(|a, b| {
                let a_pop = a.0.views as u64 + a.0.likes as u64;
                let b_pop = b.0.views as u64 + b.0.likes as u64;
                b_pop.cmp(&a_pop)
            });
            scored
        }
    };

    let (page_no, limit) = page.clamped();
    let total_results = scored.len();
    let results: Vec<SearchHit> = scored
        .into_iter()
        .skip((page_no - 1).saturating_mul(limit))
        .take(limit)
        .map(|(doc, score)| SearchHit {
            post_id: doc.id,
            title: doc.title,
            score,
        })
        .collect();

    SearchPage {
        query: query.trim().to_string(),
        total_results,
        page: page_no,
        limit,
        results,
    }
}

/// Composite relevance for one candidate. Phrase and word checks are
/// case-insensitive substring containment against the title, excerpt and
/// block text; category and tag checks require equality with a query word.
fn relevance_score(
    doc: &Document,
    text_score: Option<f32>,
    phrase: &str,
    words: &[String],
    now: OffsetDateTime,
) -> f32 {
    let title = doc.title.to_lowercase();
    let excerpt = doc.excerpt.to_lowercase();
    let content = content_text(&doc.content).to_lowercase();
    let author = doc.author_name.to_lowercase();

    let mut score = 0.0f32;
    if let Some(text_score) = text_score {
        score += text_score * TEXT_SCORE_WEIGHT;
    }
    if !phrase.is_empty() {
        if title.contains(phrase) {
            score += TITLE_PHRASE_BONUS;
        }
        if excerpt.contains(phrase) {
            score += EXCERPT_PHRASE_BONUS;
        }
        if content.contains(phrase) {
            score += CONTENT_PHRASE_BONUS;
        }
    }
    for word in words {
        if title.contains(word.as_str()) {
            score += TITLE_WORD_BONUS;
        }
        if content.contains(word.as_str()) {
            score += CONTENT_WORD_BONUS;
        }
    }
    if doc
        .categories
        .iter()
        .any(|category| matches_any_word(category, words))
    {
        score += CATEGORY_WORD_BONUS;
    }
    if doc.tags.iter().any(|tag| matches_any_word(tag, words)) {
        score += TAG_WORD_BONUS;
    }
    if !author.is_empty() && words.iter().any(|word| author.contains(word.as_str())) {
        score += AUTHOR_WORD_BONUS;
    }
    score += (doc.likes as f32 * LIKES_FACTOR).min(LIKES_CAP);
    score += (doc.views as f32 * VIEWS_FACTOR).min(VIEWS_CAP);
    let age = doc.age_days(now);
    if age < 7.0 {
        score += FRESH_WEEK_BONUS;
    } else if age < 30.0 {
        score += FRESH_MONTH_BONUS;
    }
    score
}

fn matches_any_word(label: &str, words: &[String]) -> bool {
    let label = label.to_lowercase();
    words.iter().any(|word| *word == label)
}

/// Lowercased query words, first occurrence only, input order preserved.
fn distinct_words(phrase: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    phrase
        .split_whitespace()
        .filter(|word| seen.insert(word))
        .map(|word| word.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::ContentBlock;
    use time::macros::datetime;

    fn doc(id: &str, title: &str) -> Document {
        let mut doc = Document::for_tests(id, datetime!(2024-01-01 00:00 UTC));
        doc.title = title.to_string();
        doc
    }

    // Scored long after creation, so freshness contributes nothing.
    fn score_of(post: Document, query: &str) -> f32 {
        let now = datetime!(2024-06-01 00:00 UTC);
        let page = search(
            query,
            vec![],
            vec![post],
            vec![],
            SortMode::Relevance,
            Page::default(),
            now,
        );
        page.results[0].score
    }

    #[test]
    fn sort_mode_parses_case_insensitively() {
        assert_eq!("Relevance".parse::<SortMode>(), Ok(SortMode::Relevance));
        assert_eq!("newest".parse::<SortMode>(), Ok(SortMode::Newest));
        assert_eq!("POPULAR".parse::<SortMode>(), Ok(SortMode::Popular));
        assert!("likes".parse::<SortMode>().is_err());
    }

    #[test]
    fn union_keeps_first_occurrence_and_its_text_score() {
        let now = datetime!(2024-01-02 00:00 UTC);
        let full_text = vec![TextHit { doc: doc("p1", "alpha"), text_score: 2.0 }];
        let pattern = vec![doc("p1", "alpha"), doc("p2", "beta")];
        let page = search("alpha", full_text, pattern, vec![], SortMode::Relevance, Page::default(), now);
        assert_eq!(page.total_results, 2);
        assert_eq!(page.results[0].post_id, "p1");
        // p1: 2.0*8 text + 60 phrase + 8 word + 10 fresh; p2: 10 fresh only.
        assert!(page.results[0].score > page.results[1].score);
    }

    #[test]
    fn author_fallback_only_when_union_is_empty() {
        let now = datetime!(2024-01-02 00:00 UTC);
        let authors = vec![doc("a1", "unrelated")];
        let page = search("query", vec![], vec![], authors.clone(), SortMode::Relevance, Page::default(), now);
        assert_eq!(page.total_results, 1);

        let page = search(
            "query",
            vec![],
            vec![doc("p9", "hit")],
            authors,
            SortMode::Relevance,
            Page::default(),
            now,
        );
        let ids: Vec<&str> = page.results.iter().map(|hit| hit.post_id.as_str()).collect();
        assert_eq!(ids, vec!["p9"]);
    }

    #[test]
    fn distinct_words_dedupes_and_keeps_order() {
        assert_eq!(distinct_words("rust async rust"), vec!["rust", "async"]);
        assert!(distinct_words("   ").is_empty());
    }

    #[test]
    fn excerpt_phrase_scores_its_bonus() {
        let mut post = doc("p1", "");
        post.excerpt = "memory safety primer".to_string();
        assert_eq!(score_of(post, "memory safety"), EXCERPT_PHRASE_BONUS);

        // Excerpt words carry no per-word bonus, so scattering them scores 0.
        let mut scattered = doc("p2", "");
        scattered.excerpt = "memory first, safety later".to_string();
        assert_eq!(score_of(scattered, "memory safety"), 0.0);
    }

    #[test]
    fn content_phrase_adds_to_its_word_bonuses() {
        let mut exact = doc("p1", "");
        exact.content = vec![ContentBlock::Paragraph { text: "memory safety".into() }];
        let mut scattered = doc("p2", "");
        scattered.content = vec![ContentBlock::Paragraph { text: "memory then safety".into() }];

        let scattered_score = score_of(scattered, "memory safety");
        assert_eq!(scattered_score, 2.0 * CONTENT_WORD_BONUS);
        assert_eq!(score_of(exact, "memory safety") - scattered_score, CONTENT_PHRASE_BONUS);
    }

    #[test]
    fn category_bonus_requires_word_equality_and_pays_once() {
        let mut post = doc("p1", "");
        post.categories = vec!["safety".to_string()];
        assert_eq!(score_of(post, "memory safety"), CATEGORY_WORD_BONUS);

        let mut both = doc("p2", "");
        both.categories = vec!["memory".to_string(), "safety".to_string()];
        assert_eq!(score_of(both, "memory safety"), CATEGORY_WORD_BONUS);

        let mut prefix = doc("p3", "");
        prefix.categories = vec!["safe".to_string()];
        assert_eq!(score_of(prefix, "memory safety"), 0.0);
    }

    #[test]
    fn tag_word_scores_its_bonus() {
        let mut post = doc("p1", "");
        post.tags = vec!["compilers".to_string(), "memory".to_string()];
        assert_eq!(score_of(post, "memory safety"), TAG_WORD_BONUS);
    }

    #[test]
    fn author_name_word_scores_its_bonus() {
        let mut post = doc("p1", "");
        post.author_name = "Sam Safety".to_string();
        assert_eq!(score_of(post, "memory safety"), AUTHOR_WORD_BONUS);
    }

    #[test]
    fn freshness_tiers_step_down() {
        let now = datetime!(2024-06-01 00:00 UTC);
        let week = Document::for_tests("w", datetime!(2024-05-30 00:00 UTC));
        let month = Document::for_tests("m", datetime!(2024-05-15 00:00 UTC));
        let stale = Document::for_tests("s", datetime!(2024-01-01 00:00 UTC));

        let page = search(
            "zzz",
            vec![],
            vec![week, month, stale],
            vec![],
            SortMode::Relevance,
            Page::default(),
            now,
        );
        assert_eq!(page.results[0].score, FRESH_WEEK_BONUS);
        assert_eq!(page.results[1].score, FRESH_MONTH_BONUS);
        assert_eq!(page.results[2].score, 0.0);
    }
}
