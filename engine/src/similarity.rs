use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::document::Document;
use crate::vocab::{build_vocabulary, VocabularyBuild};

/// Vocabulary cap for one related-posts batch; bounds memory and the cosine
/// work per call.
pub const MAX_VOCAB_TERMS: usize = 1000;
/// Default number of related posts returned.
pub const DEFAULT_RELATED_K: usize = 6;

/// Sparse term-weight vector over the capped vocabulary. A zero vector is
/// valid (empty or fully out-of-vocabulary text).
pub type TermVector = HashMap<String, f32>;

/// One related-post hit.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedPost {
    pub post_id: String,
    pub similarity: f32,
}

/// Rank `candidates` by TF-IDF cosine similarity against `target`, best
/// first, bounded to `k`. Ties keep the caller's candidate order; small or
/// empty candidate sets return fewer than `k` rows, never an error.
pub fn related(target: &Document, candidates: &[Document], k: usize) -> Vec<RelatedPost> {
    let mut texts = Vec::with_capacity(candidates.len() + 1);
    texts.push(target.search_text());
    texts.extend(candidates.iter().map(Document::search_text));

    let build = build_vocabulary(&texts, MAX_VOCAB_TERMS);
    let vectors = weigh(&build);
    tracing::debug!(
        candidates = candidates.len(),
        vocab = build.vocabulary.len(),
        "related ranking"
    );

    let target_vector = &vectors[0];
    let mut hits: Vec<RelatedPost> = candidates
        .iter()
        .enumerate()
        .map(|(pos, doc)| RelatedPost {
            post_id: doc.id.clone(),
            similarity: cosine_similarity(target_vector, &vectors[pos + 1]),
        })
        .collect();
    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(k);
    hits
}

/// TF-IDF vectors for the whole batch, restricted to the capped vocabulary.
/// `idf = ln(1 + N / (1 + df))` keeps every weight strictly positive, so
/// ubiquitous terms are damped instead of flipping negative.
fn weigh(build: &VocabularyBuild) -> Vec<TermVector> {
    let n = build.doc_terms.len() as f32;
    build
        .doc_terms
        .iter()
        .map(|doc| {
            let len = doc.len.max(1) as f32;
            let mut vector = TermVector::with_capacity(doc.counts.len());
            for (term, count) in &doc.counts {
                if !build.vocabulary.contains(term) {
                    continue;
                }
                let tf = *count as f32 / len;
                let df = build.doc_frequency.get(term).copied().unwrap_or(0) as f32;
                let idf = (1.0 + n / (1.0 + df)).ln();
                vector.insert(term.clone(), tf * idf);
            }
            vector
        })
        .collect()
}

/// Cosine of the angle between two sparse term vectors; 0 when either norm
/// is 0, so degenerate inputs never divide by zero.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut dot = 0.0f32;
    for (term, weight) in small {
        if let Some(other) = large.get(term) {
            dot += weight * other;
        }
    }
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn norm(vector: &TermVector) -> f32 {
    vector.values().map(|weight| weight * weight).sum::<f32>().sqrt()
}

/// Top up a thin candidate batch with a secondary "recent + popular" batch,
/// skipping duplicates and the target itself, until `min` is reached or the
/// secondary batch runs out. The ranker itself never widens its own input;
/// callers apply this before calling [`related`] again.
pub fn extend_candidates(
    primary: Vec<Document>,
    secondary: Vec<Document>,
    target_id: &str,
    min: usize,
) -> Vec<Document> {
    if primary.len() >= min {
        return primary;
    }
    let mut merged = primary;
    let mut seen: HashSet<String> = merged.iter().map(|doc| doc.id.clone()).collect();
    seen.insert(target_id.to_string());
    for doc in secondary {
        if merged.len() >= min {
            break;
        }
        if seen.contains(doc.id.as_str()) {
            continue;
        }
        seen.insert(doc.id.clone());
        merged.push(doc);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, f32)]) -> TermVector {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn zero_vector_yields_zero_similarity() {
        let a = vector(&[("rust", 1.0)]);
        let empty = TermVector::new();
        assert_eq!(cosine_similarity(&a, &empty), 0.0);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = vector(&[("rust", 0.8), ("async", 0.2)]);
        let b = vector(&[("rust", 0.3), ("tokio", 0.9)]);
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        assert!(ab > 0.0 && ab <= 1.0);
    }
}
