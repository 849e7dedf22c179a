use std::collections::{HashMap, HashSet};

use crate::tokenizer::tokenize;

/// Term counts for one document plus its token count.
#[derive(Debug, Clone, Default)]
pub struct DocTerms {
    pub counts: HashMap<String, u32>,
    pub len: usize,
}

/// Shared vocabulary and per-document statistics for one ranking batch.
#[derive(Debug)]
pub struct VocabularyBuild {
    pub vocabulary: HashSet<String>,
    pub doc_terms: Vec<DocTerms>,
    pub doc_frequency: HashMap<String, u32>,
}

/// Tokenize a batch of texts and build its shared vocabulary, capped to the
/// `max_terms` highest total-frequency terms (ties broken lexicographically
/// so equal corpora always produce the same vocabulary). Terms outside the
/// cap drop out of every vector downstream; an empty text yields an empty
/// count map and a zero vector, which is legal.
pub fn build_vocabulary(texts: &[String], max_terms: usize) -> VocabularyBuild {
    let mut doc_terms = Vec::with_capacity(texts.len());
    let mut doc_frequency: HashMap<String, u32> = HashMap::new();
    let mut total_counts: HashMap<String, u64> = HashMap::new();

    for text in texts {
        let tokens = tokenize(text);
        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
        for (term, count) in &counts {
            *doc_frequency.entry(term.clone()).or_insert(0) += 1;
            *total_counts.entry(term.clone()).or_insert(0) += u64::from(*count);
        }
        doc_terms.push(DocTerms { counts, len: tokens.len() });
    }

    let vocabulary: HashSet<String> = if total_counts.len() <= max_terms {
        total_counts.into_keys().collect()
    } else {
        let mut ranked: Vec<(String, u64)> = total_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_terms);
        ranked.into_iter().map(|(term, _)| term).collect()
    };

    VocabularyBuild { vocabulary, doc_terms, doc_frequency }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(texts: &[&str], max_terms: usize) -> VocabularyBuild {
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        build_vocabulary(&owned, max_terms)
    }

    #[test]
    fn counts_and_document_frequency() {
        let out = build(&["rust rust tooling", "rust async"], 100);
        assert_eq!(out.doc_terms[0].counts["rust"], 2);
        assert_eq!(out.doc_terms[0].len, 3);
        assert_eq!(out.doc_frequency["rust"], 2);
        assert_eq!(out.doc_frequency["tooling"], 1);
    }

    #[test]
    fn cap_keeps_highest_total_frequency() {
        let out = build(&["alpha alpha beta", "alpha beta gamma"], 2);
        assert!(out.vocabulary.contains("alpha"));
        assert!(out.vocabulary.contains("beta"));
        assert!(!out.vocabulary.contains("gamma"));
    }

    #[test]
    fn cap_ties_break_lexicographically() {
        let out = build(&["zulu alpha"], 1);
        assert!(out.vocabulary.contains("alpha"));
        assert!(!out.vocabulary.contains("zulu"));
    }

    #[test]
    fn empty_document_is_legal() {
        let out = build(&["", "rust"], 10);
        assert!(out.doc_terms[0].counts.is_empty());
        assert_eq!(out.doc_terms[0].len, 0);
    }
}
