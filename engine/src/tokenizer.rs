use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this carry no ranking signal and are dropped.
const MIN_TOKEN_CHARS: usize = 3;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"\w+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for",
            "of", "with", "by", "is", "it", "as", "be", "this", "that", "from",
            "was", "are", "were", "been", "has", "have", "had", "not", "no", "do",
            "does", "did", "will", "would", "can", "could", "should", "may", "might",
            "i", "we", "you", "he", "she", "they", "my", "your", "how", "what",
            "why", "when", "where", "which", "who", "its", "their", "our", "his",
            "her", "them", "us", "me", "than", "then", "so", "if", "about", "up",
            "out", "just", "also", "more", "some", "any", "all", "each", "every",
            "into", "over", "after", "before", "between", "through", "during",
            "very", "most", "other", "such", "only", "same", "own", "both",
            "being", "here", "there", "these", "those", "while", "because",
        ];
        words.iter().copied().collect()
    };
}

/// Normalize text for ranking vectors: lowercase, split into word-character
/// runs, drop tokens of two characters or fewer. Empty or whitespace-only
/// text yields an empty vec, never an error.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Analyzer for the full-text retrieval side: NFKC fold, lowercase, stopword
/// removal, English stemming. Retrieval wants the extra recall; the ranking
/// vectors in [`tokenize`] deliberately stay unstemmed.
pub fn analyze(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|token| !STOPWORDS.contains(token))
        .map(|token| STEMMER.stem(token).to_string())
        .collect()
}
