//! Content relevance engine for a blog platform: related-posts ranking by
//! TF-IDF cosine similarity, composite personalized feed scoring, trending
//! selection, and multi-signal search relevance.
//!
//! Every operation is a pure function of its inputs. Callers fetch and cap
//! the candidate batches, pass the clock in explicitly, and do whatever I/O
//! the results need; the engine itself never blocks, never caches across
//! calls, and never fails on empty input.

pub mod blocks;
pub mod document;
pub mod feed;
pub mod index;
pub mod page;
pub mod search;
pub mod similarity;
pub mod tokenizer;
pub mod trending;
pub mod vocab;

pub use blocks::{content_text, ContentBlock};
pub use document::{Document, Interest};
pub use feed::{rank_feed, score_post, ScoredPost};
pub use index::{CorpusIndex, TermId, AUTHOR_CAP, FULL_TEXT_CAP, PATTERN_CAP};
pub use page::{paginate, Page, Paginated, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use search::{search, SearchHit, SearchPage, SortMode, TextHit};
pub use similarity::{
    cosine_similarity, extend_candidates, related, RelatedPost, TermVector, DEFAULT_RELATED_K,
    MAX_VOCAB_TERMS,
};
pub use tokenizer::{analyze, tokenize};
pub use trending::{trending, TRENDING_WINDOW_DAYS};
pub use vocab::{build_vocabulary, DocTerms, VocabularyBuild};
