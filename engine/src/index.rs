use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;

use crate::blocks::content_text;
use crate::document::Document;
use crate::page::Page;
use crate::search::{search, SearchPage, SortMode, TextHit};
use crate::tokenizer::analyze;

pub type TermId = u32;

/// Candidate caps applied before scoring; they bound the per-query cost so
/// a request never scores the whole corpus.
pub const FULL_TEXT_CAP: usize = 200;
pub const PATTERN_CAP: usize = 200;
pub const AUTHOR_CAP: usize = 200;

const TRIGRAM_CHARS: usize = 3;

#[derive(Debug, Clone)]
struct Posting {
    doc: u32,
    weight: f32,
}

/// In-memory retrieval index over one corpus snapshot. Holds a TF-IDF
/// inverted index with length-normalized postings for full-text queries, a
/// character-trigram index that prefilters substring candidates, and the
/// lowercased author names for the fallback lookup. Built once per corpus
/// load; queries never mutate it.
pub struct CorpusIndex {
    docs: Vec<Document>,
    by_id: HashMap<String, u32>,
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    postings: HashMap<TermId, Vec<Posting>>,
    trigrams: HashMap<String, Vec<u32>>,
    pattern_texts: Vec<String>,
    authors: Vec<String>,
}

impl CorpusIndex {
    pub fn build(docs: Vec<Document>) -> Self {
        let mut by_id: HashMap<String, u32> = HashMap::new();
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut raw: HashMap<TermId, Vec<(u32, u32)>> = HashMap::new();
        let mut trigrams: HashMap<String, Vec<u32>> = HashMap::new();
        let mut pattern_texts: Vec<String> = Vec::with_capacity(docs.len());
        let mut authors: Vec<String> = Vec::with_capacity(docs.len());

        for (pos, doc) in docs.iter().enumerate() {
            let doc_no = pos as u32;
            by_id.entry(doc.id.clone()).or_insert(doc_no);

            let mut counts: HashMap<TermId, u32> = HashMap::new();
            for term in analyze(&doc.search_text()) {
                let next_id = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert_with(|| {
                    df.push(0);
                    next_id
                });
                *counts.entry(tid).or_insert(0) += 1;
            }
            for (tid, tf_raw) in counts {
                df[tid as usize] += 1;
                raw.entry(tid).or_default().push((doc_no, tf_raw));
            }

            let pattern_text = pattern_text_of(doc);
            for gram in trigram_set(&pattern_text) {
                trigrams.entry(gram).or_default().push(doc_no);
            }
            pattern_texts.push(pattern_text);
            authors.push(doc.author_name.to_lowercase());
        }

        // Weight postings as (1 + ln tf) * ln(N/df), then normalize each
        // document's vector to unit length so a query dot product is cosine.
        let n = docs.len().max(1) as f32;
        let mut norms: Vec<f32> = vec![0.0; docs.len()];
        let mut postings: HashMap<TermId, Vec<Posting>> = HashMap::with_capacity(raw.len());
        for (tid, plist) in raw {
            let df_t = df[tid as usize].max(1) as f32;
            let idf = (n / df_t).ln();
            let mut out: Vec<Posting> = plist
                .into_iter()
                .map(|(doc_no, tf_raw)| {
                    let weight = (1.0 + (tf_raw as f32).ln()) * idf;
                    norms[doc_no as usize] += weight * weight;
                    Posting { doc: doc_no, weight }
                })
                .collect();
            out.sort_by_key(|posting| posting.doc);
            postings.insert(tid, out);
        }
        for norm in norms.iter_mut() {
            *norm = norm.sqrt();
            if *norm == 0.0 {
                *norm = 1.0;
            }
        }
        for plist in postings.values_mut() {
            for posting in plist.iter_mut() {
                posting.weight /= norms[posting.doc as usize];
            }
        }

        tracing::debug!(
            num_docs = docs.len(),
            num_terms = dictionary.len(),
            "corpus index built"
        );
        CorpusIndex {
            docs,
            by_id,
            dictionary,
            df,
            postings,
            trigrams,
            pattern_texts,
            authors,
        }
    }

    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn get(&self, post_id: &str) -> Option<&Document> {
        self.by_id
            .get(post_id)
            .map(|&doc_no| &self.docs[doc_no as usize])
    }

    /// Cosine-scored full-text hits, best first, at most `cap`. Query terms
    /// missing from the dictionary contribute nothing; a query with no known
    /// terms returns no hits.
    pub fn text_hits(&self, query: &str, cap: usize) -> Vec<TextHit> {
        let mut tf_q: HashMap<TermId, u32> = HashMap::new();
        for term in analyze(query) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf_q.entry(tid).or_insert(0) += 1;
            }
        }
        if tf_q.is_empty() {
            return Vec::new();
        }

        let n = self.docs.len().max(1) as f32;
        let mut q_weights: HashMap<TermId, f32> = HashMap::with_capacity(tf_q.len());
        for (tid, tf_raw) in tf_q {
            let tf = 1.0 + (tf_raw as f32).ln();
            let df_t = self.df.get(tid as usize).copied().unwrap_or(1).max(1) as f32;
            q_weights.insert(tid, tf * (n / df_t).ln());
        }
        let mut norm = q_weights.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm == 0.0 {
            norm = 1.0;
        }

        let mut scores: HashMap<u32, f32> = HashMap::new();
        for (tid, q_w) in q_weights {
            if let Some(plist) = self.postings.get(&tid) {
                for posting in plist {
                    *scores.entry(posting.doc).or_insert(0.0) += posting.weight * (q_w / norm);
                }
            }
        }

        let mut ranked: Vec<(u32, f32)> = scores.into_iter().collect();
        // Tie-break on document number so the ordering is reproducible.
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(cap);
        ranked
            .into_iter()
            .map(|(doc_no, score)| TextHit {
                doc: self.docs[doc_no as usize].clone(),
                text_score: score,
            })
            .collect()
    }

    /// Case-insensitive substring hits over title, excerpt and block text,
    /// in corpus order, at most `cap`. Needles of three or more characters
    /// go through the trigram index first, so only documents containing
    /// every needle trigram are verified; shorter needles scan the corpus.
    pub fn pattern_hits(&self, query: &str, cap: usize) -> Vec<Document> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<u32> = if needle.chars().count() < TRIGRAM_CHARS {
            (0..self.docs.len() as u32).collect()
        } else {
            let mut lists: Vec<&[u32]> = Vec::new();
            for gram in trigram_set(&needle) {
                match self.trigrams.get(&gram) {
                    Some(list) => lists.push(list.as_slice()),
                    // A trigram no document contains rules out every match.
                    None => return Vec::new(),
                }
            }
            intersect_sorted(lists)
        };

        let mut hits = Vec::new();
        for doc_no in candidates {
            if self.pattern_texts[doc_no as usize].contains(&needle) {
                hits.push(self.docs[doc_no as usize].clone());
                if hits.len() >= cap {
                    break;
                }
            }
        }
        hits
    }

    /// Documents whose author display name contains any query word, in
    /// corpus order, at most `cap`.
    pub fn author_hits(&self, query: &str, cap: usize) -> Vec<Document> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let words: Vec<&str> = needle.split_whitespace().collect();

        let mut hits = Vec::new();
        for (pos, author) in self.authors.iter().enumerate() {
            if author.is_empty() {
                continue;
            }
            if words.iter().any(|word| author.contains(word)) {
                hits.push(self.docs[pos].clone());
                if hits.len() >= cap {
                    break;
                }
            }
        }
        hits
    }

    /// Fetch capped candidate lists and hand them to the ranker. The author
    /// fallback is only looked up when both primary lists came back empty.
    pub fn search_page(
        &self,
        query: &str,
        mode: SortMode,
        page: Page,
        now: OffsetDateTime,
    ) -> SearchPage {
        let full_text = self.text_hits(query, FULL_TEXT_CAP);
        let pattern = self.pattern_hits(query, PATTERN_CAP);
        let authors = if full_text.is_empty() && pattern.is_empty() {
            self.author_hits(query, AUTHOR_CAP)
        } else {
            Vec::new()
        };
        search(query, full_text, pattern, authors, mode, page, now)
    }
}

fn pattern_text_of(doc: &Document) -> String {
    let mut text = String::new();
    text.push_str(&doc.title);
    text.push('\n');
    text.push_str(&doc.excerpt);
    text.push('\n');
    text.push_str(&content_text(&doc.content));
    text.to_lowercase()
}

fn trigram_set(text: &str) -> HashSet<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut grams = HashSet::new();
    for window in chars.windows(TRIGRAM_CHARS) {
        grams.insert(window.iter().collect::<String>());
    }
    grams
}

/// Intersection of ascending postings lists, smallest first so the working
/// set only shrinks.
fn intersect_sorted(mut lists: Vec<&[u32]>) -> Vec<u32> {
    lists.sort_by_key(|list| list.len());
    let mut iter = lists.into_iter();
    let mut acc: Vec<u32> = match iter.next() {
        Some(first) => first.to_vec(),
        None => return Vec::new(),
    };
    for list in iter {
        let mut merged = Vec::with_capacity(acc.len().min(list.len()));
        let (mut i, mut j) = (0usize, 0usize);
        while i < acc.len() && j < list.len() {
            match acc[i].cmp(&list[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    merged.push(acc[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        acc = merged;
        if acc.is_empty() {
            break;
        }
    }
    acc
}
