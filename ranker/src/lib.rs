//! Corpus loading and candidate selection for the ranker CLI. The engine
//! crate stays pure; everything that touches the filesystem or the clock
//! lives here.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use engine::{extend_candidates, Document, Interest};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use walkdir::WalkDir;

/// Upper bound on the candidate pool handed to the similarity ranker. The
/// engine ranks whatever it is given; bounding the batch is this side's job.
pub const RELATED_CANDIDATE_CAP: usize = 200;

/// Read documents from a `.json`/`.jsonl` file or a directory of them.
/// A `.json` file holds one document or an array; `.jsonl` one document per
/// line, blank lines skipped. Duplicate ids keep the first occurrence.
pub fn load_corpus(input: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() {
                if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(path.to_path_buf());
                    }
                }
            }
        }
        // Directory walk order is filesystem-dependent; sort so reruns see
        // the same corpus order.
        files.sort();
    } else {
        files.push(input.to_path_buf());
    }

    let mut docs: Vec<Document> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            load_jsonl(&file, &mut docs, &mut seen)
                .with_context(|| format!("loading {}", file.display()))?;
        } else {
            load_json(&file, &mut docs, &mut seen)
                .with_context(|| format!("loading {}", file.display()))?;
        }
    }
    Ok(docs)
}

fn load_jsonl(file: &Path, docs: &mut Vec<Document>, seen: &mut HashSet<String>) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: Document = serde_json::from_str(&line)?;
        push_doc(doc, docs, seen);
    }
    Ok(())
}

fn load_json(file: &Path, docs: &mut Vec<Document>, seen: &mut HashSet<String>) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for value in arr {
                let doc: Document = serde_json::from_value(value)?;
                push_doc(doc, docs, seen);
            }
        }
        serde_json::Value::Object(_) => {
            let doc: Document = serde_json::from_value(json)?;
            push_doc(doc, docs, seen);
        }
        _ => {}
    }
    Ok(())
}

fn push_doc(doc: Document, docs: &mut Vec<Document>, seen: &mut HashSet<String>) {
    if seen.insert(doc.id.clone()) {
        docs.push(doc);
    }
}

/// Read an interest profile: a JSON array of `{category, score, tags?}`.
pub fn load_profile(input: &Path) -> Result<Vec<Interest>> {
    let f = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let interests: Vec<Interest> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", input.display()))?;
    Ok(interests)
}

/// The reference clock for every ranking call: an explicit RFC3339 override
/// for reproducible runs, or the wall clock.
pub fn resolve_now(now: Option<&str>) -> Result<OffsetDateTime> {
    match now {
        Some(raw) => OffsetDateTime::parse(raw, &Rfc3339)
            .with_context(|| format!("invalid RFC3339 timestamp `{raw}`")),
        None => Ok(OffsetDateTime::now_utc()),
    }
}

/// Candidate batch for a related-posts call: posts sharing an author,
/// category or tag with the target, topped up to `min` from the remaining
/// posts ordered by likes then recency. The pool never exceeds
/// [`RELATED_CANDIDATE_CAP`].
pub fn related_candidates(docs: &[Document], target: &Document, min: usize) -> Vec<Document> {
    let mut primary: Vec<Document> = Vec::new();
    let mut rest: Vec<Document> = Vec::new();
    for doc in docs {
        if doc.id == target.id {
            continue;
        }
        if shares_facet(doc, target) {
            primary.push(doc.clone());
        } else {
            rest.push(doc.clone());
        }
    }
    primary.truncate(RELATED_CANDIDATE_CAP);
    rest.sort_by(|a, b| {
        b.likes
            .cmp(&a.likes)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    extend_candidates(primary, rest, &target.id, min.min(RELATED_CANDIDATE_CAP))
}

fn shares_facet(doc: &Document, target: &Document) -> bool {
    if !target.author_id.is_empty() && doc.author_id == target.author_id {
        return true;
    }
    if doc
        .categories
        .iter()
        .any(|category| target.categories.contains(category))
    {
        return true;
    }
    doc.tags.iter().any(|tag| target.tags.contains(tag))
}
