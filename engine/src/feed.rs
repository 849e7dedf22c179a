use serde::Serialize;
use time::OffsetDateTime;

use crate::document::{Document, Interest};

pub const LIKES_WEIGHT: f32 = 0.4;
pub const RECENCY_WEIGHT: f32 = 0.3;
pub const INTEREST_WEIGHT: f32 = 0.3;
/// Tag overlap counts at half the strength of a category match.
pub const TAG_AFFINITY_FACTOR: f32 = 0.5;
/// Floor for the age in days, also added inside the recency log. Keeps a
/// same-day post away from divide-by-zero and from the degenerate ln(1)=0.
pub const AGE_EPSILON_DAYS: f32 = 0.5;

/// One feed entry with its composite score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPost {
    pub post_id: String,
    pub score: f32,
}

/// Composite feed score: engagement velocity, recency decay, and profile
/// affinity, weighted 0.4 / 0.3 / 0.3. Pure in `now` so the same inputs
/// always score the same.
pub fn score_post(doc: &Document, interests: &[Interest], now: OffsetDateTime) -> f32 {
    let age = doc.age_days(now).max(AGE_EPSILON_DAYS);
    let engagement = doc.likes as f32 / age;
    let recency = 1.0 / (age + 1.0 + AGE_EPSILON_DAYS).ln();
    engagement * LIKES_WEIGHT + recency * RECENCY_WEIGHT + interest_score(doc, interests)
}

/// Profile affinity already multiplied by [`INTEREST_WEIGHT`]. Category
/// equality contributes the interest's full score, each overlapping tag half
/// of it, normalized by the profile size. An empty profile contributes 0.
fn interest_score(doc: &Document, interests: &[Interest]) -> f32 {
    if interests.is_empty() {
        return 0.0;
    }
    let mut affinity = 0.0f32;
    for interest in interests {
        if doc
            .categories
            .iter()
            .any(|category| category == &interest.category)
        {
            affinity += interest.score;
        }
        for tag in &interest.tags {
            if doc.tags.iter().any(|t| t == tag) {
                affinity += interest.score * TAG_AFFINITY_FACTOR;
            }
        }
    }
    affinity / interests.len().max(1) as f32 * INTEREST_WEIGHT
}

/// Score every post and order best first. The sort is stable, so posts with
/// equal scores keep their input order.
pub fn rank_feed(docs: &[Document], interests: &[Interest], now: OffsetDateTime) -> Vec<ScoredPost> {
    let mut ranked: Vec<ScoredPost> = docs
        .iter()
        .map(|doc| ScoredPost {
            post_id: doc.id.clone(),
            score: score_post(doc, interests, now),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn post(id: &str, likes: u32, categories: &[&str], tags: &[&str]) -> Document {
        let mut doc = Document::for_tests(id, datetime!(2024-03-01 12:00 UTC));
        doc.likes = likes;
        doc.categories = categories.iter().map(|s| s.to_string()).collect();
        doc.tags = tags.iter().map(|s| s.to_string()).collect();
        doc
    }

    #[test]
    fn more_likes_at_equal_age_scores_higher() {
        let now = datetime!(2024-03-04 12:00 UTC);
        let quiet = post("a", 2, &[], &[]);
        let loud = post("b", 40, &[], &[]);
        assert!(score_post(&loud, &[], now) > score_post(&quiet, &[], now));
    }

    #[test]
    fn same_day_post_scores_finite_and_positive() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let fresh = post("a", 0, &[], &[]);
        let score = score_post(&fresh, &[], now);
        assert!(score.is_finite());
        assert!(score > 0.0);
    }

    #[test]
    fn tag_overlap_counts_half_of_category_match() {
        let now = datetime!(2024-03-04 12:00 UTC);
        let by_category = post("a", 0, &["rust"], &[]);
        let by_tag = post("b", 0, &[], &["rust"]);
        let profile = vec![Interest {
            category: "rust".to_string(),
            score: 1.0,
            tags: vec!["rust".to_string()],
        }];
        let base = score_post(&post("c", 0, &[], &[]), &profile, now);
        let cat_lift = score_post(&by_category, &profile, now) - base;
        let tag_lift = score_post(&by_tag, &profile, now) - base;
        assert!((cat_lift - 2.0 * tag_lift).abs() < 1e-5);
    }

    #[test]
    fn rank_feed_orders_best_first_and_keeps_ties_stable() {
        let now = datetime!(2024-03-04 12:00 UTC);
        let docs = vec![post("a", 1, &[], &[]), post("b", 1, &[], &[]), post("c", 99, &[], &[])];
        let ranked = rank_feed(&docs, &[], now);
        assert_eq!(ranked[0].post_id, "c");
        assert_eq!(ranked[1].post_id, "a");
        assert_eq!(ranked[2].post_id, "b");
    }
}
