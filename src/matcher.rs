use serde::Serialize;

use crate::db::PersonRecord;
use crate::similarity::similarity;
use crate::text::normalize;

pub const DEFAULT_THRESHOLD: f64 = 0.55;

const FIRST_WEIGHT: f64 = 0.4;
const LAST_WEIGHT: f64 = 0.6;
const LAST_EXACT_BOOST: f64 = 0.15;
const FIRST_EXACT_BOOST: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub score: f64,
    pub full_name: String,
    pub role: String,
    pub note: String,
    pub profile_url: String,
    pub source_page: String,
}

#[derive(Debug, Clone)]
pub struct MatchOptions<'a> {
    pub first: Option<&'a str>,
    pub last: Option<&'a str>,
    pub limit: usize,
    pub threshold: f64,
}

impl Default for MatchOptions<'_> {
    fn default() -> Self {
        Self {
            first: None,
            last: None,
            limit: 10,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// The first/last tokens actually compared against record fields.
struct QueryParts {
    full: String,
    first: String,
    last: String,
}

impl QueryParts {
    fn new(query: &str, first: Option<&str>, last: Option<&str>) -> Self {
        let full = query.trim().to_string();
        let normalized = normalize(&full);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        let first = match first.filter(|f| !f.is_empty()) {
            Some(f) => f.to_string(),
            None => tokens.first().map(|t| t.to_string()).unwrap_or_default(),
        };
        let last = match last.filter(|l| !l.is_empty()) {
            Some(l) => l.to_string(),
            None => match tokens.as_slice() {
                [] => String::new(),
                [only] => only.to_string(),
                [.., tail] => tail.to_string(),
            },
        };
        Self { full, first, last }
    }

    /// Nothing left to compare once punctuation is stripped.
    fn is_empty(&self) -> bool {
        [&self.full, &self.first, &self.last]
            .iter()
            .all(|part| normalize(part).is_empty())
    }
}

/// Rank `records` against a free-text query and optional explicit first/last
/// names. Best first, at most `opts.limit` results, all at or above
/// `opts.threshold`. Equal scores keep the input order.
pub fn find_best_matches(query: &str, records: &[PersonRecord], opts: &MatchOptions) -> Vec<MatchResult> {
    let q = QueryParts::new(query, opts.first, opts.last);
    if q.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<MatchResult> = records
        .iter()
        .map(|r| (score_record(&q, r), r))
        .filter(|(score, _)| *score >= opts.threshold)
        .map(|(score, r)| MatchResult {
            score,
            full_name: r.full_name.clone(),
            role: r.role.clone(),
            note: r.note.clone(),
            profile_url: r.profile_url.clone(),
            source_page: r.source_page.clone(),
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(opts.limit);
    matches
}

fn score_record(q: &QueryParts, r: &PersonRecord) -> f64 {
    let full_name_score = if q.full.is_empty() { 0.0 } else { similarity(&q.full, &r.full_name) };
    let first_score = if q.first.is_empty() { 0.0 } else { similarity(&q.first, &r.first_name) };
    let last_score = if q.last.is_empty() { 0.0 } else { similarity(&q.last, &r.last_name) };

    let mut weighted = 0.0;
    let mut weight_total = 0.0;
    if !q.first.is_empty() {
        weighted += first_score * FIRST_WEIGHT;
        weight_total += FIRST_WEIGHT;
    }
    if !q.last.is_empty() {
        weighted += last_score * LAST_WEIGHT;
        weight_total += LAST_WEIGHT;
    }
    let combined_score = if weight_total > 0.0 { weighted / weight_total } else { 0.0 };

    let record_first = normalize(&r.first_name);
    let record_last = normalize(&r.last_name);
    let mut boost = 0.0;
    if !q.last.is_empty() && !record_last.is_empty() && normalize(&q.last) == record_last {
        boost += LAST_EXACT_BOOST;
    }
    if !q.first.is_empty() && !record_first.is_empty() && normalize(&q.first) == record_first {
        boost += FIRST_EXACT_BOOST;
    }

    let best = full_name_score.max(first_score).max(last_score).max(combined_score);
    (best + boost).min(1.0)
}
