//! Time filter → score → sort → truncate

use chrono::NaiveDateTime;
use tracing::error;

use crate::models::{Classification, Comment, ScoredComment, SortOrder};
use crate::scoring::SentimentScorer;

/// Accepted format of `start_time` / `end_time`
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a caller timestamp as UTC unix seconds
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    match NaiveDateTime::parse_from_str(raw, TIME_FORMAT) {
        Ok(dt) => Some(dt.and_utc().timestamp()),
        Err(e) => {
            error!("Ignoring unparsable time bound {:?}: {}", raw, e);
            None
        }
    }
}

/// Inclusive creation-time window; a missing bound is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeRange {
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.and_then(parse_timestamp),
            end: end.and_then(parse_timestamp),
        }
    }

    pub fn contains(&self, created_at: i64) -> bool {
        self.start.map_or(true, |s| s <= created_at) && self.end.map_or(true, |e| created_at <= e)
    }
}

/// Score the comments inside `range`, sort them by polarity and keep at most `limit`.
///
/// `skip` is already applied by the comments API; `comments` is the page after it.
pub fn score_comments(
    comments: Vec<Comment>,
    range: &TimeRange,
    scorer: &dyn SentimentScorer,
    order: SortOrder,
    limit: usize,
) -> Vec<ScoredComment> {
    let mut scored: Vec<ScoredComment> = comments
        .into_iter()
        .filter(|c| range.contains(c.created_at))
        .map(|c| {
            let polarity_score = scorer.polarity(&c.text);
            ScoredComment {
                id: c.id,
                text: c.text,
                polarity_score,
                classification: Classification::from_score(polarity_score),
            }
        })
        .collect();

    match order {
        SortOrder::Ascending => {
            scored.sort_by(|a, b| a.polarity_score.total_cmp(&b.polarity_score))
        }
        SortOrder::Descending => {
            scored.sort_by(|a, b| b.polarity_score.total_cmp(&a.polarity_score))
        }
    }

    scored.truncate(limit);
    scored
}
