//! Data models for the sentiment service

use serde::{Deserialize, Serialize};

/// Comment as returned by the subfeddit comments API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,

    #[serde(default)]
    pub username: Option<String>,

    pub text: String,

    /// Creation time (unix seconds)
    pub created_at: i64,
}

/// Page of comments returned upstream
#[derive(Debug, Deserialize)]
pub struct CommentsPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Polarity bucket of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Negative,
}

impl Classification {
    /// Strictly positive scores are positive; zero counts as negative
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            Classification::Positive
        } else {
            Classification::Negative
        }
    }
}

/// Comment with its sentiment score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredComment {
    pub id: u64,
    pub text: String,
    pub polarity_score: f64,
    pub classification: Classification,
}

/// Order of the polarity sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// `asc` sorts ascending; anything else sorts descending
    pub fn from_param(value: &str) -> Self {
        if value == "asc" {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

fn default_limit() -> usize {
    25
}

fn default_sort() -> String {
    "asc".to_string()
}

/// Query parameters of the sentiment endpoint
#[derive(Debug, Deserialize)]
pub struct SentimentParams {
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub skip: usize,

    #[serde(default = "default_sort")]
    pub sort: String,

    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_threshold() {
        assert_eq!(Classification::from_score(0.4), Classification::Positive);
        assert_eq!(Classification::from_score(0.0), Classification::Negative);
        assert_eq!(Classification::from_score(-0.2), Classification::Negative);
    }

    #[test]
    fn test_sort_order_from_param() {
        assert_eq!(SortOrder::from_param("asc"), SortOrder::Ascending);
        assert_eq!(SortOrder::from_param("desc"), SortOrder::Descending);
        assert_eq!(SortOrder::from_param("ASC"), SortOrder::Descending);
    }

    #[test]
    fn test_comments_page_tolerates_missing_fields() {
        let page: CommentsPage = serde_json::from_str(
            r#"{"subfeddit_id": 1, "comments": [{"id": 7, "text": "hi", "created_at": 1700000000}]}"#,
        )
        .unwrap();
        assert_eq!(page.comments.len(), 1);
        assert!(page.comments[0].username.is_none());

        let empty: CommentsPage = serde_json::from_str("{}").unwrap();
        assert!(empty.comments.is_empty());
    }

    #[test]
    fn test_scored_comment_serialization() {
        let scored = ScoredComment {
            id: 1,
            text: "great".to_string(),
            polarity_score: 0.6249,
            classification: Classification::Positive,
        };

        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["classification"], "positive");
        assert_eq!(json["polarity_score"], 0.6249);
    }
}
