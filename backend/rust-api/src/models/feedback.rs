use serde::{Deserialize, Serialize};
use validator::Validate;

/// Rubric scores assigned by the speech coach, each on a 0-5 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Rubric {
    #[validate(range(min = 0, max = 5))]
    pub fluency: u8,
    #[validate(range(min = 0, max = 5))]
    pub pronunciation: u8,
    #[validate(range(min = 0, max = 5))]
    pub grammar: u8,
    #[validate(range(min = 0, max = 5))]
    pub vocabulary: u8,
}

impl Rubric {
    pub fn uniform(score: u8) -> Self {
        Self {
            fluency: score,
            pronunciation: score,
            grammar: score,
            vocabulary: score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub issue: String,
    pub suggestion: String,
    pub example: String,
}

/// Full result of one drill review, whether produced by the coach backend
/// or by a deterministic fallback. Callers cannot tell the paths apart from
/// the shape alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FeedbackResponse {
    pub transcript: String,
    #[validate(nested)]
    pub rubric: Rubric,
    #[validate(range(min = 0, max = 100))]
    pub overall_score: u8,
    pub corrections: Vec<Correction>,
    pub next_prompt: String,
    pub encouragement: String,
}
