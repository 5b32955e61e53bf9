use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::not_blank;

const EMBED_BASE_URL: &str = "https://www.youtube-nocookie.com/embed";

/// One catalog entry: the video to show and the diagnosis it depicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VideoCase {
    #[validate(custom(function = "not_blank"))]
    pub id: String,
    #[validate(custom(function = "not_blank"))]
    pub answer: String,
}

impl VideoCase {
    pub fn new(id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            answer: answer.into(),
        }
    }

    /// Privacy-enhanced player URL with related videos and annotations off.
    pub fn embed_url(&self) -> String {
        format!(
            "{}/{}?rel=0&controls=1&modestbranding=1&iv_load_policy=3&autoplay=1",
            EMBED_BASE_URL, self.id
        )
    }
}
