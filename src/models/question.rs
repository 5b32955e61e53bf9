use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    pub prompt: String,
    pub options: Vec<QuizOption>,
    /// Set when the options are placeholders because the source text
    /// could not be interpreted.
    #[serde(default)]
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    pub is_correct: bool,
}

impl QuizOption {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

impl ParsedQuestion {
    /// Display label for the option at `index`: A, B, C, ...
    pub fn label(index: usize) -> char {
        (b'A' + (index % 26) as u8) as char
    }

    pub fn labeled(&self) -> impl Iterator<Item = (char, &QuizOption)> {
        self.options
            .iter()
            .enumerate()
            .map(|(idx, opt)| (Self::label(idx), opt))
    }

    pub fn correct_option(&self) -> Option<(usize, &QuizOption)> {
        self.options.iter().enumerate().find(|(_, opt)| opt.is_correct)
    }

    /// Maps a typed letter (case-insensitive) back to an option index.
    pub fn index_of_label(&self, label: char) -> Option<usize> {
        let upper = label.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        let idx = (upper as u8 - b'A') as usize;
        (idx < self.options.len()).then_some(idx)
    }
}
