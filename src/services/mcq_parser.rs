use std::sync::OnceLock;

use regex::Regex;

use crate::models::question::{ParsedQuestion, QuizOption};

pub const DEFAULT_PROMPT: &str = "What is the most likely diagnosis?";
pub const PLACEHOLDER_OPTIONS: [&str; 4] = ["Option A", "Option B", "Option C", "Option D"];

const MAX_OPTIONS: usize = 4;
const MIN_OPTIONS: usize = 2;
const CORRECT_MARKER: char = '*';

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]\n]*\]").expect("valid placeholder regex"))
}

fn option_letter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Da-d]\)\s*").expect("valid option letter regex"))
}

/// Turns the free text returned by the question gateway into a question
/// with options. Never fails: text that cannot be interpreted yields the
/// default prompt and/or placeholder options.
pub fn parse(raw: &str) -> ParsedQuestion {
    let cleaned = raw.replace("**", "");
    let cleaned = placeholder_re().replace_all(&cleaned, "");

    let mut lines = cleaned
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("Answer:"));

    let prompt = lines
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

    let mut options: Vec<QuizOption> = lines
        .filter_map(parse_option_line)
        .take(MAX_OPTIONS)
        .collect();

    if options.len() < MIN_OPTIONS {
        tracing::debug!(usable = options.len(), "question text had too few options, using placeholders");
        return ParsedQuestion {
            prompt,
            options: PLACEHOLDER_OPTIONS
                .iter()
                .map(|text| QuizOption::new(*text, false))
                .collect(),
            degraded: true,
        };
    }

    let marked = options.iter().filter(|opt| opt.is_correct).count();
    if marked > 1 {
        tracing::warn!(marked, "several options marked correct, keeping the first");
        let mut seen = false;
        for opt in options.iter_mut() {
            if opt.is_correct && seen {
                opt.is_correct = false;
            }
            seen |= opt.is_correct;
        }
    } else if marked == 0 {
        tracing::debug!("no option marked correct");
    }

    ParsedQuestion {
        prompt,
        options,
        degraded: false,
    }
}

fn parse_option_line(line: &str) -> Option<QuizOption> {
    let text = option_letter_re().replace(line, "");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let is_correct = text.contains(CORRECT_MARKER);
    let display = if is_correct {
        text.replacen(CORRECT_MARKER, "", 1).trim().to_string()
    } else {
        text.to_string()
    };

    if display.is_empty() {
        return None;
    }
    Some(QuizOption::new(display, is_correct))
}
