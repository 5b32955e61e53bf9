use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::gateway::{ExplanationGateway, QuestionGateway};
use crate::error::GameError;
use crate::models::question::ParsedQuestion;
use crate::models::video_case::VideoCase;
use crate::services::ai_service::FALLBACK_EXPLANATION;
use crate::services::catalog_service::Catalog;
use crate::services::grading_service::GradingService;
use crate::services::mcq_parser;

pub const DEFAULT_QUESTION_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Playing,
    QuizReady,
    Answered,
    Explaining,
    Explained,
}

/// User-facing marker left by the last trigger. Cleared by the next
/// successful transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    SelectionRequired,
    GenerationFailed { reason: String },
    ExplanationUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub correct: bool,
    pub selected: String,
    /// The ground-truth diagnosis, shown to the player either way.
    pub expected: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub stage: Stage,
    pub case_id: Option<String>,
    pub embed_url: Option<String>,
    pub question: Option<ParsedQuestion>,
    pub verdict: Option<Verdict>,
    pub explanation: Option<String>,
    pub notice: Option<Notice>,
    pub can_retry: bool,
}

/// One game instance. Every trigger takes `&mut self`, so a session is
/// never re-entered while a gateway call is pending.
pub struct GameSession<G> {
    catalog: Catalog,
    gateway: G,
    rng: StdRng,
    question_delay: Duration,
    response_timeout: Duration,
    stage: Stage,
    current_case: Option<VideoCase>,
    current_question: Option<ParsedQuestion>,
    raw_question: Option<String>,
    raw_explanation: Option<String>,
    verdict: Option<Verdict>,
    notice: Option<Notice>,
}

impl<G> GameSession<G>
where
    G: QuestionGateway + ExplanationGateway,
{
    pub fn new(catalog: Catalog, gateway: G) -> Self {
        Self {
            catalog,
            gateway,
            rng: StdRng::from_entropy(),
            question_delay: DEFAULT_QUESTION_DELAY,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            stage: Stage::Idle,
            current_case: None,
            current_question: None,
            raw_question: None,
            raw_explanation: None,
            verdict: None,
            notice: None,
        }
    }

    pub fn with_question_delay(mut self, delay: Duration) -> Self {
        self.question_delay = delay;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_case(&self) -> Option<&VideoCase> {
        self.current_case.as_ref()
    }

    pub fn current_question(&self) -> Option<&ParsedQuestion> {
        self.current_question.as_ref()
    }

    pub fn raw_question(&self) -> Option<&str> {
        self.raw_question.as_deref()
    }

    pub fn raw_explanation(&self) -> Option<&str> {
        self.raw_explanation.as_deref()
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// True while a failed generation can be retried with `request_question`.
    pub fn can_retry(&self) -> bool {
        matches!(
            (&self.stage, &self.notice),
            (Stage::Playing, Some(Notice::GenerationFailed { .. }))
        )
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            stage: self.stage,
            case_id: self.current_case.as_ref().map(|c| c.id.clone()),
            embed_url: self.current_case.as_ref().map(VideoCase::embed_url),
            question: self.current_question.clone(),
            verdict: self.verdict.clone(),
            explanation: self.raw_explanation.clone(),
            notice: self.notice.clone(),
            can_retry: self.can_retry(),
        }
    }

    pub fn start(&mut self) -> Result<&VideoCase, GameError> {
        self.next_case()
    }

    /// Draws a new case and moves to `Playing`. Allowed from `Idle`,
    /// `Answered` and `Explained`.
    pub fn next_case(&mut self) -> Result<&VideoCase, GameError> {
        self.ensure(&[Stage::Idle, Stage::Answered, Stage::Explained], "load the next case")?;

        self.stage = Stage::Idle;
        self.current_question = None;
        self.raw_question = None;
        self.raw_explanation = None;
        self.verdict = None;
        self.notice = None;

        let case = self.catalog.choose(&mut self.rng).clone();
        tracing::info!(case_id = %case.id, "Loaded case");
        self.stage = Stage::Playing;
        Ok(&*self.current_case.insert(case))
    }

    /// Playback has begun: wait the fixed delay, then ask for a question.
    pub async fn on_playback_started(&mut self) -> Result<(), GameError> {
        self.ensure(&[Stage::Playing], "start playback")?;
        if !self.question_delay.is_zero() {
            tokio::time::sleep(self.question_delay).await;
        }
        self.request_question().await
    }

    /// Requests a question for the current case. Gateway failures leave the
    /// stage unchanged and set a retryable `GenerationFailed` notice; only
    /// a disallowed trigger returns `Err`.
    pub async fn request_question(&mut self) -> Result<(), GameError> {
        self.ensure(&[Stage::Playing, Stage::QuizReady], "request a question")?;
        let disease = self.current_answer()?;

        let outcome = tokio::time::timeout(
            self.response_timeout,
            self.gateway.generate_question(&disease),
        )
        .await
        .unwrap_or_else(|_| {
            Err(GameError::Generation(format!(
                "no response within {:?}",
                self.response_timeout
            )))
        });

        match outcome {
            Ok(raw) => self.receive_question(raw),
            Err(e) => {
                tracing::error!(error = %e, %disease, "Question generation failed");
                self.notice = Some(Notice::GenerationFailed {
                    reason: e.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Stores a generated question. Also usable directly when the raw text
    /// arrives through another channel.
    pub fn receive_question(&mut self, raw: String) -> Result<(), GameError> {
        self.ensure(&[Stage::Playing, Stage::QuizReady], "receive a question")?;
        let parsed = mcq_parser::parse(&raw);
        if parsed.degraded {
            tracing::warn!("Question text could not be parsed, showing placeholder options");
        }
        self.current_question = Some(parsed);
        self.raw_question = Some(raw);
        self.notice = None;
        self.stage = Stage::QuizReady;
        Ok(())
    }

    /// Judges the selected option against the case's ground truth. No
    /// selection, or an index outside the options, only sets
    /// `SelectionRequired`.
    pub fn submit_answer(&mut self, selection: Option<usize>) -> Result<Option<&Verdict>, GameError> {
        self.ensure(&[Stage::QuizReady], "submit an answer")?;

        let selected = selection.and_then(|idx| {
            self.current_question
                .as_ref()
                .and_then(|q| q.options.get(idx))
                .map(|opt| opt.text.clone())
        });
        let Some(selected) = selected else {
            self.notice = Some(Notice::SelectionRequired);
            return Ok(None);
        };

        let expected = self.current_answer()?;
        let correct = GradingService::is_match(&selected, &expected);
        tracing::info!(%selected, %expected, correct, "Answer judged");

        self.notice = None;
        self.stage = Stage::Answered;
        Ok(Some(&*self.verdict.insert(Verdict {
            correct,
            selected,
            expected,
        })))
    }

    /// Asks for an explanation of the current case. A failing gateway never
    /// blocks progress: the canned explanation is stored instead.
    pub async fn request_explanation(&mut self) -> Result<&str, GameError> {
        self.ensure(&[Stage::Answered], "request an explanation")?;
        let disease = self.current_answer()?;
        let mcq = self.raw_question.clone().unwrap_or_default();
        self.stage = Stage::Explaining;

        let outcome = tokio::time::timeout(
            self.response_timeout,
            self.gateway.explain(&disease, &mcq),
        )
        .await
        .unwrap_or_else(|_| {
            Err(GameError::Explanation(format!(
                "no response within {:?}",
                self.response_timeout
            )))
        });

        match outcome {
            Ok(text) => {
                self.notice = None;
                self.receive_explanation(text)
            }
            Err(e) => {
                tracing::error!(error = %e, %disease, "Explanation failed, using canned text");
                self.notice = Some(Notice::ExplanationUnavailable);
                self.receive_explanation(FALLBACK_EXPLANATION.to_string())
            }
        }
    }

    pub fn receive_explanation(&mut self, text: String) -> Result<&str, GameError> {
        self.ensure(&[Stage::Explaining], "receive an explanation")?;
        self.stage = Stage::Explained;
        Ok(self.raw_explanation.insert(text).as_str())
    }

    fn current_answer(&self) -> Result<String, GameError> {
        self.current_case
            .as_ref()
            .map(|c| c.answer.clone())
            .ok_or(GameError::InvalidTransition {
                stage: self.stage,
                action: "play without a case",
            })
    }

    fn ensure(&self, allowed: &[Stage], action: &'static str) -> Result<(), GameError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            tracing::debug!(stage = ?self.stage, action, "Rejected trigger");
            Err(GameError::InvalidTransition {
                stage: self.stage,
                action,
            })
        }
    }
}
