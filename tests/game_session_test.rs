use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use diagnosis_trivia::error::GameError;
use diagnosis_trivia::game::{
    ExplanationGateway, GameSession, Notice, QuestionGateway, Stage,
};
use diagnosis_trivia::models::video_case::VideoCase;
use diagnosis_trivia::services::ai_service::FALLBACK_EXPLANATION;
use diagnosis_trivia::services::catalog_service::Catalog;
use tokio_test::{assert_err, assert_ok};

const CARDINAL_MCQ: &str =
    "What is a cardinal symptom?\nA) Tremor\nB) Resting tremor*\nC) Rigidity\nD) Bradykinesia";

#[derive(Clone)]
struct FakeGateway {
    question: Result<String, GameError>,
    explanation: Result<String, GameError>,
    delay: Duration,
    scripted_questions: Arc<Mutex<VecDeque<Result<String, GameError>>>>,
    explain_calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeGateway {
    fn ok(question: &str, explanation: &str) -> Self {
        Self {
            question: Ok(question.to_string()),
            explanation: Ok(explanation.to_string()),
            delay: Duration::ZERO,
            scripted_questions: Arc::new(Mutex::new(VecDeque::new())),
            explain_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing() -> Self {
        Self {
            question: Err(GameError::Generation("network error".to_string())),
            explanation: Err(GameError::Explanation("network error".to_string())),
            ..Self::ok("", "")
        }
    }

    /// Answers question requests with `results` in order, then with `question`.
    fn scripted(results: Vec<Result<String, GameError>>) -> Self {
        let gateway = Self::ok(CARDINAL_MCQ, "");
        gateway.scripted_questions.lock().unwrap().extend(results);
        gateway
    }
}

impl QuestionGateway for FakeGateway {
    async fn generate_question(&self, _disease: &str) -> Result<String, GameError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scripted = self.scripted_questions.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.question.clone())
    }
}

impl ExplanationGateway for FakeGateway {
    async fn explain(&self, disease: &str, mcq: &str) -> Result<String, GameError> {
        self.explain_calls
            .lock()
            .unwrap()
            .push((disease.to_string(), mcq.to_string()));
        self.explanation.clone()
    }
}

fn parkinson_catalog() -> Catalog {
    Catalog::new(vec![VideoCase::new("abc123", "Parkinson's Disease")]).unwrap()
}

fn session(gateway: FakeGateway) -> GameSession<FakeGateway> {
    GameSession::new(parkinson_catalog(), gateway).with_question_delay(Duration::ZERO)
}

#[test]
fn starts_idle() {
    let s = session(FakeGateway::ok(CARDINAL_MCQ, "because"));
    assert_eq!(s.stage(), Stage::Idle);
    assert!(s.current_case().is_none());
    assert!(s.current_question().is_none());
}

#[test]
fn start_draws_a_case_from_the_catalog() {
    let catalog = Catalog::from_json(
        r#"[{"id":"a","answer":"Flu"},{"id":"b","answer":"Stroke"},{"id":"c","answer":"Gout"}]"#,
    )
    .unwrap();
    for _ in 0..20 {
        let mut s = GameSession::new(catalog.clone(), FakeGateway::ok(CARDINAL_MCQ, ""));
        let id = assert_ok!(s.start()).id.clone();
        assert_eq!(s.stage(), Stage::Playing);
        assert!(s.catalog().contains_id(&id));
    }
}

#[tokio::test]
async fn wrong_answer_end_to_end() {
    let mut s = session(FakeGateway::ok(CARDINAL_MCQ, "Resting tremor is typical."));
    s.start().unwrap();
    assert_ok!(s.on_playback_started().await);

    assert_eq!(s.stage(), Stage::QuizReady);
    let q = s.current_question().expect("question");
    assert_eq!(q.options.len(), 4);
    assert!(q.options[1].is_correct);
    assert_eq!(q.options[1].text, "Resting tremor");

    let verdict = s.submit_answer(Some(2)).unwrap().cloned().expect("verdict");
    assert_eq!(verdict.selected, "Rigidity");
    assert!(!verdict.correct);
    assert_eq!(verdict.expected, "Parkinson's Disease");
    assert_eq!(s.stage(), Stage::Answered);
}

#[tokio::test]
async fn correct_answer_uses_ground_truth_not_marker() {
    let mcq = "Most likely diagnosis?\nA) Essential tremor*\nB) Parkinson disease\nC) Parkinson's";
    let mut s = session(FakeGateway::ok(mcq, ""));
    s.start().unwrap();
    s.on_playback_started().await.unwrap();

    let verdict = s.submit_answer(Some(2)).unwrap().cloned().unwrap();
    assert!(verdict.correct);
}

#[tokio::test]
async fn submit_without_selection_warns_and_stays() {
    let mut s = session(FakeGateway::ok(CARDINAL_MCQ, ""));
    s.start().unwrap();
    s.on_playback_started().await.unwrap();

    assert!(s.submit_answer(None).unwrap().is_none());
    assert_eq!(s.stage(), Stage::QuizReady);
    assert_eq!(s.notice(), Some(&Notice::SelectionRequired));

    assert!(s.submit_answer(Some(9)).unwrap().is_none());
    assert_eq!(s.stage(), Stage::QuizReady);

    s.submit_answer(Some(0)).unwrap();
    assert_eq!(s.stage(), Stage::Answered);
    assert!(s.notice().is_none());
}

#[tokio::test]
async fn generation_failure_keeps_playing_and_allows_retry() {
    let mut s = session(FakeGateway::failing());
    s.start().unwrap();
    assert_ok!(s.on_playback_started().await);

    assert_eq!(s.stage(), Stage::Playing);
    assert!(s.current_question().is_none());
    assert!(s.can_retry());
    assert!(matches!(s.notice(), Some(Notice::GenerationFailed { .. })));
    assert!(s.view().can_retry);

    assert_ok!(s.request_question().await);
    assert_eq!(s.stage(), Stage::Playing);
}

#[tokio::test]
async fn slow_generation_times_out_as_retryable_failure() {
    let mut gateway = FakeGateway::ok(CARDINAL_MCQ, "");
    gateway.delay = Duration::from_secs(5);
    let mut s = session(gateway).with_response_timeout(Duration::from_millis(50));
    s.start().unwrap();
    s.on_playback_started().await.unwrap();

    assert_eq!(s.stage(), Stage::Playing);
    assert!(s.can_retry());
}

#[tokio::test]
async fn retry_after_failure_reaches_quiz() {
    let mut s = session(FakeGateway::scripted(vec![
        Err(GameError::Generation("network error".to_string())),
        Ok(CARDINAL_MCQ.to_string()),
    ]));
    s.start().unwrap();
    s.on_playback_started().await.unwrap();
    assert_eq!(s.stage(), Stage::Playing);
    assert!(s.can_retry());

    assert_ok!(s.request_question().await);
    assert_eq!(s.stage(), Stage::QuizReady);
    assert!(!s.can_retry());
    assert!(s.notice().is_none());
    assert_eq!(s.current_question().map(|q| q.options.len()), Some(4));
    assert_eq!(s.raw_question(), Some(CARDINAL_MCQ));
}

#[tokio::test]
async fn question_arriving_after_failure_clears_notice() {
    let mut s = session(FakeGateway::failing());
    s.start().unwrap();
    s.on_playback_started().await.unwrap();
    assert!(s.can_retry());

    s.receive_question(CARDINAL_MCQ.to_string()).unwrap();
    assert_eq!(s.stage(), Stage::QuizReady);
    assert!(!s.can_retry());
    assert!(s.notice().is_none());
}

#[tokio::test]
async fn explanation_uses_ground_truth_and_raw_question() {
    let gateway = FakeGateway::ok(CARDINAL_MCQ, "Resting tremor is the hallmark.");
    let calls = gateway.explain_calls.clone();
    let mut s = session(gateway);
    s.start().unwrap();
    s.on_playback_started().await.unwrap();
    s.submit_answer(Some(1)).unwrap();

    let text = s.request_explanation().await.unwrap().to_string();
    assert_eq!(text, "Resting tremor is the hallmark.");
    assert_eq!(s.stage(), Stage::Explained);
    assert_eq!(s.raw_explanation(), Some("Resting tremor is the hallmark."));

    let calls = calls.lock().unwrap();
    assert_eq!(
        calls.as_slice(),
        &[("Parkinson's Disease".to_string(), CARDINAL_MCQ.to_string())]
    );
}

#[tokio::test]
async fn explanation_failure_falls_back_to_canned_text() {
    let mut gateway = FakeGateway::ok(CARDINAL_MCQ, "");
    gateway.explanation = Err(GameError::Explanation("status 500".to_string()));
    let mut s = session(gateway);
    s.start().unwrap();
    s.on_playback_started().await.unwrap();
    s.submit_answer(Some(0)).unwrap();

    assert_ok!(s.request_explanation().await);
    assert_eq!(s.stage(), Stage::Explained);
    assert_eq!(s.raw_explanation(), Some(FALLBACK_EXPLANATION));
    assert_eq!(s.notice(), Some(&Notice::ExplanationUnavailable));

    assert_ok!(s.next_case());
    assert_eq!(s.stage(), Stage::Playing);
}

#[tokio::test]
async fn next_case_clears_round_state_from_answered_and_explained() {
    let mut s = session(FakeGateway::ok(CARDINAL_MCQ, "why"));
    s.start().unwrap();
    s.on_playback_started().await.unwrap();
    s.submit_answer(Some(0)).unwrap();

    s.next_case().unwrap();
    assert_eq!(s.stage(), Stage::Playing);
    assert!(s.current_question().is_none());
    assert!(s.raw_explanation().is_none());
    assert!(s.verdict().is_none());
    assert_eq!(s.current_case().map(|c| c.id.as_str()), Some("abc123"));

    s.on_playback_started().await.unwrap();
    s.submit_answer(Some(0)).unwrap();
    s.request_explanation().await.unwrap();
    assert_eq!(s.stage(), Stage::Explained);

    s.next_case().unwrap();
    assert_eq!(s.stage(), Stage::Playing);
    assert!(s.current_question().is_none());
    assert!(s.raw_explanation().is_none());
    assert!(s.raw_question().is_none());
}

#[tokio::test]
async fn disallowed_triggers_are_rejected_without_side_effects() {
    let mut s = session(FakeGateway::ok(CARDINAL_MCQ, ""));

    assert_err!(s.submit_answer(Some(0)));
    assert_err!(s.request_explanation().await);
    assert_err!(s.on_playback_started().await);
    assert_eq!(s.stage(), Stage::Idle);

    s.start().unwrap();
    let err = s.next_case().unwrap_err();
    assert_eq!(
        err,
        GameError::InvalidTransition {
            stage: Stage::Playing,
            action: "load the next case"
        }
    );
    assert_err!(s.request_explanation().await);
    assert_eq!(s.stage(), Stage::Playing);
}

#[tokio::test]
async fn view_reflects_session() {
    let mut s = session(FakeGateway::ok(CARDINAL_MCQ, ""));
    s.start().unwrap();
    s.on_playback_started().await.unwrap();

    let view = s.view();
    assert_eq!(view.stage, Stage::QuizReady);
    assert_eq!(view.case_id.as_deref(), Some("abc123"));
    assert!(view.embed_url.unwrap().contains("abc123"));

    let json = serde_json::to_value(s.view()).unwrap();
    assert_eq!(json["stage"], "quiz_ready");
    assert_eq!(json["question"]["options"][1]["is_correct"], true);
}
