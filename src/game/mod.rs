pub mod gateway;
pub mod session;

pub use gateway::{ExplanationGateway, HttpGateway, QuestionGateway};
pub use session::{GameSession, Notice, SessionView, Stage, Verdict};
