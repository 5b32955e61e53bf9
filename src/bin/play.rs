use anyhow::Context;
use diagnosis_trivia::{
    config::{CatalogSource, ClientConfig},
    game::{ExplanationGateway, GameSession, HttpGateway, Notice, QuestionGateway, Stage},
    models::question::ParsedQuestion,
    services::{ai_service::AIService, catalog_service::Catalog},
};
use reqwest::Client;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = Client::builder()
        .timeout(config.gateway_timeout)
        .build()
        .context("building HTTP client")?;

    let catalog = match &config.catalog {
        CatalogSource::File(path) => Catalog::load_file(path).await,
        CatalogSource::Url(url) => Catalog::load_url(&client, url).await,
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load videos");
            eprintln!("Error loading cases. Please restart.");
            return Err(e.into());
        }
    };

    let input = BufReader::new(stdin()).lines();

    match (&config.gateway_url, &config.gemini_api_key) {
        (Some(url), _) => {
            let gateway = HttpGateway::with_client(url.clone(), client);
            run(session(catalog, gateway, &config), input).await
        }
        (None, Some(key)) => {
            let gateway = AIService::new(key.clone(), client)
                .with_base_url(config.gemini_base_url.clone())
                .with_model(config.gemini_model.clone())
                .with_timeout(config.gateway_timeout);
            run(session(catalog, gateway, &config), input).await
        }
        (None, None) => anyhow::bail!("set GATEWAY_URL or GEMINI_KEY"),
    }
}

fn session<G>(catalog: Catalog, gateway: G, config: &ClientConfig) -> GameSession<G>
where
    G: QuestionGateway + ExplanationGateway,
{
    GameSession::new(catalog, gateway)
        .with_question_delay(config.question_delay)
        .with_response_timeout(config.gateway_timeout)
}

async fn prompt(input: &mut Input, text: &str) -> anyhow::Result<Option<String>> {
    println!("{}", text);
    Ok(input.next_line().await?.map(|l| l.trim().to_string()))
}

async fn run<G>(mut session: GameSession<G>, mut input: Input) -> anyhow::Result<()>
where
    G: QuestionGateway + ExplanationGateway,
{
    session.start()?;

    loop {
        match session.stage() {
            Stage::Idle => {
                session.next_case()?;
            }
            Stage::Playing => {
                if session.can_retry() {
                    println!("Failed to generate question.");
                    match prompt(&mut input, "[r]etry or [q]uit").await?.as_deref() {
                        Some("r") => session.request_question().await?,
                        Some("q") | None => break,
                        _ => {}
                    }
                    continue;
                }

                let url = session
                    .current_case()
                    .map(|c| c.embed_url())
                    .unwrap_or_default();
                println!("\nNew case. Watch the video: {}", url);
                match prompt(&mut input, "Press Enter once playback starts ([q]uit)").await?.as_deref() {
                    Some("q") | None => break,
                    _ => {}
                }
                println!("AI is generating your question...");
                session.on_playback_started().await?;
            }
            Stage::QuizReady => {
                if let Some(question) = session.current_question() {
                    print_question(question);
                }
                if matches!(session.notice(), Some(Notice::SelectionRequired)) {
                    println!("Please select an answer!");
                }
                let Some(line) = prompt(&mut input, "Your answer (letter):").await? else {
                    break;
                };
                let selection = line
                    .chars()
                    .next()
                    .and_then(|c| session.current_question().and_then(|q| q.index_of_label(c)));
                session.submit_answer(selection)?;
            }
            Stage::Answered | Stage::Explained => {
                if session.stage() == Stage::Answered {
                    if let Some(verdict) = session.verdict() {
                        if verdict.correct {
                            println!("Correct diagnosis! {} is the right answer.", verdict.expected);
                        } else {
                            println!("Not quite right. The correct diagnosis is: {}", verdict.expected);
                        }
                    }
                }
                let choices = if session.stage() == Stage::Answered {
                    "[e]xplain, [n]ext case or [q]uit"
                } else {
                    "[n]ext case or [q]uit"
                };
                match prompt(&mut input, choices).await?.as_deref() {
                    Some("e") if session.stage() == Stage::Answered => {
                        println!("AI is explaining the diagnosis...");
                        let explanation = session.request_explanation().await?.to_string();
                        if matches!(session.notice(), Some(Notice::ExplanationUnavailable)) {
                            println!("Could not load the explanation.");
                        }
                        println!("\nClinical explanation:\n{}\n", explanation);
                    }
                    Some("n") => {
                        session.next_case()?;
                    }
                    Some("q") | None => break,
                    _ => {}
                }
            }
            Stage::Explaining => break,
        }
    }

    Ok(())
}

fn print_question(question: &ParsedQuestion) {
    println!("\n{}", question.prompt);
    for (label, option) in question.labeled() {
        println!("  {}) {}", label, option.text);
    }
}
