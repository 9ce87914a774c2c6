//! The interactive conversation surface and its one-shot variants.
//!
//! Execution is strictly request-per-interaction: one user action triggers at
//! most one remote call, awaited before anything renders. Remote failures
//! never end the loop — they degrade to an inline message and the next
//! question is read as usual.

pub mod prompts;
pub mod render;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::config::Config;
use crate::kb::{KbAnswer, KbClient};
use crate::models::{normalize, related_domain, Conversation, Domain};

use prompts::ScenarioForm;

/// Run the interactive chat loop until `/quit` or end of input.
pub async fn run(config: &Config, domain: Domain) -> anyhow::Result<()> {
    let client = match make_client(config) {
        Some(client) => client,
        None => return Ok(()),
    };

    let mut conversation = Conversation::new(domain);
    print!("{}", render::welcome(domain));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt_marker()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !handle_command(command, &mut conversation)? {
                break;
            }
            continue;
        }

        let prompt = prompts::question_prompt(conversation.domain, &line);
        exchange(&client, config, &mut conversation, line, &prompt).await;
    }

    Ok(())
}

/// Ask a single question and print the answer; no conversation state kept.
pub async fn ask_once(config: &Config, domain: Domain, question: &str) -> anyhow::Result<()> {
    let client = match make_client(config) {
        Some(client) => client,
        None => return Ok(()),
    };

    let mut conversation = Conversation::new(domain);
    let prompt = prompts::question_prompt(domain, question);
    exchange(&client, config, &mut conversation, question.to_string(), &prompt).await;
    Ok(())
}

/// Generate a quiz from the domain's corpus and print it.
pub async fn quiz(
    config: &Config,
    domain: Domain,
    topic: Option<&str>,
    count: usize,
) -> anyhow::Result<()> {
    let client = match make_client(config) {
        Some(client) => client,
        None => return Ok(()),
    };

    let prompt = prompts::quiz_prompt(domain, topic, count);
    let summary = prompts::quiz_summary(domain, topic, count);
    let mut conversation = Conversation::new(domain);
    exchange(&client, config, &mut conversation, summary, &prompt).await;
    Ok(())
}

/// Guided scenario form: collect the pieces of a scenario interactively,
/// then ask for a step-by-step ruling.
pub async fn scenario(config: &Config, domain: Domain) -> anyhow::Result<()> {
    let client = match make_client(config) {
        Some(client) => client,
        None => return Ok(()),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Describe the scenario; leave a line empty to skip it.");

    let form = ScenarioForm {
        situation: ask_field(&mut lines, "What happened?").await?,
        actors: ask_field(&mut lines, "Who was involved?").await?,
        context: ask_field(&mut lines, "Any surrounding context (clock, score, contract status)?")
            .await?,
    };

    if form.situation.trim().is_empty() {
        println!("No scenario described; nothing to ask.");
        return Ok(());
    }

    let prompt = prompts::scenario_prompt(domain, &form);
    let mut conversation = Conversation::new(domain);
    exchange(&client, config, &mut conversation, form.situation.clone(), &prompt).await;
    Ok(())
}

/// One question/answer round: call the service, render, record the turns.
///
/// This is the only place an answer enters the conversation, so the citation
/// normalization and cross-domain detection both happen here, on every
/// successful response.
async fn exchange(
    client: &KbClient,
    config: &Config,
    conversation: &mut Conversation,
    user_text: String,
    prompt: &str,
) {
    let domain = conversation.domain;
    conversation.push_user(user_text);

    let result = client
        .ask(
            prompt,
            config.knowledge_base_id(domain),
            config.model_id(domain),
            conversation.session_id.as_deref(),
        )
        .await;

    match result {
        Ok(KbAnswer {
            text,
            references,
            session_id,
        }) => {
            conversation.session_id = session_id;
            let citations = normalize(references);
            let hint = related_domain(&text, domain);

            println!("\n{}", text);
            print!("{}", render::citations(&citations));
            if let Some(hint) = hint {
                print!("{}", render::cross_domain_hint(hint));
            }

            conversation.push_assistant(text, citations, hint);
        }
        Err(error) => {
            tracing::debug!(%error, "knowledge base call failed");
            let message = render::inline_error(&error);
            println!("\n{}", message);
            conversation.push_assistant(message, Vec::new(), None);
        }
    }
}

/// Dispatch a `/command`. Returns `false` when the loop should stop.
fn handle_command(command: &str, conversation: &mut Conversation) -> anyhow::Result<bool> {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("exit") => return Ok(false),
        Some("help") => print!("{}", render::help()),
        Some("stats") => print!("{}", render::stats(conversation)),
        Some("clear") => {
            conversation.clear();
            println!("Conversation cleared.");
        }
        Some("switch") => {
            let next = conversation.domain.other();
            conversation.switch_to(next);
            print!("{}", render::welcome(next));
        }
        Some("export") => match parts.next() {
            Some(path) => match std::fs::write(path, conversation.transcript()) {
                Ok(()) => println!("Transcript written to {}", path),
                Err(error) => println!("Could not write {}: {}", path, error),
            },
            None => println!("Usage: /export <path>"),
        },
        _ => println!("Unknown command. {}", render::help()),
    }
    Ok(true)
}

/// Build the client, or explain why we can't. A missing credential is a
/// message, not a crash.
fn make_client(config: &Config) -> Option<KbClient> {
    match config.credentials() {
        Ok(credentials) => Some(KbClient::new(credentials.clone())),
        Err(error) => {
            eprintln!("{}", error);
            None
        }
    }
}

async fn ask_field(
    lines: &mut Lines<BufReader<Stdin>>,
    question: &str,
) -> anyhow::Result<String> {
    println!("{}", question);
    prompt_marker()?;
    Ok(lines.next_line().await?.unwrap_or_default())
}

fn prompt_marker() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}
