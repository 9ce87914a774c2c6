//! Plain-text rendering for the terminal conversation surface.

use crate::kb::KbError;
use crate::models::{AnnotatedCitation, Conversation, Domain};

/// Excerpt length shown for each citation before truncation.
const PREVIEW_CHARS: usize = 200;

/// Welcome screen shown when a conversation starts or switches domain.
pub fn welcome(domain: Domain) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", domain.display_name()));
    out.push_str(&format!("Ask me anything about {}.\n", domain.tagline()));
    out.push_str("\nExample questions:\n");
    for prompt in domain.example_prompts() {
        out.push_str(&format!("  - {}\n", prompt));
    }
    out.push_str("\nCommands: /switch /clear /export <path> /stats /help /quit\n");
    out
}

/// Render the sources block under an answer.
///
/// Each citation shows its location badge, source name, relevance when the
/// service reported one, and the first 200 characters of the passage.
pub fn citations(citations: &[AnnotatedCitation]) -> String {
    if citations.is_empty() {
        return String::new();
    }

    let mut out = String::from("\nSources:\n");
    for citation in citations {
        out.push_str("  ");
        if let Some(label) = &citation.location_label {
            out.push_str(&format!("[{}] ", label));
        }
        out.push_str(citation.source.label());
        if let Some(score) = citation.reference.score {
            out.push_str(&format!("  (relevance {:.1}%)", score * 100.0));
        }
        out.push('\n');
        out.push_str(&format!("    {}\n", preview(&citation.reference.text)));
    }
    out
}

/// Hint line shown when an answer strays into the other domain.
pub fn cross_domain_hint(hint: Domain) -> String {
    format!(
        "\nNote: this topic also touches the {}. Try /switch to ask there.\n",
        hint.display_name()
    )
}

/// Session stats for the `/stats` command.
pub fn stats(conversation: &Conversation) -> String {
    format!(
        "Domain: {}\nQuestions asked: {}\nSession: {}\n",
        conversation.domain.display_name(),
        conversation.question_count(),
        match &conversation.session_id {
            Some(id) => id.as_str(),
            None => "not started",
        }
    )
}

pub fn help() -> String {
    "Commands:\n\
     \x20 /switch         switch between the rulebook and the CBA\n\
     \x20 /clear          start the conversation over\n\
     \x20 /export <path>  save the transcript to a file\n\
     \x20 /stats          show session statistics\n\
     \x20 /help           show this help\n\
     \x20 /quit           leave\n"
        .to_string()
}

/// Inline message shown in place of an answer when the remote call fails.
///
/// Every failure degrades to a message; the loop keeps running.
pub fn inline_error(error: &KbError) -> String {
    match error {
        KbError::AccessDenied(message) => format!(
            "Access denied by the knowledge base service: {}\n\
             Check that your credentials allow bedrock:RetrieveAndGenerate.",
            message
        ),
        KbError::NotFound(message) => format!(
            "Knowledge base not found: {}\n\
             Verify the knowledge base id and region in your config.",
            message
        ),
        KbError::StaleSession => {
            "The conversation session expired and could not be renewed. \
             Use /clear and ask again."
                .to_string()
        }
        KbError::Throttled(message) => {
            format!("The service is throttling requests: {}", message)
        }
        KbError::Api { code, message } => {
            format!("Service error ({}): {}", code, message)
        }
        other => format!("Error querying the knowledge base: {}", other),
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let excerpt: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", excerpt)
    } else {
        excerpt
    }
}
