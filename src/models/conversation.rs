use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::citation::AnnotatedCitation;
use super::domain::Domain;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Label used in transcripts and on screen.
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One exchange entry: a question or an answer, with the answer's citations
/// and an optional hint that it strayed into the other domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub citations: Vec<AnnotatedCitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_domain_hint: Option<Domain>,
}

/// The session context for one conversation.
///
/// Owned exclusively by the interaction loop — created at conversation start,
/// reset on clear, replaced wholesale on domain switch. The remote session id
/// is kept here so follow-up questions stay conversational; it is dropped
/// together with the turns, since it is only meaningful against the domain's
/// knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub domain: Domain,
    /// Session id returned by the remote service, reused on the next call.
    pub session_id: Option<String>,
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            session_id: None,
            turns: Vec::new(),
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
            citations: Vec::new(),
            cross_domain_hint: None,
        });
    }

    pub fn push_assistant(
        &mut self,
        text: impl Into<String>,
        citations: Vec<AnnotatedCitation>,
        cross_domain_hint: Option<Domain>,
    ) {
        self.turns.push(ConversationTurn {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
            citations,
            cross_domain_hint,
        });
    }

    /// Questions asked so far (user turns only).
    pub fn question_count(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::User).count()
    }

    /// Drop all turns and the remote session id; the domain stays.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.session_id = None;
    }

    /// Switch to another domain, clearing turns and session id.
    pub fn switch_to(&mut self, domain: Domain) {
        self.clear();
        self.domain = domain;
    }

    /// Render the conversation as a plain-text transcript, oldest turn first.
    ///
    /// Each turn gets a role label, a timestamp, and its message text.
    /// Assistant turns with citations are followed by a flat list of their
    /// distinct source locators.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Transcript — {}\n", self.domain.display_name()));

        for turn in &self.turns {
            out.push('\n');
            out.push_str(&format!(
                "[{}] {}:\n",
                turn.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                turn.role.label()
            ));
            out.push_str(&turn.text);
            out.push('\n');

            if turn.role == Role::Assistant && !turn.citations.is_empty() {
                out.push_str("Sources:\n");
                let mut seen = Vec::new();
                for citation in &turn.citations {
                    let locator = citation.reference.locator.as_str();
                    if locator.is_empty() || seen.contains(&locator) {
                        continue;
                    }
                    seen.push(locator);
                    out.push_str(&format!("  - {}\n", locator));
                }
            }
        }

        out
    }
}
