//! Prompt construction for the remote call.
//!
//! The knowledge base does the retrieval and generation; these builders wrap
//! the user's question in per-domain analyst instructions so answers cite
//! their sources and reason through multi-rule scenarios.

use crate::models::Domain;

/// Wrap a question in the domain's analyst framing.
pub fn question_prompt(domain: Domain, question: &str) -> String {
    let (role, corpus, citation_example) = match domain {
        Domain::Rulebook => (
            "an expert rules analyst with deep knowledge of the game's regulations",
            "rulebook",
            "According to Rule 12, Section II...",
        ),
        Domain::Compensation => (
            "an expert on the collective bargaining agreement and player compensation",
            "agreement",
            "Under Article VII, Section 2...",
        ),
    };

    format!(
        "You are {role}. Use the {corpus} sources provided to answer the \
         following question.\n\
         \n\
         Question: {question}\n\
         \n\
         Instructions for your answer:\n\
         1. If the answer requires combining multiple provisions, identify each \
         relevant one first, then explain how they connect logically\n\
         2. For \"what if\" or scenario questions, break down the scenario and \
         apply the relevant provisions step-by-step\n\
         3. If a direct answer isn't explicitly stated but can be logically \
         inferred, explain your reasoning process\n\
         4. Always cite specific provisions (e.g., \"{citation_example}\")\n\
         5. Be confident in logical inferences that follow from the stated text\n\
         6. Provide clear, comprehensive explanations with your reasoning\n\
         \n\
         Answer:"
    )
}

/// Ask the knowledge base to generate a short quiz.
pub fn quiz_prompt(domain: Domain, topic: Option<&str>, count: usize) -> String {
    let scope = match topic {
        Some(topic) => format!("about {}", topic),
        None => format!("covering the {}", domain.tagline()),
    };

    format!(
        "Using only the {} sources provided, write a quiz with {count} \
         multiple-choice questions {scope}. For each question give four \
         options labeled A-D, then an answer key at the end that names the \
         specific provision each answer comes from.",
        domain.display_name()
    )
}

/// Short description of a quiz request, recorded as the user turn so
/// transcripts read like a conversation rather than a prompt dump.
pub fn quiz_summary(domain: Domain, topic: Option<&str>, count: usize) -> String {
    match topic {
        Some(topic) => format!("Quiz: {} questions about {}", count, topic),
        None => format!("Quiz: {} questions on the {}", count, domain.display_name()),
    }
}

/// Answers collected by the guided scenario form.
#[derive(Debug, Clone, Default)]
pub struct ScenarioForm {
    /// What happened, in the user's words.
    pub situation: String,
    /// Who was involved (players, officials, teams).
    pub actors: String,
    /// Surrounding context (game clock, score, contract status, ...).
    pub context: String,
}

/// Assemble the form's answers into one scenario question.
pub fn scenario_prompt(domain: Domain, form: &ScenarioForm) -> String {
    let mut scenario = format!("Situation: {}", form.situation.trim());
    if !form.actors.trim().is_empty() {
        scenario.push_str(&format!("\nInvolved: {}", form.actors.trim()));
    }
    if !form.context.trim().is_empty() {
        scenario.push_str(&format!("\nContext: {}", form.context.trim()));
    }

    question_prompt(
        domain,
        &format!(
            "Walk through this scenario and explain the correct ruling or \
             outcome, step by step.\n{scenario}"
        ),
    )
}
