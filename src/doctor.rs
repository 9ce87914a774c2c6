//! Connectivity self-check.
//!
//! Runs the same checks a first-time user needs before chatting: credentials
//! configured, then a probe question against each domain's knowledge base.
//! Prints a pass/fail summary; the caller turns the result into an exit code.

use crate::config::Config;
use crate::kb::{KbClient, KbError};
use crate::models::Domain;

const PROBE_QUESTION: &str = "test";

/// Outcome of one named check.
#[derive(Debug)]
struct Check {
    name: &'static str,
    passed: bool,
}

/// Run all checks. Returns `true` when everything passed.
pub async fn run(config: &Config) -> bool {
    println!("Courtside connectivity check");
    println!("============================");

    let mut checks = Vec::new();

    println!("\nChecking credentials...");
    let client = match config.credentials() {
        Ok(credentials) => {
            println!("  ok: credentials configured (region {})", credentials.region);
            checks.push(Check {
                name: "Credentials",
                passed: true,
            });
            Some(KbClient::new(credentials.clone()))
        }
        Err(error) => {
            println!("  failed: {}", error);
            checks.push(Check {
                name: "Credentials",
                passed: false,
            });
            None
        }
    };

    if let Some(client) = &client {
        for domain in [Domain::Rulebook, Domain::Compensation] {
            let name = match domain {
                Domain::Rulebook => "Rulebook knowledge base",
                Domain::Compensation => "CBA knowledge base",
            };
            let passed = probe(client, config, domain).await;
            checks.push(Check { name, passed });
        }
    }

    println!("\nSummary");
    println!("-------");
    let mut all_passed = true;
    for check in &checks {
        let status = if check.passed { "pass" } else { "FAIL" };
        println!("  {:<26} {}", check.name, status);
        all_passed &= check.passed;
    }

    if all_passed {
        println!("\nAll checks passed. You're ready to chat.");
    } else {
        println!("\nSome checks failed; fix the issues above and rerun.");
    }

    all_passed
}

/// Probe one domain's knowledge base with a throwaway question.
async fn probe(client: &KbClient, config: &Config, domain: Domain) -> bool {
    let kb_id = config.knowledge_base_id(domain);
    println!(
        "\nChecking {} ({})...",
        domain.display_name(),
        kb_id
    );

    match client
        .retrieve_and_generate(PROBE_QUESTION, kb_id, config.model_id(domain), None)
        .await
    {
        Ok(_) => {
            println!("  ok: knowledge base answered");
            true
        }
        Err(error) => {
            println!("  failed ({}): {}", error.kind(), error);
            print_hint(&error, kb_id, client.region());
            false
        }
    }
}

fn print_hint(error: &KbError, kb_id: &str, region: &str) {
    match error {
        KbError::AccessDenied(_) => {
            println!("  hint: check IAM permissions for bedrock:RetrieveAndGenerate");
        }
        KbError::NotFound(_) => {
            println!(
                "  hint: verify knowledge base id '{}' exists in region '{}'",
                kb_id, region
            );
        }
        KbError::Http(_) => {
            println!("  hint: check your network connection and the configured region");
        }
        _ => {}
    }
}
