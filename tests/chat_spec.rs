//! Prompt builder and inline-error rendering tests.

use courtside::chat::prompts::{
    quiz_prompt, quiz_summary, question_prompt, scenario_prompt, ScenarioForm,
};
use courtside::chat::render;
use courtside::kb::KbError;
use courtside::models::Domain;

mod question_prompts {
    use super::*;

    #[test]
    fn wraps_the_question_in_analyst_instructions() {
        let prompt = question_prompt(Domain::Rulebook, "What is goaltending?");

        assert!(prompt.contains("Question: What is goaltending?"));
        assert!(prompt.contains("expert rules analyst"));
        assert!(prompt.contains("According to Rule 12, Section II..."));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn compensation_prompts_cite_articles_not_rules() {
        let prompt = question_prompt(Domain::Compensation, "What is the tax apron?");

        assert!(prompt.contains("collective bargaining agreement"));
        assert!(prompt.contains("Under Article VII, Section 2..."));
    }
}

mod quiz_prompts {
    use super::*;

    #[test]
    fn names_the_question_count_and_topic() {
        let prompt = quiz_prompt(Domain::Rulebook, Some("traveling"), 3);
        assert!(prompt.contains("3 multiple-choice questions"));
        assert!(prompt.contains("about traveling"));
    }

    #[test]
    fn falls_back_to_the_domain_scope_without_a_topic() {
        let prompt = quiz_prompt(Domain::Compensation, None, 5);
        assert!(prompt.contains("salaries, contracts, and the salary cap"));
    }

    #[test]
    fn summaries_read_as_a_request_not_a_prompt() {
        let summary = quiz_summary(Domain::Rulebook, Some("traveling"), 3);
        assert_eq!(summary, "Quiz: 3 questions about traveling");
        assert!(!summary.contains("multiple-choice"));

        let fallback = quiz_summary(Domain::Compensation, None, 5);
        assert!(fallback.contains("Collective Bargaining Agreement"));
    }
}

mod scenario_prompts {
    use super::*;

    #[test]
    fn merges_the_form_fields_into_one_scenario() {
        let form = ScenarioForm {
            situation: "A defender blocked a shot on its way down".to_string(),
            actors: "shooter, defender".to_string(),
            context: "two minutes left".to_string(),
        };
        let prompt = scenario_prompt(Domain::Rulebook, &form);

        assert!(prompt.contains("Situation: A defender blocked a shot on its way down"));
        assert!(prompt.contains("Involved: shooter, defender"));
        assert!(prompt.contains("Context: two minutes left"));
        assert!(prompt.contains("step by step"));
    }

    #[test]
    fn skips_empty_form_fields() {
        let form = ScenarioForm {
            situation: "A player stepped out of bounds".to_string(),
            ..Default::default()
        };
        let prompt = scenario_prompt(Domain::Rulebook, &form);

        assert!(!prompt.contains("Involved:"));
        assert!(!prompt.contains("Context:"));
    }
}

mod inline_errors {
    use super::*;

    #[test]
    fn every_failure_kind_renders_a_message() {
        let errors = [
            KbError::AccessDenied("denied".to_string()),
            KbError::NotFound("missing".to_string()),
            KbError::StaleSession,
            KbError::Throttled("busy".to_string()),
            KbError::Api {
                code: "InternalServerException".to_string(),
                message: "oops".to_string(),
            },
        ];

        for error in &errors {
            assert!(!render::inline_error(error).is_empty());
        }
    }

    #[test]
    fn access_denied_points_at_permissions() {
        let message = render::inline_error(&KbError::AccessDenied("denied".to_string()));
        assert!(message.contains("bedrock:RetrieveAndGenerate"));
    }

    #[test]
    fn not_found_points_at_the_config() {
        let message = render::inline_error(&KbError::NotFound("missing".to_string()));
        assert!(message.contains("knowledge base id"));
    }

    #[test]
    fn stale_session_suggests_clearing() {
        let message = render::inline_error(&KbError::StaleSession);
        assert!(message.contains("/clear"));
    }
}
