//! Conversation state and transcript export tests.

use courtside::models::{
    normalize, Conversation, Domain, RetrievedReference, Role,
};

fn conversation_with_exchange() -> Conversation {
    let mut conversation = Conversation::new(Domain::Rulebook);
    conversation.session_id = Some("session-123".to_string());
    conversation.push_user("What is traveling?");

    let citations = normalize(vec![
        RetrievedReference::new("Rule 10 text.", "s3://corpus/rulebook.pdf"),
        RetrievedReference::new("Casebook play.", "s3://corpus/rulebook.pdf"),
        RetrievedReference::new("Manual text.", "s3://corpus/operations-manual.pdf"),
    ]);
    conversation.push_assistant("Traveling is...", citations, None);
    conversation
}

mod state {
    use super::*;

    #[test]
    fn question_count_counts_user_turns_only() {
        let conversation = conversation_with_exchange();
        assert_eq!(conversation.question_count(), 1);
        assert_eq!(conversation.turns().len(), 2);
    }

    #[test]
    fn clear_drops_turns_and_session_but_keeps_domain() {
        let mut conversation = conversation_with_exchange();
        conversation.clear();

        assert!(conversation.turns().is_empty());
        assert_eq!(conversation.session_id, None);
        assert_eq!(conversation.domain, Domain::Rulebook);
    }

    #[test]
    fn switch_resets_everything_and_changes_domain() {
        let mut conversation = conversation_with_exchange();
        conversation.switch_to(Domain::Compensation);

        assert!(conversation.turns().is_empty());
        assert_eq!(conversation.session_id, None);
        assert_eq!(conversation.domain, Domain::Compensation);
    }

    #[test]
    fn turns_record_roles_in_order() {
        let conversation = conversation_with_exchange();
        let roles: Vec<Role> = conversation.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }
}

mod transcript {
    use super::*;

    #[test]
    fn lists_turns_oldest_first_with_role_labels() {
        let transcript = conversation_with_exchange().transcript();

        let user_at = transcript.find("User:").expect("user turn");
        let assistant_at = transcript.find("Assistant:").expect("assistant turn");
        assert!(user_at < assistant_at);
        assert!(transcript.contains("What is traveling?"));
        assert!(transcript.contains("Traveling is..."));
    }

    #[test]
    fn assistant_sources_are_distinct_locators() {
        let transcript = conversation_with_exchange().transcript();

        assert_eq!(transcript.matches("s3://corpus/rulebook.pdf").count(), 1);
        assert!(transcript.contains("s3://corpus/operations-manual.pdf"));
    }

    #[test]
    fn user_turns_carry_no_source_list() {
        let mut conversation = Conversation::new(Domain::Rulebook);
        conversation.push_user("Only a question.");

        assert!(!conversation.transcript().contains("Sources:"));
    }

    #[test]
    fn names_the_active_domain() {
        let transcript = Conversation::new(Domain::Compensation).transcript();
        assert!(transcript.contains("Collective Bargaining Agreement"));
    }

    #[test]
    fn transcript_can_be_written_to_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("transcript.txt");

        std::fs::write(&path, conversation_with_exchange().transcript()).expect("write");
        let read_back = std::fs::read_to_string(&path).expect("read");
        assert!(read_back.starts_with("Transcript —"));
    }
}
