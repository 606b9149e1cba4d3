use biolens_ai::chat::build_analysis_messages;
use biolens_ai::chat::prompts::{
    additional_analyze_system_prompt, additional_analyze_user_turn, health_context,
};
use biolens_ai::llm::{CompletionRequest, Role};
use biolens_core::domain::{AnalysisCategory, Conversation, Sender, StandardRef};
use pretty_assertions::assert_eq;
use serde_json::json;

fn turn(id: i64, sender: Sender, content: &str) -> Conversation {
    Conversation {
        id,
        chat_id: 1,
        sender,
        content: content.to_string(),
        created_at: "2026-10-15T00:00:00Z".to_string(),
    }
}

fn reference(content: &str) -> StandardRef {
    StandardRef {
        id: 1,
        category: "normal_range".to_string(),
        content: content.to_string(),
    }
}

#[test]
fn newest_turn_is_replaced_by_final_user_message() {
    let history = vec![
        turn(1, Sender::User, "q1"),
        turn(2, Sender::Ai, "a1"),
        turn(3, Sender::User, "stored q2"),
    ];
    let messages = build_analysis_messages(&history, "final q2".to_string());
    let shape: Vec<(Role, &str)> = messages[1..]
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        shape,
        vec![(Role::User, "q1"), (Role::Assistant, "a1"), (Role::User, "final q2")]
    );
    assert_eq!(messages[0].role, Role::System);
}

#[test]
fn empty_history_still_yields_system_and_user() {
    let messages = build_analysis_messages(&[], "q".to_string());
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User]);
}

#[test]
fn health_context_omits_reference_block_without_refs() {
    let data = json!({"liverFunction": {"ast": 23}});
    let ctx = health_context(&data, &[]).expect("ctx");
    assert_eq!(ctx, "\n\n[Health Data]\n{\n  \"liverFunction\": {\n    \"ast\": 23\n  }\n}");

    let ctx = health_context(&data, &[reference("AST 40 이하 정상")]).expect("ctx");
    assert!(ctx.ends_with("[Standard References]\n[\n  \"AST 40 이하 정상\"\n]"));
}

#[test]
fn category_prompts_name_the_term_and_citation_format() {
    for category in [
        AnalysisCategory::ActionGuide,
        AnalysisCategory::Cause,
        AnalysisCategory::Definition,
    ] {
        let prompt = additional_analyze_system_prompt("감마 GTP", category);
        assert!(prompt.contains("\"감마 GTP\""), "{category:?}");
        assert!(prompt.contains(r#"{"자료명": "링크"}"#), "{category:?}");
    }
    assert_eq!(
        additional_analyze_user_turn("BMI", &[]).expect("turn"),
        "\"BMI\"에 대해 설명해줘"
    );
}

#[test]
fn completion_request_serializes_as_chat_completions_body() {
    let req = CompletionRequest {
        model: "gpt-4o-mini".to_string(),
        messages: build_analysis_messages(&[], "hi".to_string())[1..].to_vec(),
        max_tokens: Some(50),
    };
    assert_eq!(
        serde_json::to_value(&req).expect("json"),
        json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "hi"}],
            "max_tokens": 50
        })
    );

    let no_limit = CompletionRequest {
        max_tokens: None,
        ..req
    };
    assert!(serde_json::to_value(&no_limit).expect("json").get("max_tokens").is_none());
}
