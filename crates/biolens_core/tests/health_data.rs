use biolens_core::domain::{Conversation, Sender};
use biolens_core::health::{
    compose_chat_content, extract_health_data_from_history, health_data_message,
    HealthCheckupForm,
};
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

fn sample_form() -> HealthCheckupForm {
    HealthCheckupForm {
        age: "26".to_string(),
        gender: "male".to_string(),
        systolic: "118".to_string(),
        diastolic: " 76 ".to_string(),
        cholesterol_ldl: "112.5".to_string(),
        protein: "negative".to_string(),
        exercise_per_week: "3".to_string(),
        ..Default::default()
    }
}

#[test]
fn labeled_text_lists_filled_fields_in_form_order() {
    assert_eq!(
        sample_form().to_labeled_text(),
        "나이: 26\n성별: male\n수축기 혈압: 118\n이완기 혈압: 76\nLDL 콜레스테롤: 112.5\n요단백: negative\n주당 운동 횟수: 3"
    );
    assert_eq!(HealthCheckupForm::default().to_labeled_text(), "");
    assert!(HealthCheckupForm::default().is_empty());
}

#[test]
fn chat_content_appends_form_only_when_filled() {
    assert_eq!(compose_chat_content("분석해줘", None), "분석해줘");
    assert_eq!(
        compose_chat_content("분석해줘", Some(&HealthCheckupForm::default())),
        "분석해줘"
    );
    let form = HealthCheckupForm {
        bmi: "23.5".to_string(),
        ..Default::default()
    };
    assert_eq!(compose_chat_content("분석해줘", Some(&form)), "분석해줘. BMI: 23.5");
}

#[test]
fn form_converts_to_sectioned_data() {
    let data = sample_form().to_health_data().expect("convert");
    let general = data.general_info.expect("general_info");
    assert_eq!(general.age, Some(26));
    assert_eq!(general.gender.as_deref(), Some("male"));
    assert_eq!(general.height_cm, None);

    let bp = data.blood_pressure.expect("blood_pressure");
    assert_eq!(bp.systolic, Some(118.0));
    assert_eq!(bp.diastolic, Some(76.0));

    assert_eq!(data.blood_test.expect("blood_test").cholesterol_ldl, Some(112.5));
    assert!(data.liver_function.is_none());
    assert!(data.kidney_function.is_none());
    assert_eq!(data.lifestyle.expect("lifestyle").exercise_per_week, Some(3));

    let v = serde_json::to_value(sample_form().to_health_data().expect("convert")).expect("json");
    assert_eq!(v["generalInfo"]["age"], json!(26));
    assert_eq!(v["urineTest"]["protein"], json!("negative"));
}

#[test]
fn non_numeric_measurement_is_rejected() {
    let form = HealthCheckupForm {
        glucose_fasting: "high".to_string(),
        ..Default::default()
    };
    let err = form.to_health_data().expect_err("should reject");
    assert_eq!(err.code, "HEALTH_DATA_INVALID");
    assert!(err.message.contains("glucose_fasting"));

    let form = HealthCheckupForm {
        age: "26.5".to_string(),
        ..Default::default()
    };
    assert_eq!(form.to_health_data().expect_err("fractional age").code, "HEALTH_DATA_INVALID");
}

#[test]
fn recorded_health_data_is_found_in_history() {
    let data = json!({"bloodPressure": {"systolic": 118, "diastolic": 76}});
    let history = vec![
        turn(1, Sender::User, "안녕하세요"),
        turn(2, Sender::Ai, &health_data_message(&json!({"ignored": true}))),
        turn(3, Sender::User, &health_data_message(&data)),
        turn(4, Sender::User, &health_data_message(&json!({"later": 1}))),
    ];
    assert_eq!(extract_health_data_from_history(&history), Some(data));
}

#[test]
fn legacy_marker_and_nested_objects_parse() {
    let history = vec![turn(
        1,
        Sender::User,
        r#"Health Data: {"bloodTest": {"glucose_fasting": 92}} 확인 부탁"#,
    )];
    assert_eq!(
        extract_health_data_from_history(&history),
        Some(json!({"bloodTest": {"glucose_fasting": 92}}))
    );
}

#[test]
fn unparseable_or_missing_health_data_yields_none() {
    let history = vec![
        turn(1, Sender::User, "[Health Data] {not json"),
        turn(2, Sender::User, "[Health Data] null"),
        turn(3, Sender::User, "그냥 질문"),
    ];
    assert_eq!(extract_health_data_from_history(&history), None);
    assert_eq!(extract_health_data_from_history(&[]), None);
}
