pub mod citations;
pub mod domain;
pub mod error;
pub mod health;
pub mod store;
pub mod transcript;

#[cfg(test)]
mod tests {
    use super::error::AppError;

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new("CHAT_NOT_FOUND", "Chat does not exist").with_retryable(false);
        assert_eq!(err.code, "CHAT_NOT_FOUND");
        assert_eq!(err.message, "Chat does not exist");
        assert!(!err.retryable);
    }

    #[test]
    fn analysis_category_names_round_trip() {
        use super::domain::AnalysisCategory;

        for category in [
            AnalysisCategory::ActionGuide,
            AnalysisCategory::Cause,
            AnalysisCategory::Definition,
        ] {
            assert_eq!(AnalysisCategory::from_str(category.as_str()), Some(category));
        }
        assert_eq!(AnalysisCategory::from_str("diagnosis"), None);
    }

    #[test]
    fn app_error_display_includes_details() {
        let err = AppError::chat_not_found(7);
        assert_eq!(err.to_string(), "[CHAT_NOT_FOUND] Chat does not exist (chat_id=7)");
    }
}
