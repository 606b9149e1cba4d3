pub mod chat;
pub mod config;
pub mod llm;
pub mod openai;

#[cfg(test)]
mod tests {
    use super::openai::OpenAiClient;

    const KEY: &str = "sk-test";

    #[test]
    fn accepts_https_and_loopback_gateways() {
        assert!(OpenAiClient::new("https://api.openai.com", KEY).is_ok());
        assert!(OpenAiClient::new("https://gateway.internal/openai", KEY).is_ok());
        assert!(OpenAiClient::new("http://127.0.0.1:8080", KEY).is_ok());
        assert!(OpenAiClient::new("http://127.0.0.1", KEY).is_ok());
        assert!(OpenAiClient::new("https://api.openai.com/", KEY).is_ok()); // trailing slash is trimmed
    }

    #[test]
    fn rejects_plaintext_remote_and_confusable_urls() {
        assert!(OpenAiClient::new("http://api.openai.com", KEY).is_err());
        assert!(OpenAiClient::new("http://localhost:8080", KEY).is_err());
        assert!(OpenAiClient::new("ftp://127.0.0.1", KEY).is_err());
        assert!(OpenAiClient::new("https://", KEY).is_err());
        assert!(OpenAiClient::new("https://user@evil.com", KEY).is_err());

        // Prefix-based bypasses of the loopback rule.
        assert!(OpenAiClient::new("http://127.0.0.1.evil.com:8080", KEY).is_err());
        assert!(OpenAiClient::new("http://127.0.0.1@evil.com:8080", KEY).is_err());
        assert!(OpenAiClient::new("http://127.0.0.1:", KEY).is_err());
        assert!(OpenAiClient::new("http://127.0.0.1:0", KEY).is_err());
        assert!(OpenAiClient::new("http://127.0.0.1:+80", KEY).is_err());
        assert!(OpenAiClient::new("http://127.0.0.1:99999", KEY).is_err());
        assert!(OpenAiClient::new("http://127.0.0.1:8080/v1", KEY).is_err());
    }

    #[test]
    fn rejects_blank_api_key() {
        let err = OpenAiClient::new("https://api.openai.com", "  ").expect_err("blank key");
        assert_eq!(err.code, "AI_CONFIG_INVALID");
        let err = OpenAiClient::new("http://api.openai.com", KEY).expect_err("http");
        assert_eq!(err.code, "AI_REMOTE_NOT_ALLOWED");
    }
}
