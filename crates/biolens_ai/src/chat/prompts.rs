use biolens_core::domain::{AnalysisCategory, StandardRef};
use biolens_core::error::AppError;
use serde_json::Value;

pub const DEFAULT_TITLE: &str = "New Chat";
pub const DEFAULT_TITLE_SEED: &str = "건강검진 결과 분석";

pub const TITLE_SYSTEM_PROMPT: &str =
    "사용자의 첫 메시지를 바탕으로 간결한 채팅방 제목을 생성하세요. 20자 이내로 핵심만 담아주세요.";

// Token shape the citation pipeline parses out of replies.
const CITATION_RULES: &str = r#"Standard Reference를 참고한 내용 옆에 참고문헌을 다음 형식으로 명시합니다: {"자료명": "링크"}
예시: {"보건복지부. (2025). 건강검진 실시기준. 보건복지부고시 제2025-5호.": "https://www.nhis.or.kr/lm/lmxsrv/law/lawFullView.do?SEQ=80"}
동일한 참고문헌을 중복해서 표시하지 마세요. 각 참고문헌은 한 번만 명시합니다."#;

const SAFETY_RULES: &str = r#"질병 진단이나 치료 지시는 하지 않으며, 참고용 조언만 제공합니다.
이전 대화 내용을 참고하여 일관성 있는 답변을 제공합니다.
이모티콘을 적당히 사용하여 사용자 친화적인 답변을 제공합니다."#;

pub fn analysis_system_prompt() -> String {
    format!(
        r#"당신은 사용자의 건강검진 결과를 전문적으로 분석해주는 의료 정보 분석 AI입니다.
건강 상태 분석 시 다음 지침을 따르세요:
- 건강검진 수치를 기반으로 정상 수치와 해석을 구분하여 설명합니다.
{CITATION_RULES}
{SAFETY_RULES}
"#
    )
}

/// Health data (and reference contents, when any) as pretty-printed JSON blocks.
pub fn health_context(health_data: &Value, refs: &[StandardRef]) -> Result<String, AppError> {
    let data = to_pretty_json(health_data)?;
    if refs.is_empty() {
        return Ok(format!("\n\n[Health Data]\n{data}"));
    }
    let contents: Vec<&str> = refs.iter().map(|r| r.content.as_str()).collect();
    let refs_json = to_pretty_json(&contents)?;
    Ok(format!(
        "\n\n[Health Data]\n{data}\n\n[Standard References]\n{refs_json}"
    ))
}

pub fn analysis_user_turn(context: &str) -> String {
    format!("분석 해줘: {context}\n")
}

pub fn additional_analyze_system_prompt(term: &str, category: AnalysisCategory) -> String {
    let task = match category {
        AnalysisCategory::ActionGuide => format!(
            "당신은 의료 용어에 대한 행동 가이드를 제공하는 AI입니다. \"{term}\"에 대한 구체적인 행동 지침과 권장사항을 설명하세요."
        ),
        AnalysisCategory::Cause => format!(
            "당신은 의료 용어의 원인을 설명하는 AI입니다. \"{term}\"의 발생 원인과 위험 요인을 설명하세요."
        ),
        AnalysisCategory::Definition => format!(
            "당신은 의료 용어를 정의하는 AI입니다. \"{term}\"의 의학적 정의와 의미를 설명하세요."
        ),
    };
    format!("{task}\n{CITATION_RULES}\n{SAFETY_RULES}\n")
}

pub fn additional_analyze_user_turn(term: &str, refs: &[StandardRef]) -> Result<String, AppError> {
    if refs.is_empty() {
        return Ok(format!("\"{term}\"에 대해 설명해줘"));
    }
    let contents: Vec<&str> = refs.iter().map(|r| r.content.as_str()).collect();
    let refs_json = to_pretty_json(&contents)?;
    Ok(format!(
        "\"{term}\"에 대해 설명해줘\n\n[Standard References]\n{refs_json}"
    ))
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new("AI_REQUEST_FAILED", "Failed to encode prompt context")
            .with_details(e.to_string())
    })
}
