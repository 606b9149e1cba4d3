use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Conversation, Sender};
use crate::error::AppError;

/// Prefix of the user turn recorded when a checkup dataset is analyzed.
pub const HEALTH_DATA_PREFIX: &str = "[Health Data] ";
const HEALTH_DATA_MARKERS: [&str; 2] = [HEALTH_DATA_PREFIX, "Health Data: "];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthCheckupData {
    pub general_info: Option<GeneralInfo>,
    pub blood_pressure: Option<BloodPressure>,
    pub blood_test: Option<BloodTest>,
    pub liver_function: Option<LiverFunction>,
    pub kidney_function: Option<KidneyFunction>,
    pub urine_test: Option<UrineTest>,
    pub lifestyle: Option<Lifestyle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralInfo {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub waist_cm: Option<f64>,
    pub bmi: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BloodPressure {
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BloodTest {
    pub cholesterol_total: Option<f64>,
    pub cholesterol_ldl: Option<f64>,
    pub cholesterol_hdl: Option<f64>,
    pub triglyceride: Option<f64>,
    pub glucose_fasting: Option<f64>,
    pub hemoglobin: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LiverFunction {
    pub ast: Option<f64>,
    pub alt: Option<f64>,
    pub gamma_gtp: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KidneyFunction {
    pub creatinine: Option<f64>,
    pub bun: Option<f64>,
    pub gfr: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UrineTest {
    pub protein: Option<String>,
    pub glucose: Option<String>,
    pub ketone: Option<String>,
    pub occult_blood: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Lifestyle {
    pub drinking: Option<String>,
    pub smoking: Option<String>,
    pub exercise_per_week: Option<u32>,
}

/// Flat form as submitted by the chat client: every field is free text and an
/// empty string means "not provided".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HealthCheckupForm {
    pub age: String,
    pub gender: String,
    pub height_cm: String,
    pub weight_kg: String,
    pub waist_cm: String,
    pub bmi: String,

    pub systolic: String,
    pub diastolic: String,

    pub cholesterol_total: String,
    pub cholesterol_ldl: String,
    pub cholesterol_hdl: String,
    pub triglyceride: String,
    pub glucose_fasting: String,
    pub hemoglobin: String,

    pub ast: String,
    pub alt: String,
    pub gamma_gtp: String,

    pub creatinine: String,
    pub bun: String,
    pub gfr: String,

    pub protein: String,
    pub glucose: String,
    pub ketone: String,
    pub occult_blood: String,

    pub drinking: String,
    pub smoking: String,
    pub exercise_per_week: String,
}

impl HealthCheckupForm {
    /// `(label, value)` in display order.
    fn labeled_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("나이", self.age.as_str()),
            ("성별", self.gender.as_str()),
            ("신장(cm)", self.height_cm.as_str()),
            ("체중(kg)", self.weight_kg.as_str()),
            ("허리둘레(cm)", self.waist_cm.as_str()),
            ("BMI", self.bmi.as_str()),
            ("수축기 혈압", self.systolic.as_str()),
            ("이완기 혈압", self.diastolic.as_str()),
            ("총 콜레스테롤", self.cholesterol_total.as_str()),
            ("LDL 콜레스테롤", self.cholesterol_ldl.as_str()),
            ("HDL 콜레스테롤", self.cholesterol_hdl.as_str()),
            ("트리글리세라이드", self.triglyceride.as_str()),
            ("식전 혈당", self.glucose_fasting.as_str()),
            ("혈색소", self.hemoglobin.as_str()),
            ("AST", self.ast.as_str()),
            ("ALT", self.alt.as_str()),
            ("감마 GTP", self.gamma_gtp.as_str()),
            ("크레아티닌", self.creatinine.as_str()),
            ("BUN", self.bun.as_str()),
            ("GFR", self.gfr.as_str()),
            ("요단백", self.protein.as_str()),
            ("요당", self.glucose.as_str()),
            ("케톤", self.ketone.as_str()),
            ("요잠혈", self.occult_blood.as_str()),
            ("음주", self.drinking.as_str()),
            ("흡연", self.smoking.as_str()),
            ("주당 운동 횟수", self.exercise_per_week.as_str()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.labeled_fields()
            .iter()
            .all(|(_, value)| value.trim().is_empty())
    }

    /// One `label: value` line per filled field; empty when nothing is filled.
    pub fn to_labeled_text(&self) -> String {
        self.labeled_fields()
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(label, value)| format!("{label}: {}", value.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_health_data(&self) -> Result<HealthCheckupData, AppError> {
        let general_info = GeneralInfo {
            age: opt_count("age", &self.age)?,
            gender: opt_text(&self.gender),
            height_cm: opt_num("height_cm", &self.height_cm)?,
            weight_kg: opt_num("weight_kg", &self.weight_kg)?,
            waist_cm: opt_num("waist_cm", &self.waist_cm)?,
            bmi: opt_num("bmi", &self.bmi)?,
        };
        let blood_pressure = BloodPressure {
            systolic: opt_num("systolic", &self.systolic)?,
            diastolic: opt_num("diastolic", &self.diastolic)?,
        };
        let blood_test = BloodTest {
            cholesterol_total: opt_num("cholesterol_total", &self.cholesterol_total)?,
            cholesterol_ldl: opt_num("cholesterol_ldl", &self.cholesterol_ldl)?,
            cholesterol_hdl: opt_num("cholesterol_hdl", &self.cholesterol_hdl)?,
            triglyceride: opt_num("triglyceride", &self.triglyceride)?,
            glucose_fasting: opt_num("glucose_fasting", &self.glucose_fasting)?,
            hemoglobin: opt_num("hemoglobin", &self.hemoglobin)?,
        };
        let liver_function = LiverFunction {
            ast: opt_num("ast", &self.ast)?,
            alt: opt_num("alt", &self.alt)?,
            gamma_gtp: opt_num("gamma_gtp", &self.gamma_gtp)?,
        };
        let kidney_function = KidneyFunction {
            creatinine: opt_num("creatinine", &self.creatinine)?,
            bun: opt_num("bun", &self.bun)?,
            gfr: opt_num("gfr", &self.gfr)?,
        };
        let urine_test = UrineTest {
            protein: opt_text(&self.protein),
            glucose: opt_text(&self.glucose),
            ketone: opt_text(&self.ketone),
            occult_blood: opt_text(&self.occult_blood),
        };
        let lifestyle = Lifestyle {
            drinking: opt_text(&self.drinking),
            smoking: opt_text(&self.smoking),
            exercise_per_week: opt_count("exercise_per_week", &self.exercise_per_week)?,
        };

        Ok(HealthCheckupData {
            general_info: non_default(general_info),
            blood_pressure: non_default(blood_pressure),
            blood_test: non_default(blood_test),
            liver_function: non_default(liver_function),
            kidney_function: non_default(kidney_function),
            urine_test: non_default(urine_test),
            lifestyle: non_default(lifestyle),
        })
    }
}

fn non_default<T: Default + PartialEq>(section: T) -> Option<T> {
    if section == T::default() {
        None
    } else {
        Some(section)
    }
}

fn opt_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn opt_num(field: &str, value: &str) -> Result<Option<f64>, AppError> {
    let Some(value) = opt_text(value) else {
        return Ok(None);
    };
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(Some(n)),
        _ => Err(
            AppError::new("HEALTH_DATA_INVALID", format!("{field} must be a non-negative number"))
                .with_details(format!("value={value}")),
        ),
    }
}

fn opt_count(field: &str, value: &str) -> Result<Option<u32>, AppError> {
    let Some(value) = opt_text(value) else {
        return Ok(None);
    };
    value.parse::<u32>().map(Some).map_err(|e| {
        AppError::new("HEALTH_DATA_INVALID", format!("{field} must be a whole number"))
            .with_details(format!("value={value}; err={e}"))
    })
}

/// The chat text sent for a free-form question, with any filled form fields appended.
pub fn compose_chat_content(content: &str, form: Option<&HealthCheckupForm>) -> String {
    let labeled = form.map(|f| f.to_labeled_text()).unwrap_or_default();
    if labeled.is_empty() {
        content.to_string()
    } else {
        format!("{content}. {labeled}")
    }
}

/// User-turn text recording an analyzed dataset.
pub fn health_data_message(health_data: &Value) -> String {
    format!("{HEALTH_DATA_PREFIX}{health_data}")
}

/// First dataset recorded by the user in `history`, if any parses.
pub fn extract_health_data_from_history(history: &[Conversation]) -> Option<Value> {
    history
        .iter()
        .filter(|c| c.sender == Sender::User)
        .find_map(|c| {
            HEALTH_DATA_MARKERS
                .iter()
                .find_map(|marker| parse_after_marker(&c.content, marker))
        })
}

fn parse_after_marker(content: &str, marker: &str) -> Option<Value> {
    let start = content.find(marker)? + marker.len();
    // Stream-parse so trailing prose after the object is ignored.
    let mut values = serde_json::Deserializer::from_str(&content[start..]).into_iter::<Value>();
    match values.next() {
        Some(Ok(v @ Value::Object(_))) => Some(v),
        _ => None,
    }
}
