use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct GrammarCheckIn {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    #[serde(alias = "Grammar")]
    Grammar,
    #[serde(alias = "Spelling")]
    Spelling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub word: String,
    pub suggestion: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(default, deserialize_with = "string_or_number")]
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarCheckResult {
    pub corrected_text: String,
    pub errors: Vec<ErrorEntry>,
    pub original_text: String,
}

impl GrammarCheckResult {
    /// "No changes found": what callers get when the model output is unusable.
    pub fn fallback(original: &str) -> Self {
        Self {
            corrected_text: original.to_string(),
            errors: Vec::new(),
            original_text: original.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GrammarCheckResp {
    pub success: bool,
    #[serde(flatten)]
    pub result: GrammarCheckResult,
}

// models sometimes answer `"position": 3`
fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for position, got {other}"
        ))),
    }
}
