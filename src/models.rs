use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body sent to the analysis endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeRequest {
    pub query: String,
}

/// What the analysis endpoint answers with. Only `article` is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    #[serde(default)]
    pub article: Option<String>,
}

impl AnalysisResult {
    /// Reads `article` out of any JSON body.
    ///
    /// Returns `None` only for a `null` body, which has no fields to read.
    /// Every other body is a result; a falsy or missing `article`, or a body
    /// that is not an object, leaves the article empty.
    pub fn from_json(body: &Value) -> Option<Self> {
        if body.is_null() {
            return None;
        }
        Some(Self {
            article: body.get("article").and_then(truthy_text),
        })
    }

    /// The article text, if the backend produced a non-empty one.
    pub fn article(&self) -> Option<&str> {
        self.article.as_deref().filter(|a| !a.is_empty())
    }
}

fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(0), _) => None,
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f == 0.0 => None,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

/// Form fields posted by the query page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryForm {
    #[serde(rename = "timeValue", default)]
    pub time_value: Option<String>,
    #[serde(rename = "timeUnit", default)]
    pub time_unit: Option<String>,
}
