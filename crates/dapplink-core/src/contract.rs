//! Output contract for model responses.
//!
//! The model is asked to reply with a JSON object holding exactly two
//! meaningful fields: a string `answer` and a `source` that is either a
//! string or `null`. Anything else is a [`ContractViolation`] and the caller
//! answers with [`ChatResult::unavailable`] instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Answer returned whenever the model output cannot be trusted.
pub const UNAVAILABLE_ANSWER: &str = "Mujhe iski jankari nahi hai";

/// Final chat payload returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    pub answer: String,
    pub source: Option<String>,
}

impl ChatResult {
    pub fn new(answer: impl Into<String>, source: Option<String>) -> Self {
        Self {
            answer: answer.into(),
            source,
        }
    }

    /// The fixed degraded payload.
    pub fn unavailable() -> Self {
        Self {
            answer: UNAVAILABLE_ANSWER.to_string(),
            source: None,
        }
    }
}

/// Ways raw model text can fail the output contract.
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("model output is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("model output is not a JSON object")]
    NotAnObject,

    #[error("model output is missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Parse and validate raw model output.
///
/// When `news_source` carries a non-empty URL it replaces whatever `source`
/// the model produced.
pub fn validate_output(
    raw: &str,
    news_source: Option<&str>,
) -> Result<ChatResult, ContractViolation> {
    let value: Value = serde_json::from_str(raw.trim())?;
    let object = value.as_object().ok_or(ContractViolation::NotAnObject)?;

    let answer = match object.get("answer") {
        Some(Value::String(answer)) => answer.clone(),
        Some(_) => {
            return Err(ContractViolation::WrongType {
                field: "answer",
                expected: "a string",
            });
        }
        None => return Err(ContractViolation::MissingField("answer")),
    };

    let source = match object.get("source") {
        Some(Value::String(source)) => Some(source.clone()),
        Some(Value::Null) => None,
        Some(_) => {
            return Err(ContractViolation::WrongType {
                field: "source",
                expected: "a string or null",
            });
        }
        None => return Err(ContractViolation::MissingField("source")),
    };

    let source = match news_source.filter(|url| !url.is_empty()) {
        Some(url) => Some(url.to_string()),
        None => source,
    };

    Ok(ChatResult { answer, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_output() {
        let result = validate_output(r#"{"answer":"gm","source":null}"#, None).unwrap();
        assert_eq!(result, ChatResult::new("gm", None));

        let result = validate_output(r#"{"answer":"gm","source":"docs"}"#, None).unwrap();
        assert_eq!(result.source.as_deref(), Some("docs"));
    }

    #[test]
    fn news_source_overrides_model_source() {
        let result =
            validate_output(r#"{"answer":"gm","source":"made-up"}"#, Some("http://x")).unwrap();
        assert_eq!(result.source.as_deref(), Some("http://x"));

        let result = validate_output(r#"{"answer":"gm","source":null}"#, Some("http://x")).unwrap();
        assert_eq!(result.source.as_deref(), Some("http://x"));
    }

    #[test]
    fn empty_news_source_keeps_model_source() {
        let result = validate_output(r#"{"answer":"gm","source":"docs"}"#, Some("")).unwrap();
        assert_eq!(result.source.as_deref(), Some("docs"));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let result =
            validate_output(r#"{"answer":"gm","source":null,"mood":"bullish"}"#, None).unwrap();
        assert_eq!(result.answer, "gm");
    }

    #[test]
    fn rejects_malformed_output() {
        assert!(matches!(
            validate_output("definitely not json", None),
            Err(ContractViolation::NotJson(_))
        ));
        assert!(matches!(
            validate_output("[1,2]", None),
            Err(ContractViolation::NotAnObject)
        ));
        assert!(matches!(
            validate_output(r#"{"source":null}"#, None),
            Err(ContractViolation::MissingField("answer"))
        ));
        assert!(matches!(
            validate_output(r#"{"answer":"gm"}"#, None),
            Err(ContractViolation::MissingField("source"))
        ));
        assert!(matches!(
            validate_output(r#"{"answer":42,"source":null}"#, None),
            Err(ContractViolation::WrongType { field: "answer", .. })
        ));
        assert!(matches!(
            validate_output(r#"{"answer":"gm","source":7}"#, None),
            Err(ContractViolation::WrongType { field: "source", .. })
        ));
    }

    #[test]
    fn unavailable_payload_serializes_with_null_source() {
        let json = serde_json::to_value(ChatResult::unavailable()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"answer": UNAVAILABLE_ANSWER, "source": null})
        );
    }
}
