//! Turns a raw completion response into a [`GrammarCheckResult`].
//!
//! Nothing here fails: whatever the provider sends back, the caller gets a
//! well-formed result, degrading to "no changes found" when the model output
//! cannot be read.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::serializers::chat_completion::ChatResp;
use crate::serializers::grammar_check::{ErrorEntry, GrammarCheckResult};

pub fn reconcile(original: &str, raw_body: &str) -> GrammarCheckResult {
    let Some(content) = first_choice_content(raw_body) else {
        warn!("completion response had no readable content, using fallback");
        return GrammarCheckResult::fallback(original);
    };

    let parsed = match serde_json::from_str::<Value>(strip_code_fence(&content)) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!(kind = json_kind(&other), "model output is not a JSON object, using fallback");
            return GrammarCheckResult::fallback(original);
        }
        Err(e) => {
            warn!(error = %e, "model output is not JSON, using fallback");
            return GrammarCheckResult::fallback(original);
        }
    };

    GrammarCheckResult {
        corrected_text: corrected_text(&parsed, original),
        errors: error_entries(parsed.get("errors")),
        original_text: original.to_string(),
    }
}

// each field is substituted on its own; a bad `errors` keeps a good `correctedText`
fn corrected_text(parsed: &Map<String, Value>, original: &str) -> String {
    match parsed.get("correctedText") {
        Some(Value::String(t)) if !t.is_empty() => t.clone(),
        _ => original.to_string(),
    }
}

fn error_entries(errors: Option<&Value>) -> Vec<ErrorEntry> {
    let Some(Value::Array(entries)) = errors else {
        if let Some(other) = errors.filter(|v| !v.is_null()) {
            warn!(kind = json_kind(other), "`errors` is not an array, ignoring it");
        }
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match ErrorEntry::deserialize(entry) {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(error = %e, "dropping malformed error entry");
                None
            }
        })
        .collect()
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn first_choice_content(raw_body: &str) -> Option<String> {
    serde_json::from_str::<ChatResp>(raw_body)
        .ok()?
        .choices
        .into_iter()
        .next()?
        .message
        .content
}

/// Strips a surrounding ```` ``` ```` / ```` ```json ```` fence if present.
fn strip_code_fence(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // drop the language tag on the opening line
    match rest.split_once('\n') {
        Some((tag, body)) if !tag.trim().contains(['{', '[']) => body.trim(),
        _ => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializers::grammar_check::ErrorKind;
    use serde_json::json;

    fn envelope(content: &str) -> String {
        json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn well_formed_answer_is_passed_through() {
        let content = r#"{"correctedText":"He goes home.","errors":[{"word":"go","suggestion":"goes","type":"grammar","position":"1"}]}"#;
        let out = reconcile("He go home.", &envelope(content));

        assert_eq!(out.corrected_text, "He goes home.");
        assert_eq!(out.original_text, "He go home.");
        assert_eq!(
            out.errors,
            vec![ErrorEntry {
                word: "go".into(),
                suggestion: "goes".into(),
                kind: ErrorKind::Grammar,
                position: "1".into(),
            }]
        );
    }

    #[test]
    fn non_json_content_falls_back() {
        let out = reconcile("teh cat", &envelope("Sure! Here is the corrected text: the cat"));
        assert_eq!(out, GrammarCheckResult::fallback("teh cat"));
    }

    #[test]
    fn non_json_body_falls_back() {
        let out = reconcile("teh cat", "<html>bad gateway</html>");
        assert_eq!(out, GrammarCheckResult::fallback("teh cat"));
    }

    #[test]
    fn empty_choices_fall_back() {
        let out = reconcile("teh cat", r#"{"choices":[]}"#);
        assert_eq!(out, GrammarCheckResult::fallback("teh cat"));
    }

    #[test]
    fn missing_fields_are_substituted() {
        let out = reconcile("fine text", &envelope("{}"));
        assert_eq!(out.corrected_text, "fine text");
        assert!(out.errors.is_empty());

        let out = reconcile("fine text", &envelope(r#"{"correctedText":""}"#));
        assert_eq!(out.corrected_text, "fine text");
    }

    #[test]
    fn malformed_errors_keep_the_correction() {
        for errors in [json!("none"), json!({}), json!(3)] {
            let content = json!({"correctedText": "He goes home.", "errors": errors}).to_string();
            let out = reconcile("He go home.", &envelope(&content));

            assert_eq!(out.corrected_text, "He goes home.");
            assert!(out.errors.is_empty());
        }
    }

    #[test]
    fn malformed_corrected_text_keeps_the_errors() {
        let content = json!({
            "correctedText": 42,
            "errors": [{"word": "go", "suggestion": "goes", "type": "grammar", "position": "1"}]
        })
        .to_string();
        let out = reconcile("He go home.", &envelope(&content));

        assert_eq!(out.corrected_text, "He go home.");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].suggestion, "goes");
    }

    #[test]
    fn json_that_is_not_an_object_falls_back() {
        for content in [r#"["He goes home."]"#, r#""He goes home.""#, "null"] {
            let out = reconcile("He go home.", &envelope(content));
            assert_eq!(out, GrammarCheckResult::fallback("He go home."));
        }
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let content = "```json\n{\"correctedText\":\"the cat\",\"errors\":[]}\n```";
        let out = reconcile("teh cat", &envelope(content));
        assert_eq!(out.corrected_text, "the cat");
    }

    #[test]
    fn numeric_positions_and_bad_entries() {
        let content = json!({
            "correctedText": "the cat sat",
            "errors": [
                {"word": "teh", "suggestion": "the", "type": "spelling", "position": 0},
                {"word": "sit", "suggestion": "sat", "type": "tense", "position": "2"},
                {"word": "kat", "suggestion": "cat", "type": "Spelling", "position": "1"}
            ]
        })
        .to_string();
        let out = reconcile("teh kat sit", &envelope(&content));

        assert_eq!(out.errors.len(), 2);
        assert_eq!(out.errors[0].position, "0");
        assert_eq!(out.errors[0].kind, ErrorKind::Spelling);
        assert_eq!(out.errors[1].word, "kat");
    }

    #[test]
    fn strip_code_fence_leaves_plain_json_alone() {
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
    }
}
