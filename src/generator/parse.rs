//! Extraction, repair and validation of the completion text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{GeneratedQuestion, GenerationError, OPTION_COUNT};

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*(\{[\s\S]*?\})\s*```").expect("valid regex"));
static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*(\{[\s\S]*?\})\s*```").expect("valid regex"));
static BRACE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\{[\s\S]*\})").expect("valid regex"));

/// Characters that may legally follow a backslash inside a JSON string.
const JSON_ESCAPES: &[char] = &['\\', '"', '/', 'b', 'f', 'n', 'r', 't', 'u'];

/// Pick the most likely JSON object out of free-form model output.
pub fn extract_json(raw: &str) -> &str {
    [&*JSON_FENCE, &*ANY_FENCE, &*BRACE_SPAN]
        .into_iter()
        .find_map(|re| re.captures(raw).and_then(|c| c.get(1)))
        .map(|m| m.as_str())
        .unwrap_or_else(|| raw.trim())
}

/// Double every backslash that is neither escaped nor starting a valid JSON
/// escape, so TeX-like notation such as `\(` or `\sqrt` survives decoding.
pub fn repair_backslashes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());

    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if c != '\\' {
            continue;
        }
        let escaped = i > 0 && chars[i - 1] == '\\';
        let starts_escape = chars
            .get(i + 1)
            .is_some_and(|next| JSON_ESCAPES.contains(next));
        if !escaped && !starts_escape {
            out.push('\\');
        }
    }

    out
}

/// Full parse step: extract, repair, decode and validate.
pub fn parse_completion(raw: &str) -> Result<GeneratedQuestion, GenerationError> {
    let candidate = extract_json(raw);
    if candidate.is_empty() {
        return Err(GenerationError::MalformedResponse(
            "empty completion".to_string(),
        ));
    }

    let repaired = repair_backslashes(candidate);
    let value: Value = serde_json::from_str(&repaired)
        .map_err(|e| GenerationError::MalformedResponse(format!("invalid JSON: {e}")))?;

    validate(&value)
}

fn validate(value: &Value) -> Result<GeneratedQuestion, GenerationError> {
    let object = value
        .as_object()
        .ok_or_else(|| malformed("top-level value is not an object"))?;

    let question = required_str(object, "question")?;
    let correct_answer = required_str(object, "correct_answer")?;

    let options = object
        .get("options")
        .ok_or_else(|| malformed("missing key `options`"))?
        .as_array()
        .ok_or_else(|| malformed("`options` is not an array"))?;

    if options.len() != OPTION_COUNT {
        return Err(malformed(&format!(
            "expected {OPTION_COUNT} options, got {}",
            options.len()
        )));
    }

    let options = options
        .iter()
        .map(|o| {
            o.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed("`options` contains a non-string value"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (i, option) in options.iter().enumerate() {
        if options[..i].contains(option) {
            return Err(malformed(&format!("duplicate option {option:?}")));
        }
    }

    Ok(GeneratedQuestion {
        question,
        options,
        correct_answer,
    })
}

fn required_str(
    object: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<String, GenerationError> {
    object
        .get(key)
        .ok_or_else(|| malformed(&format!("missing key `{key}`")))?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| malformed(&format!("`{key}` is not a string")))
}

fn malformed(reason: &str) -> GenerationError {
    GenerationError::MalformedResponse(reason.to_string())
}
